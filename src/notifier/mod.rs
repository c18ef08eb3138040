pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::model::{Job, NotifyError};

/// Publishing collaborator: posts an approved job somewhere public.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, job: &Job) -> Result<(), NotifyError>;
}
