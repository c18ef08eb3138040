use futures::future::join_all;
use jobcast::analyzer::{Recommender, RecommenderImpl};
use jobcast::config::{load_config, load_seed, AppConfig};
use jobcast::geo::KnowledgeBase;
use jobcast::model::{Job, JobStatus, PublishStatus, ScoredCandidate};
use jobcast::normalizer::{eligible_targets, job_profile};
use jobcast::notifier::{Publisher, TelegramNotifier};
use jobcast::storage::SqliteStorage;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Validate the location table before doing anything else
    info!("Location table loaded: {} cities", KnowledgeBase::builtin().len());

    let config: Arc<AppConfig> = match load_config("config.json") {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    if let Some(path) = &config.seed_file {
        import_seed(path, &storage).await;
    }

    let refresh_notify = Arc::new(Notify::new());
    let notifier = match TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id,
        config.telegram_channel_id,
        storage.clone(),
        refresh_notify.clone(),
    ) {
        Ok(n) => Arc::new(n),
        Err(e) => {
            error!("Failed to initialize notifier: {}", e);
            return;
        }
    };

    TelegramNotifier::spawn_listener(notifier.clone());

    info!("Sending startup message...");
    if let Err(e) = notifier.notify_text("🚀 Jobcast started!").await {
        warn!("Startup notification failed: {}", e);
    }

    let recommender = RecommenderImpl::new();

    loop {
        info!("Starting dispatch cycle...");
        review_new_jobs(&recommender, storage.clone(), notifier.clone()).await;
        publish_approved(&config, storage.clone(), notifier.as_ref()).await;

        info!(
            "Waiting for timer ({}s) or manual refresh...",
            config.check_interval_seconds
        );
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = refresh_notify.notified() => {
                info!("Manual refresh triggered.");
            }
        }
    }
}

/// Loads groups and jobs from the seed file into storage.
async fn import_seed(path: &str, storage: &Arc<Mutex<SqliteStorage>>) {
    let seed = match load_seed(path) {
        Ok(seed) => seed,
        Err(e) => {
            warn!("Seed import from {} failed: {}", path, e);
            return;
        }
    };

    let storage = storage.lock().await;
    for group in &seed.groups {
        if let Err(e) = storage.save_group(group) {
            warn!("Group {} save error: {}", group.id, e);
        }
    }
    let mut new_jobs = 0;
    for job in &seed.jobs {
        match storage.save_job(job) {
            Ok(true) => new_jobs += 1,
            Ok(false) => {}
            Err(e) => warn!("Job {} save error: {}", job.id, e),
        }
    }
    match storage.count_groups() {
        Ok(total) => info!(
            "Seed imported: {} groups ({} stored), {} new jobs",
            seed.groups.len(),
            total,
            new_jobs
        ),
        Err(e) => warn!("Group count failed: {}", e),
    }
}

/// Builds a shortlist for every new job and sends it for review.
async fn review_new_jobs<R: Recommender>(
    recommender: &R,
    storage: Arc<Mutex<SqliteStorage>>,
    notifier: Arc<TelegramNotifier>,
) {
    let (jobs, groups) = {
        let guard = storage.lock().await;
        let jobs = match guard.get_jobs_by_status(JobStatus::New) {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Failed to load new jobs: {}", e);
                return;
            }
        };
        let groups = match guard.get_member_groups() {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Failed to load groups: {}", e);
                return;
            }
        };
        (jobs, groups)
    };

    if jobs.is_empty() {
        info!("No new jobs.");
        return;
    }
    let targets = eligible_targets(&groups);
    info!("Reviewing {} new jobs against {} groups", jobs.len(), targets.len());

    let tasks = jobs.iter().map(|job| {
        let shortlist = recommender.recommend(&job_profile(job), &targets);
        review_job(job, shortlist, storage.clone(), notifier.clone())
    });
    join_all(tasks).await;
}

async fn review_job(
    job: &Job,
    shortlist: Vec<ScoredCandidate>,
    storage: Arc<Mutex<SqliteStorage>>,
    notifier: Arc<TelegramNotifier>,
) {
    if shortlist.is_empty() {
        info!("Job {}: no matching groups, channel only", job.id);
    } else {
        info!("Job {}: {} groups recommended", job.id, shortlist.len());
    }

    {
        let guard = storage.lock().await;
        match guard.save_publish_request(&job.id, &shortlist) {
            Ok(true) => {}
            Ok(false) => {
                // Decided by the operator in an earlier cycle; don't ask again.
                match guard.get_publish_request(&job.id) {
                    Ok(Some(request)) => info!("Job {}: request already {}", job.id, request.status.as_str()),
                    Ok(None) => {}
                    Err(e) => warn!("Job {}: request load failed: {}", job.id, e),
                }
                if let Err(e) = guard.set_job_status(&job.id, JobStatus::AwaitingApproval) {
                    warn!("Job {}: status update failed: {}", job.id, e);
                }
                return;
            }
            Err(e) => {
                warn!("Job {}: saving publish request failed: {}", job.id, e);
                return;
            }
        }
    }

    if let Err(e) = notifier.notify_review(job, &shortlist).await {
        // Left as new so the next cycle retries the review message.
        warn!("Job {}: review message failed: {}", job.id, e);
        return;
    }

    if let Err(e) = storage
        .lock()
        .await
        .set_job_status(&job.id, JobStatus::AwaitingApproval)
    {
        warn!("Job {}: status update failed: {}", job.id, e);
    }
}

/// Publishes approved jobs one by one with a random pause in between.
async fn publish_approved(config: &AppConfig, storage: Arc<Mutex<SqliteStorage>>, publisher: &dyn Publisher) {
    let requests = match storage
        .lock()
        .await
        .get_publish_requests_by_status(PublishStatus::Approved)
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Failed to load approved requests: {}", e);
            return;
        }
    };

    for (i, request) in requests.iter().enumerate() {
        if i > 0 {
            let [min, max] = config.publish_delay_seconds;
            let pause = rand::rng().random_range(min..=max);
            info!("Pausing {}s before next publish", pause);
            sleep(Duration::from_secs(pause)).await;
        }

        let job = match storage.lock().await.get_job(&request.job_id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                warn!("Approved job {} not found", request.job_id);
                continue;
            }
            Err(e) => {
                warn!("Job {} load error: {}", request.job_id, e);
                continue;
            }
        };

        info!("Publishing job {}...", job.id);
        if let Err(e) = publisher.publish(&job).await {
            warn!("Job {}: publish failed: {}", job.id, e);
            continue;
        }

        let guard = storage.lock().await;
        if let Err(e) = guard.transition_publish_request(&job.id, PublishStatus::Approved, PublishStatus::Published) {
            warn!("Job {}: request update failed: {}", job.id, e);
        }
        if let Err(e) = guard.set_job_status(&job.id, JobStatus::Published) {
            warn!("Job {}: status update failed: {}", job.id, e);
        }
        info!("Job {} published.", job.id);
    }
}
