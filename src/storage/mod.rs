// Storage module: SQLite persistence for jobs, groups and publish requests.

pub mod sqlite;

pub use sqlite::SqliteStorage;
