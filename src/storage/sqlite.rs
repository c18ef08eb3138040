use crate::model::{
    DistributionTarget, Job, JobStatus, PublishRequest, PublishStatus, ScoredCandidate, StorageError,
};
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates missing tables.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                location TEXT,
                company TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'new',
                fetched_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS groups (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL DEFAULT '',
                is_member INTEGER NOT NULL DEFAULT 0,
                tags TEXT,
                region TEXT,
                keywords TEXT
            );

            CREATE TABLE IF NOT EXISTS publish_requests (
                job_id TEXT PRIMARY KEY,
                targets TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Inserts a job unless one with the same id already exists, so a
    /// re-import never resets its status. Returns true when inserted.
    pub fn save_job(&self, job: &Job) -> Result<bool, StorageError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO jobs (id, title, description, location, company, link, status, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &job.id,
                &job.title,
                &job.description,
                &job.location,
                &job.company,
                &job.link,
                job.status.as_str(),
                &job.fetched_at.to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_job(&self, id: &str) -> Result<Option<Job>, StorageError> {
        let job = self
            .conn
            .query_row(
                "SELECT id, title, description, location, company, link, status, fetched_at
                 FROM jobs WHERE id = ?1",
                params![id],
                Self::map_job,
            )
            .optional()?;
        Ok(job)
    }

    pub fn get_jobs_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, location, company, link, status, fetched_at
             FROM jobs WHERE status = ?1 ORDER BY fetched_at ASC",
        )?;
        let rows = stmt.query_map(params![status.as_str()], Self::map_job)?;
        let mut jobs = Vec::new();
        for job in rows {
            jobs.push(job?);
        }
        Ok(jobs)
    }

    pub fn set_job_status(&self, id: &str, status: JobStatus) -> Result<(), StorageError> {
        let updated = self.conn.execute(
            "UPDATE jobs SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    /// Inserts or replaces a group record.
    pub fn save_group(&self, group: &DistributionTarget) -> Result<(), StorageError> {
        let tags = group.tags.as_ref().map(serde_json::to_string).transpose()?;
        let keywords = group.keywords.as_ref().map(serde_json::to_string).transpose()?;
        self.conn.execute(
            "INSERT INTO groups (id, name, url, is_member, tags, region, keywords)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, url = excluded.url, is_member = excluded.is_member,
                tags = excluded.tags, region = excluded.region, keywords = excluded.keywords",
            params![
                &group.id,
                &group.name,
                &group.url,
                group.is_member,
                tags,
                &group.region,
                keywords,
            ],
        )?;
        Ok(())
    }

    /// Groups the account belongs to, in insertion order.
    pub fn get_member_groups(&self) -> Result<Vec<DistributionTarget>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, is_member, tags, region, keywords
             FROM groups WHERE is_member = 1 ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut groups = Vec::new();
        for row in rows {
            let (id, name, url, is_member, tags, region, keywords) = row?;
            groups.push(DistributionTarget {
                id,
                name,
                url,
                is_member,
                tags: tags.as_deref().map(serde_json::from_str).transpose()?,
                region,
                keywords: keywords.as_deref().map(serde_json::from_str).transpose()?,
            });
        }
        Ok(groups)
    }

    pub fn count_groups(&self) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM groups", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Stores a pending shortlist for the job. An existing request is only
    /// refreshed while still pending; an approved, published or skipped one
    /// is left untouched and `false` is returned.
    pub fn save_publish_request(&self, job_id: &str, targets: &[ScoredCandidate]) -> Result<bool, StorageError> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "INSERT INTO publish_requests (job_id, targets, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(job_id) DO UPDATE SET
                targets = excluded.targets,
                updated_at = excluded.updated_at
             WHERE publish_requests.status = ?3",
            params![job_id, serde_json::to_string(targets)?, PublishStatus::Pending.as_str(), now],
        )?;
        Ok(changed > 0)
    }

    pub fn get_publish_request(&self, job_id: &str) -> Result<Option<PublishRequest>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT job_id, targets, status, created_at, updated_at
                 FROM publish_requests WHERE job_id = ?1",
                params![job_id],
                Self::raw_request,
            )
            .optional()?;
        row.map(Self::to_request).transpose()
    }

    pub fn get_publish_requests_by_status(&self, status: PublishStatus) -> Result<Vec<PublishRequest>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, targets, status, created_at, updated_at
             FROM publish_requests WHERE status = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![status.as_str()], Self::raw_request)?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(Self::to_request(row?)?);
        }
        Ok(requests)
    }

    /// Moves a request to `status` if it is currently in `from`. Returns
    /// false when no request was in that state.
    pub fn transition_publish_request(
        &self,
        job_id: &str,
        from: PublishStatus,
        status: PublishStatus,
    ) -> Result<bool, StorageError> {
        let updated = self.conn.execute(
            "UPDATE publish_requests SET status = ?1, updated_at = ?2 WHERE job_id = ?3 AND status = ?4",
            params![status.as_str(), Utc::now().to_rfc3339(), job_id, from.as_str()],
        )?;
        Ok(updated > 0)
    }

    fn map_job(row: &Row) -> Result<Job, rusqlite::Error> {
        let status_str: String = row.get(6)?;
        let fetched_at_str: String = row.get(7)?;
        let status = JobStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                format!("unknown job status '{}'", status_str).into(),
            )
        })?;
        let fetched_at = parse_datetime(&fetched_at_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                format!("invalid timestamp '{}'", fetched_at_str).into(),
            )
        })?;

        Ok(Job {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            location: row.get(3)?,
            company: row.get(4)?,
            link: row.get(5)?,
            status,
            fetched_at,
        })
    }

    fn raw_request(row: &Row) -> Result<(String, String, String, String, String), rusqlite::Error> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn to_request(
        (job_id, targets, status, created_at, updated_at): (String, String, String, String, String),
    ) -> Result<PublishRequest, StorageError> {
        let status = PublishStatus::parse(&status).ok_or(StorageError::InvalidValue {
            column: "status",
            value: status.clone(),
        })?;
        Ok(PublishRequest {
            job_id,
            targets: serde_json::from_str(&targets)?,
            status,
            created_at: Self::timestamp("created_at", &created_at)?,
            updated_at: Self::timestamp("updated_at", &updated_at)?,
        })
    }

    fn timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>, StorageError> {
        parse_datetime(value).ok_or_else(|| StorageError::InvalidValue {
            column,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SqliteStorage {
        SqliteStorage::new(":memory:").unwrap()
    }

    fn job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            title: "מלגזן".to_string(),
            description: String::new(),
            location: Some("אשדוד".to_string()),
            company: "ACME".to_string(),
            link: format!("https://jobs.example/{id}"),
            status: JobStatus::New,
            fetched_at: Utc::now(),
        }
    }

    fn group(id: &str, is_member: bool) -> DistributionTarget {
        DistributionTarget {
            id: id.to_string(),
            name: format!("דרושים {id}"),
            url: format!("https://facebook.com/groups/{id}"),
            is_member,
            tags: Some(vec!["אשדוד".to_string()]),
            region: Some("south".to_string()),
            keywords: None,
        }
    }

    #[test]
    fn job_roundtrip_and_status_change() {
        let s = storage();
        assert!(s.save_job(&job("j1")).unwrap());
        assert!(!s.save_job(&job("j1")).unwrap());

        let loaded = s.get_job("j1").unwrap().unwrap();
        assert_eq!(loaded.location.as_deref(), Some("אשדוד"));
        assert_eq!(loaded.status, JobStatus::New);

        s.set_job_status("j1", JobStatus::AwaitingApproval).unwrap();
        assert!(s.get_jobs_by_status(JobStatus::New).unwrap().is_empty());
        assert_eq!(s.get_jobs_by_status(JobStatus::AwaitingApproval).unwrap().len(), 1);
        assert!(matches!(s.set_job_status("missing", JobStatus::Skipped), Err(StorageError::NotFound)));
    }

    #[test]
    fn reimport_does_not_reset_status() {
        let s = storage();
        s.save_job(&job("j1")).unwrap();
        s.set_job_status("j1", JobStatus::Published).unwrap();
        s.save_job(&job("j1")).unwrap();
        assert_eq!(s.get_job("j1").unwrap().unwrap().status, JobStatus::Published);
    }

    #[test]
    fn member_groups_keep_insertion_order() {
        let s = storage();
        s.save_group(&group("b", true)).unwrap();
        s.save_group(&group("a", true)).unwrap();
        s.save_group(&group("x", false)).unwrap();

        let groups = s.get_member_groups().unwrap();
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(groups[0].tags.as_deref(), Some(&["אשדוד".to_string()][..]));
        assert_eq!(s.count_groups().unwrap(), 3);
    }

    #[test]
    fn publish_request_lifecycle() {
        let s = storage();
        let targets = vec![ScoredCandidate {
            target_id: "g1".into(),
            name: "דרושים אשדוד".into(),
            url: "https://facebook.com/groups/g1".into(),
            score: 305,
        }];
        assert!(s.save_publish_request("j1", &targets).unwrap());

        let pending = s.get_publish_requests_by_status(PublishStatus::Pending).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].targets, targets);

        assert!(!s.transition_publish_request("j1", PublishStatus::Approved, PublishStatus::Published).unwrap());
        assert!(s.transition_publish_request("j1", PublishStatus::Pending, PublishStatus::Approved).unwrap());
        let req = s.get_publish_request("j1").unwrap().unwrap();
        assert_eq!(req.status, PublishStatus::Approved);
        assert!(s.get_publish_request("nope").unwrap().is_none());
    }

    #[test]
    fn saving_again_does_not_reopen_a_decided_request() {
        let s = storage();
        let first = vec![ScoredCandidate {
            target_id: "g1".into(),
            name: "דרושים אשדוד".into(),
            url: "https://facebook.com/groups/g1".into(),
            score: 305,
        }];
        assert!(s.save_publish_request("j1", &first).unwrap());
        // Still pending: the shortlist is refreshed.
        assert!(s.save_publish_request("j1", &[]).unwrap());
        assert!(s.get_publish_request("j1").unwrap().unwrap().targets.is_empty());
        assert!(s.save_publish_request("j1", &first).unwrap());

        assert!(s.transition_publish_request("j1", PublishStatus::Pending, PublishStatus::Approved).unwrap());
        assert!(!s.save_publish_request("j1", &[]).unwrap());
        let req = s.get_publish_request("j1").unwrap().unwrap();
        assert_eq!(req.status, PublishStatus::Approved);
        assert_eq!(req.targets, first);
        assert!(s.get_publish_requests_by_status(PublishStatus::Pending).unwrap().is_empty());

        assert!(s.save_publish_request("j2", &first).unwrap());
        assert!(s.transition_publish_request("j2", PublishStatus::Pending, PublishStatus::Skipped).unwrap());
        assert!(!s.save_publish_request("j2", &first).unwrap());
        assert_eq!(s.get_publish_request("j2").unwrap().unwrap().status, PublishStatus::Skipped);
    }
}
