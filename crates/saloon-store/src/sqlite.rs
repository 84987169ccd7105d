use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use saloon_core::traits::ContentStore;
use saloon_core::types::{ContentSnapshot, Reply, Topic};
use saloon_core::{Error, Result};

/// Tables the snapshot reads. The forum owns the real schema; this is only
/// applied by `init_schema` for development databases and tests.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS replies (
    id TEXT PRIMARY KEY,
    topic_id TEXT NOT NULL REFERENCES topics(id),
    content TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
);
"#;

const SELECT_TOPICS: &str = "SELECT id, title, content FROM topics WHERE deleted = 0";
// Replies under a deleted topic would deep-link to a removed page.
const SELECT_REPLIES: &str = "SELECT r.id, r.topic_id, r.content FROM replies r \
    JOIN topics t ON t.id = r.topic_id \
    WHERE r.deleted = 0 AND t.deleted = 0";

/// The forum database, read through sqlx.
#[derive(Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::ContentStore(format!("invalid database url '{}': {}", database_url, e)))?
            .create_if_missing(true);

        // Every connection to `:memory:` is a separate database, so keep exactly one alive.
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { max_connections })
            .acquire_timeout(Duration::from_secs(10));
        if in_memory {
            pool_options = pool_options.min_connections(1).idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| Error::ContentStore(format!("failed to connect to content store: {}", e)))?;
        info!(url = database_url, "content store connected");
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<()> {
        for stmt in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::ContentStore(format!("failed to init schema: {}", e)))?;
        }
        Ok(())
    }

    pub async fn insert_topic(&self, topic: &Topic, deleted: bool) -> Result<()> {
        sqlx::query("INSERT INTO topics (id, title, content, deleted) VALUES (?, ?, ?, ?)")
            .bind(&topic.id)
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(deleted)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::ContentStore(format!("failed to insert topic {}: {}", topic.id, e)))?;
        Ok(())
    }

    pub async fn insert_reply(&self, reply: &Reply, deleted: bool) -> Result<()> {
        sqlx::query("INSERT INTO replies (id, topic_id, content, deleted) VALUES (?, ?, ?, ?)")
            .bind(&reply.id)
            .bind(&reply.topic_id)
            .bind(&reply.content)
            .bind(deleted)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::ContentStore(format!("failed to insert reply {}: {}", reply.id, e)))?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    /// Both tables are read inside one transaction so topics and replies
    /// come from the same database state.
    async fn snapshot(&self) -> Result<ContentSnapshot> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await.map_err(read_failed)?;

        let topics = sqlx::query(SELECT_TOPICS)
            .fetch_all(&mut *tx)
            .await
            .map_err(read_failed)?
            .iter()
            .map(topic_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_failed)?;

        let replies = sqlx::query(SELECT_REPLIES)
            .fetch_all(&mut *tx)
            .await
            .map_err(read_failed)?
            .iter()
            .map(reply_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_failed)?;

        // read-only
        tx.rollback().await.map_err(read_failed)?;

        debug!(topics = topics.len(), replies = replies.len(), elapsed_ms = started.elapsed().as_millis() as u64, "content snapshot read");
        Ok(ContentSnapshot { topics, replies })
    }
}

fn topic_from_row(row: &SqliteRow) -> std::result::Result<Topic, sqlx::Error> {
    Ok(Topic { id: row.try_get("id")?, title: row.try_get("title")?, content: row.try_get("content")? })
}

fn reply_from_row(row: &SqliteRow) -> std::result::Result<Reply, sqlx::Error> {
    Ok(Reply { id: row.try_get("id")?, topic_id: row.try_get("topic_id")?, content: row.try_get("content")? })
}

fn read_failed(e: sqlx::Error) -> Error {
    Error::ContentStore(e.to_string())
}
