use std::fmt::Display;
use std::time::Duration;

use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::{AppError, AppResult};

/// Upper bound on how long shutdown waits for queued writes
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    MovieDetails(String),
    PopularMovies,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieDetails(tmdb_id) => write!(f, "movie:{}", tmdb_id),
            CacheKey::PopularMovies => write!(f, "movies:popular"),
        }
    }
}

/// Creates a Redis client for caching
///
/// Opening the client does not connect; connections are made on first use.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    Ok(Client::open(redis_url)?)
}

enum WriterCommand {
    Set { key: String, value: String, ttl: u64 },
    /// Acknowledged once every command queued before it has been handled
    Flush(oneshot::Sender<()>),
}

/// Read-through JSON cache over Redis
///
/// Reads hit Redis directly. Writes are queued to a single background task
/// and applied in order, so request handlers never wait on them.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    writer: mpsc::UnboundedSender<WriterCommand>,
}

/// Lets `main` flush pending writes before exiting
pub struct CacheWriterHandle {
    writer: mpsc::UnboundedSender<WriterCommand>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.writer.send(WriterCommand::Flush(ack_tx)).is_err() {
            return;
        }

        match tokio::time::timeout(FLUSH_TIMEOUT, ack_rx).await {
            Ok(_) => tracing::info!("Cache writes flushed"),
            Err(_) => tracing::warn!(
                timeout_secs = FLUSH_TIMEOUT.as_secs(),
                "Gave up waiting for cache writes"
            ),
        }
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (writer, commands) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(redis_client.clone(), commands));

        let cache = Self {
            redis_client,
            writer: writer.clone(),
        };
        (cache, CacheWriterHandle { writer })
    }

    /// Returns `Ok(None)` on a miss
    ///
    /// Connection failures and undecodable entries are errors; `cached!`
    /// treats them as misses.
    pub async fn get_from_cache<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache entry {} is unreadable: {}", key, e))
                })
            })
            .transpose()
    }

    /// Queues a value for writing without waiting on Redis
    pub fn set_in_background<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };

        let command = WriterCommand::Set {
            key: key.to_string(),
            value,
            ttl,
        };
        if self.writer.send(command).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

/// Applies queued commands in order, reusing one connection until it fails
async fn run_writer(client: Client, mut commands: mpsc::UnboundedReceiver<WriterCommand>) {
    let mut conn: Option<MultiplexedConnection> = None;

    while let Some(command) = commands.recv().await {
        match command {
            WriterCommand::Set { key, value, ttl } => {
                if let Err(e) = write_entry(&client, &mut conn, &key, value, ttl).await {
                    conn = None;
                    tracing::warn!(key = %key, error = %e, "Failed to write to Redis cache");
                }
            }
            WriterCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

async fn write_entry(
    client: &Client,
    conn: &mut Option<MultiplexedConnection>,
    key: &str,
    value: String,
    ttl: u64,
) -> AppResult<()> {
    let mut active = match conn.as_ref() {
        Some(active) => active.clone(),
        None => {
            let fresh = client.get_multiplexed_async_connection().await?;
            *conn = Some(fresh.clone());
            fresh
        }
    };

    let _: () = active.set_ex(key, value, ttl).await?;
    Ok(())
}
