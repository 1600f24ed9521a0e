//! Database bootstrap
//!
//! Connects a Postgres pool with a fixed number of attempts and a fixed delay
//! between them. Only used at process start.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connection settings
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub max_connections: u32,
    pub attempts: u32,
    pub delay: Duration,
    /// How long one attempt may wait for a connection
    pub acquire_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            attempts: 10,
            delay: Duration::from_secs(2),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Connect, retrying on failure.
///
/// Returns the last error once every attempt has failed.
pub async fn connect_with_retry(
    database_url: &str,
    options: &ConnectOptions,
) -> Result<PgPool, sqlx::Error> {
    let attempts = options.attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(database_url)
            .await;

        match result {
            Ok(pool) => {
                tracing::info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Failed to connect to database, retrying"
                );
                tokio::time::sleep(options.delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempts, error = %e, "Could not connect to database");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let options = ConnectOptions {
            max_connections: 1,
            attempts: 2,
            delay: Duration::from_millis(10),
            acquire_timeout: Duration::from_millis(200),
        };

        // Port 1 on localhost refuses connections immediately.
        let result = connect_with_retry("postgres://nobody@127.0.0.1:1/none", &options).await;
        assert!(result.is_err());
    }
}
