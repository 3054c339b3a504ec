use std::time::Duration;

use crate::{Result, TestInfraError};
use sqlx::{Connection, MySqlConnection};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};

const ACCOUNT: &str = "shortlink";
const READY_DEADLINE: Duration = Duration::from_secs(30);
const READY_POLL: Duration = Duration::from_millis(250);

/// A throwaway MySQL 8.4 server with one empty `shortlink` database.
///
/// [`MySqlServer::start`] returns only once the server accepts real client
/// sessions. The image logs "ready for connections" for its bootstrap
/// instance too, so the log line alone is not enough.
pub struct MySqlServer {
    _container: ContainerAsync<GenericImage>,
    database_url: String,
}

impl MySqlServer {
    pub async fn start() -> Result<Self> {
        let container = GenericImage::new("mysql", "8.4")
            .with_exposed_port(3306_u16.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", ACCOUNT)
            .with_env_var("MYSQL_USER", ACCOUNT)
            .with_env_var("MYSQL_PASSWORD", ACCOUNT)
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(3306).await?;
        let database_url = format!("mysql://{ACCOUNT}:{ACCOUNT}@{host}:{port}/{ACCOUNT}");

        let server = Self {
            _container: container,
            database_url,
        };
        server.wait_for_sessions().await?;
        Ok(server)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    async fn wait_for_sessions(&self) -> Result<()> {
        let deadline = tokio::time::Instant::now() + READY_DEADLINE;

        loop {
            let attempt = async {
                let mut conn = MySqlConnection::connect(&self.database_url).await?;
                conn.ping().await?;
                conn.close().await
            };

            match attempt.await {
                Ok(()) => return Ok(()),
                Err(err) if tokio::time::Instant::now() >= deadline => {
                    return Err(TestInfraError::NotReady(err));
                }
                Err(_) => tokio::time::sleep(READY_POLL).await,
            }
        }
    }
}
