pub mod cfg;
pub mod error;
pub mod net_io;
pub mod network;
pub mod status;

use std::time::Duration;

pub use cfg::PingConfiguration;
pub use error::{ParseError, PingError};
pub use network::ParsedServer;
pub use status::ServerStatus;

/// Pings `address` (`host` or `host:port`, default port 25565) and returns
/// the normalized server status.
///
/// The timeout covers the whole exchange: SRV lookup, connect, status and
/// pong. On expiry the connection is dropped and [`PingError::Timeout`]
/// is returned.
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), emberping::PingError> {
/// use std::time::Duration;
///
/// let status = emberping::ping("mc.hypixel.net", Duration::from_secs(5)).await?;
/// println!("{} ({:?} ms)", status.motd.clear, status.ping);
/// # Ok(())
/// # }
/// ```
pub async fn ping(address: &str, timeout: Duration) -> Result<ServerStatus, PingError> {
    let config = PingConfiguration {
        timeout_ms: timeout.as_millis() as u64,
        ..Default::default()
    };

    ping_with_config(address, &config).await
}

/// As [`ping`], with SRV resolution and the advertised protocol version
/// under caller control.
pub async fn ping_with_config(
    address: &str,
    config: &PingConfiguration,
) -> Result<ServerStatus, PingError> {
    let server = ParsedServer::parse(address)?;
    let timeout = config.timeout();

    match tokio::time::timeout(timeout, network::open_connection(server, config)).await {
        Ok(result) => result,
        Err(_) => Err(PingError::Timeout(timeout)),
    }
}
