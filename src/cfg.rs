use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Protocol version sent in the handshake. `-1` asks the server to answer
/// regardless of the client version.
pub const HANDSHAKE_PROTOCOL_VERSION: i32 = -1;

pub const DEFAULT_PORT: u16 = 25565;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfiguration {
    /// Whole-session timeout: connect, status and pong must all land
    /// within it.
    pub timeout_ms: u64,
    /// Whether to try a `_minecraft._tcp` SRV lookup before connecting.
    pub resolve_srv: bool,
    /// Protocol version advertised in the handshake.
    pub protocol_version: i32,
}

impl Default for PingConfiguration {
    fn default() -> Self {
        PingConfiguration {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            resolve_srv: true,
            protocol_version: HANDSHAKE_PROTOCOL_VERSION,
        }
    }
}

impl PingConfiguration {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let mut file = File::open(path).await?;
        let mut buf = String::new();
        file.read_to_string(&mut buf).await?;

        Ok(toml::from_str(&buf)?)
    }
}
