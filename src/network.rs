pub mod session;

use std::net::IpAddr;

use hickory_resolver::TokioAsyncResolver;
use log::{debug, info};
use regex::Regex;
use tokio::net::TcpStream;

use crate::cfg::{PingConfiguration, DEFAULT_PORT};
use crate::error::{ParseError, PingError};
use crate::network::session::{PingSession, Transport};
use crate::status::ServerStatus;

lazy_static::lazy_static! {
    static ref HOST_PORT_RE: Regex = Regex::new(r"^(.+):(\d+)$").unwrap();
}

/// Target server as parsed from user input or resolved via SRV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedServer {
    pub hostname: String,
    pub port: u16,
}

impl ParsedServer {
    /// Parses `host` or `host:port` syntax, defaulting to port 25565.
    pub fn parse(address: &str) -> Result<Self, ParseError> {
        if address.is_empty() {
            return Err(ParseError::InvalidAddress(address.to_string()));
        }

        match HOST_PORT_RE.captures(address) {
            Some(captures) => {
                let hostname = captures[1].to_string();
                let port = captures[2]
                    .parse::<u16>()
                    .map_err(|_| ParseError::InvalidAddress(address.to_string()))?;

                Ok(ParsedServer { hostname, port })
            }
            None => Ok(ParsedServer {
                hostname: address.to_string(),
                port: DEFAULT_PORT,
            }),
        }
    }
}

/// Looks up `_minecraft._tcp.<hostname>` and returns the first SRV target.
/// Any lookup failure or an empty record set falls back to `None`.
async fn resolve_srv(server: &ParsedServer) -> Option<ParsedServer> {
    // IP literals can not carry SRV records.
    if server.hostname.parse::<IpAddr>().is_ok() {
        return None;
    }

    let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(e) => {
            debug!("Could not build DNS resolver from system config: {}", e);
            return None;
        }
    };

    let lookup = match resolver
        .srv_lookup(format!("_minecraft._tcp.{}", server.hostname))
        .await
    {
        Ok(lookup) => lookup,
        Err(e) => {
            debug!("No SRV record for {}: {}", server.hostname, e);
            return None;
        }
    };

    lookup.iter().next().map(|record| ParsedServer {
        hostname: record.target().to_utf8().trim_end_matches('.').to_string(),
        port: record.port(),
    })
}

/// Resolves the effective target, connects, and drives one full ping
/// session over the TCP stream. The caller wraps this in the session
/// timeout; dropping the future closes the socket.
pub async fn open_connection(
    server: ParsedServer,
    config: &PingConfiguration,
) -> Result<ServerStatus, PingError> {
    let target = if config.resolve_srv {
        match resolve_srv(&server).await {
            Some(resolved) => {
                info!(
                    "SRV record for {} points at {}:{}",
                    server.hostname, resolved.hostname, resolved.port
                );
                resolved
            }
            None => server,
        }
    } else {
        server
    };

    let mut stream = TcpStream::connect((target.hostname.as_str(), target.port)).await?;

    let session = PingSession::new(target, config.protocol_version);
    let status = session.run(&mut stream).await?;

    stream.close().await?;

    Ok(status)
}
