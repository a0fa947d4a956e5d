use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Default endpoint shared by producer and viewer.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:5558";

/// A parsed `tcp://host:port` endpoint URL.
///
/// The producer binds the endpoint and pushes frames; the viewer connects
/// and pulls them. Only the `tcp` scheme is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host component (name or address literal).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port component.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` form for socket address resolution.
    pub fn authority(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp://{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TransportError::InvalidEndpoint {
            url: url.to_string(),
            reason,
        };

        let rest = url
            .strip_prefix("tcp://")
            .ok_or_else(|| invalid("unsupported scheme (expected tcp://)"))?;

        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;

        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;

        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_endpoint() {
        let ep: Endpoint = DEFAULT_ENDPOINT.parse().unwrap();
        assert_eq!(ep.host(), "127.0.0.1");
        assert_eq!(ep.port(), 5558);
    }

    #[test]
    fn display_roundtrips() {
        let ep: Endpoint = "tcp://localhost:9000".parse().unwrap();
        assert_eq!(ep.to_string(), "tcp://localhost:9000");
        let again: Endpoint = ep.to_string().parse().unwrap();
        assert_eq!(again, ep);
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = "ipc:///tmp/live.sock".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, TransportError::InvalidEndpoint { .. }));
    }

    #[test]
    fn rejects_missing_or_invalid_port() {
        assert!("tcp://127.0.0.1".parse::<Endpoint>().is_err());
        assert!("tcp://127.0.0.1:notaport".parse::<Endpoint>().is_err());
        assert!("tcp://127.0.0.1:70000".parse::<Endpoint>().is_err());
    }

    #[test]
    fn rejects_missing_host() {
        let err = "tcp://:5558".parse::<Endpoint>().unwrap_err();
        assert!(matches!(
            err,
            TransportError::InvalidEndpoint {
                reason: "missing host",
                ..
            }
        ));
    }
}
