use anyhow::{bail, Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token. Also the secret path segment of the webhook route.
    pub telegram_token: String,
    pub bind_address: IpAddr,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = match lookup("TELEGRAM_TOKEN") {
            Some(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => bail!("No TELEGRAM_TOKEN found in environment variables"),
        };

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port))?,
            None => DEFAULT_PORT,
        };

        let bind_address = match lookup("BIND_ADDRESS") {
            Some(addr) => addr
                .trim()
                .parse::<IpAddr>()
                .with_context(|| format!("Invalid BIND_ADDRESS value: {}", addr))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        Ok(Config {
            telegram_token,
            bind_address,
            port,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = load(&[("PORT", "9000")]).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }

    #[test]
    fn test_blank_token_is_fatal() {
        assert!(load(&[("TELEGRAM_TOKEN", "   ")]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("TELEGRAM_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.telegram_token, "123:abc");
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_port_and_address_overrides() {
        let config = load(&[
            ("TELEGRAM_TOKEN", "t"),
            ("PORT", "10000"),
            ("BIND_ADDRESS", "127.0.0.1"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:10000");
    }

    #[test]
    fn test_invalid_port_is_fatal() {
        let err = load(&[("TELEGRAM_TOKEN", "t"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT"));
    }
}
