use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Server settings: `[basic]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Default: `0.0.0.0`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: IpAddr,

    /// Default: `8190`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// `EnvFilter` directive used when `RUST_LOG` is unset. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Key the record admin API expects in `x-api-key` or a bearer token.
    /// Numbers are accepted and kept as their decimal text. No default.
    #[serde(default, deserialize_with = "admin_key_text")]
    pub admin_key: String,
}

impl BasicConfig {
    pub fn listen_socket(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.listen_port)
    }
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            loglevel: default_loglevel(),
            admin_key: String::new(),
        }
    }
}

fn admin_key_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(key) => Ok(key.trim().to_string()),
        Value::Number(key) => Ok(key.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "basic.admin_key must be text or a number, got {other}"
        ))),
    }
}

fn default_listen_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_listen_port() -> u16 {
    8190
}

fn default_loglevel() -> String {
    "info".to_string()
}
