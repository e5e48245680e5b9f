use huddle_core::IceServerConfig;
use std::env;

pub const TURN_URL_ENV: &str = "TURN_URL";
pub const TURN_USERNAME_ENV: &str = "TURN_USERNAME";
pub const TURN_CREDENTIAL_ENV: &str = "TURN_CREDENTIAL";

/// Listen address and the ICE servers advertised to clients.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            ice_servers: IceServerConfig::default_stun(),
        }
    }
}

impl RelayConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Appends a TURN server taken from `TURN_URL`, `TURN_USERNAME` and
    /// `TURN_CREDENTIAL` when `TURN_URL` is set.
    pub fn with_turn_from_env(mut self) -> Self {
        if let Some(turn) = turn_from_vars(|key| env::var(key).ok()) {
            self.ice_servers.push(turn);
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn turn_from_vars(var: impl Fn(&str) -> Option<String>) -> Option<IceServerConfig> {
    let url = var(TURN_URL_ENV).filter(|url| !url.trim().is_empty())?;
    Some(IceServerConfig {
        urls: vec![url],
        username: var(TURN_USERNAME_ENV),
        credential: var(TURN_CREDENTIAL_ENV),
    })
}
