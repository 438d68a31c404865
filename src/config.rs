//! Relay configuration parsed from environment variables.
//!
//! Every setting has a default; a missing or unparseable value falls back to
//! it rather than failing startup.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HISTORY_LIMIT: usize = 20_000;
pub const DEFAULT_CLIENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Listen port.
    pub port: u16,
    /// Most draw events kept per room; the oldest are dropped beyond this.
    pub history_limit: usize,
    /// Outbound frames buffered per connection before broadcasts to it are skipped.
    pub client_channel_capacity: usize,
    /// Whether a publisher receives its own draw events back.
    pub echo_to_sender: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            client_channel_capacity: DEFAULT_CLIENT_CHANNEL_CAPACITY,
            echo_to_sender: false,
        }
    }
}

impl RelayConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `RELAY_HISTORY_LIMIT`: default 20000
    /// - `RELAY_CLIENT_CHANNEL_CAPACITY`: default 256
    /// - `RELAY_ECHO_TO_SENDER`: `true`/`false`, default false
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse(&lookup, "PORT", defaults.port),
            history_limit: env_parse(&lookup, "RELAY_HISTORY_LIMIT", defaults.history_limit),
            client_channel_capacity: env_parse(&lookup, "RELAY_CLIENT_CHANNEL_CAPACITY", defaults.client_channel_capacity)
                .max(1),
            echo_to_sender: env_parse(&lookup, "RELAY_ECHO_TO_SENDER", defaults.echo_to_sender),
        }
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
