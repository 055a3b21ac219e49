use std::env;

const DEFAULT_PROVIDER_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Service configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind: String,
    pub port: u16,

    // ── Provider client ────────────────────────────────────────────
    pub provider_base_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("FINDATA_BIND", "127.0.0.1"),
            port: env_u16("FINDATA_PORT", 8000),
            provider_base_url: env_str("FINDATA_PROVIDER_BASE_URL", DEFAULT_PROVIDER_BASE_URL),
            http_timeout_secs: env_u64("FINDATA_HTTP_TIMEOUT_SECS", 30).max(1),
            user_agent: env_str("FINDATA_USER_AGENT", DEFAULT_USER_AGENT),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            http_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, val: &str) -> Option<String> {
        let prev = env::var(key).ok();
        env::set_var(key, val);
        prev
    }

    fn restore_env(key: &str, prev: Option<String>) {
        match prev {
            Some(v) => env::set_var(key, v),
            None => env::remove_var(key),
        }
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();

        let prev_port = set_env("FINDATA_PORT", "");
        let prev_url = set_env("FINDATA_PROVIDER_BASE_URL", " ");

        let cfg = HubConfig::from_env();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.provider_base_url, DEFAULT_PROVIDER_BASE_URL);

        restore_env("FINDATA_PORT", prev_port);
        restore_env("FINDATA_PROVIDER_BASE_URL", prev_url);
    }

    #[test]
    fn from_env_reads_overrides_and_clamps_timeout() {
        let _guard = ENV_LOCK.lock().unwrap();

        let prev_port = set_env("FINDATA_PORT", "9090");
        let prev_timeout = set_env("FINDATA_HTTP_TIMEOUT_SECS", "0");

        let cfg = HubConfig::from_env();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.http_timeout_secs, 1);

        restore_env("FINDATA_PORT", prev_port);
        restore_env("FINDATA_HTTP_TIMEOUT_SECS", prev_timeout);
    }
}
