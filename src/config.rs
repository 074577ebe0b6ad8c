use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP API settings
    pub listen_addr: String,
    pub debug: bool,

    // Upstream geolocation provider
    pub ip_api_base_url: String,
    pub ip_api_key: String,

    // Temporal block cleanup
    pub cleanup_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            debug: false,
            ip_api_base_url: "https://api.ipgeolocation.io/ipgeo".to_string(),
            ip_api_key: String::new(),
            cleanup_interval_secs: 300,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr =
        std::env::var("GEOBLOCKER_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let debug = std::env::var("DEBUG").is_ok();

    let ip_api_base_url = std::env::var("GEOBLOCKER_IPAPI_BASE_URL")
        .unwrap_or_else(|_| "https://api.ipgeolocation.io/ipgeo".to_string());

    let ip_api_key = std::env::var("GEOBLOCKER_IPAPI_KEY").unwrap_or_default();

    let cleanup_interval_secs = std::env::var("GEOBLOCKER_CLEANUP_INTERVAL_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    Ok(Config {
        listen_addr,
        debug,
        ip_api_base_url,
        ip_api_key,
        cleanup_interval_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.cleanup_interval_secs, 300);
        assert!(!cfg.debug);
        assert!(cfg.ip_api_key.is_empty());
    }

    #[test]
    fn test_load_config_defaults() {
        std::env::remove_var("GEOBLOCKER_LISTEN_ADDR");
        std::env::remove_var("GEOBLOCKER_CLEANUP_INTERVAL_SECS");

        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.ip_api_base_url, "https://api.ipgeolocation.io/ipgeo");
        assert_eq!(cfg.cleanup_interval_secs, 300);
    }

    #[test]
    fn test_load_config_with_custom_listen_addr() {
        std::env::set_var("GEOBLOCKER_LISTEN_ADDR", "127.0.0.1:9000");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        std::env::remove_var("GEOBLOCKER_LISTEN_ADDR");
    }

    #[test]
    fn test_load_config_with_api_settings() {
        std::env::set_var("GEOBLOCKER_IPAPI_BASE_URL", "http://localhost:9999/ipgeo");
        std::env::set_var("GEOBLOCKER_IPAPI_KEY", "test-key");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.ip_api_base_url, "http://localhost:9999/ipgeo");
        assert_eq!(cfg.ip_api_key, "test-key");
        std::env::remove_var("GEOBLOCKER_IPAPI_BASE_URL");
        std::env::remove_var("GEOBLOCKER_IPAPI_KEY");
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        std::env::set_var("GEOBLOCKER_CLEANUP_INTERVAL_SECS", "not_a_number");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.cleanup_interval_secs, 300); // default
        std::env::remove_var("GEOBLOCKER_CLEANUP_INTERVAL_SECS");
    }
}
