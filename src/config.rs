// Global configuration constants - single source of truth

use std::path::PathBuf;

pub struct Config;

impl Config {
    // Endpoints
    pub const SEARCH_URL: &'static str =
        "https://karriere.mcdonalds.de/ajax/careermap/vicinitySearch";
    pub const SITE_BASE_URL: &'static str = "https://karriere.mcdonalds.de";

    // HTTP/Network config
    pub const TIMEOUT_SECS: u64 = 60;
    pub const UA_SUFFIX: &'static str = "JobUFO GmbH";
    pub const VERIFY_TLS: bool = false;

    // Fetch pool
    pub const WORKERS: usize = 30;
    pub const BATCH_SIZE: usize = 100;
    pub const ATTEMPTS: u32 = 3;

    // Output
    pub const OUTPUT_PATH: &'static str = "parsed_xml/vacancies.xml";
    pub const LOG_DIR: &'static str = "logs";
    pub const COMPANY_NAME: &'static str = "McDonald's";
    pub const CONTACT_EMAIL: &'static str = "fallback@jobufo.com";

    /// Restaurant shards (latitude, longitude, radius km) covering Germany.
    pub const RESTAURANT_SHARDS: [(&'static str, &'static str, &'static str); 17] = [
        ("53.61334884173276", "12.681224089435432", "130"),
        ("54.485599338054136", "9.828327753454914", "95"),
        ("53.13647603266737", "8.246296503454914", "94"),
        ("53.53010766171482", "10.090071086695389", "53"),
        ("51.70278145409504", "13.495832805445389", "135"),
        ("52.109459921009105", "10.299648551076302", "134"),
        ("50.15182910444893", "11.508144644826302", "124"),
        ("48.72313505927419", "12.804531363576302", "76"),
        ("47.752907406324944", "12.672695426076302", "46"),
        ("48.267390358256925", "10.958828238576302", "118"),
        ("48.1649043023955", "8.695644644826302", "103"),
        ("50.217961529121105", "7.904629019826302", "141"),
        ("52.081707263566685", "7.306014569931449", "75"),
        ("51.31911917737777", "6.163436444931449", "76"),
        ("51.55197830773196", "8.294784101181449", "41"),
        ("50.80189961582029", "9.790254110352407", "37"),
        ("49.36234044436509", "9.55472632888086", "65"),
    ];

    pub const RESTAURANT_CATEGORIES: [&'static str; 5] = [
        "INT_REST_EMP",
        "MINIJOB",
        "INT_REST_MGMT",
        "INT_REST_DSTD",
        "INT_REST_AZB",
    ];

    /// Single nationwide shard used for administrative vacancies.
    pub const ADMINISTRATIVE_SHARD: (&'static str, &'static str, &'static str) =
        ("50.664954", "10.96041", "350");

    pub const ADMINISTRATIVE_CATEGORIES: [&'static str; 3] =
        ["INT_VW_BE", "INT_VW_AZDS", "INT_VW_PRWS"];
}

/// Runtime knobs for one pipeline run. Defaults mirror [`Config`]; the CLI
/// and tests override individual fields.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub search_url: String,
    pub site_base_url: String,
    pub workers: usize,
    pub batch_size: usize,
    pub attempts: u32,
    pub timeout_secs: u64,
    pub verify_tls: bool,
    pub output_path: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            search_url: Config::SEARCH_URL.to_string(),
            site_base_url: Config::SITE_BASE_URL.to_string(),
            workers: Config::WORKERS,
            batch_size: Config::BATCH_SIZE,
            attempts: Config::ATTEMPTS,
            timeout_secs: Config::TIMEOUT_SECS,
            verify_tls: Config::VERIFY_TLS,
            output_path: PathBuf::from(Config::OUTPUT_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_constants() {
        let config = HarvestConfig::default();
        assert_eq!(config.workers, 30);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.attempts, 3);
        assert_eq!(config.timeout_secs, 60);
        assert!(!config.verify_tls);
        assert_eq!(config.output_path, PathBuf::from("parsed_xml/vacancies.xml"));
    }

    #[test]
    fn test_shard_tables() {
        assert_eq!(Config::RESTAURANT_SHARDS.len(), 17);
        assert!(Config::RESTAURANT_SHARDS
            .iter()
            .all(|(lat, lon, _)| lat.trim() == *lat && lon.trim() == *lon));
    }
}
