use std::env;

/// Application configuration loaded from environment variables.
/// Every knob has a default so a run works out of the box.
#[derive(Debug, Clone)]
pub struct Config {
    // Rate window shared across all seed fetches
    pub rate_window_requests: u32,
    pub rate_window_secs: u64,

    // Global API-call budget; extraction stops issuing requests once spent
    pub api_call_budget: u32,

    // Pagination cap per seed
    pub max_pages_per_seed: u32,

    // Quality filters
    pub min_followers: u64,
    pub min_account_age_days: i64,
    pub allowed_langs: Vec<String>,

    // Community detection
    pub resolution: f64,
    pub label_prop_seed: u64,
    pub representatives_per_community: usize,

    // Unified scoring
    pub graph_weight: f64,
    pub content_weight: f64,
    pub engagement_weight: f64,
    pub adaptive_weights: bool,
}

impl Config {
    /// Load configuration from `FATHOM_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            rate_window_requests: parsed_env("FATHOM_RATE_WINDOW_REQUESTS", 15),
            rate_window_secs: parsed_env("FATHOM_RATE_WINDOW_SECS", 900),
            api_call_budget: parsed_env("FATHOM_API_CALL_BUDGET", 1000),
            max_pages_per_seed: parsed_env("FATHOM_MAX_PAGES_PER_SEED", 5),
            min_followers: parsed_env("FATHOM_MIN_FOLLOWERS", 100),
            min_account_age_days: parsed_env("FATHOM_MIN_ACCOUNT_AGE_DAYS", 30),
            allowed_langs: env::var("FATHOM_ALLOWED_LANGS")
                .unwrap_or_else(|_| "en".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            resolution: parsed_env("FATHOM_RESOLUTION", 1.0),
            label_prop_seed: parsed_env("FATHOM_LABEL_PROP_SEED", 42),
            representatives_per_community: parsed_env("FATHOM_REPRESENTATIVES", 5),
            graph_weight: parsed_env("FATHOM_GRAPH_WEIGHT", 0.33),
            content_weight: parsed_env("FATHOM_CONTENT_WEIGHT", 0.34),
            engagement_weight: parsed_env("FATHOM_ENGAGEMENT_WEIGHT", 0.33),
            adaptive_weights: parsed_env("FATHOM_ADAPTIVE_WEIGHTS", false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // Defaults only; ignores the environment so tests stay hermetic.
        Self {
            rate_window_requests: 15,
            rate_window_secs: 900,
            api_call_budget: 1000,
            max_pages_per_seed: 5,
            min_followers: 100,
            min_account_age_days: 30,
            allowed_langs: vec!["en".to_string()],
            resolution: 1.0,
            label_prop_seed: 42,
            representatives_per_community: 5,
            graph_weight: 0.33,
            content_weight: 0.34,
            engagement_weight: 0.33,
            adaptive_weights: false,
        }
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must parse as {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
