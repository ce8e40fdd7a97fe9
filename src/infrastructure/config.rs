use std::env;

use crate::domain::lending::DEFAULT_MAX_RENEWALS;

/// Rules applied to new checkouts
#[derive(Clone, Debug)]
pub struct LendingPolicy {
    /// Renewal cap stamped on each new loan
    pub max_renewals: i32,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            max_renewals: DEFAULT_MAX_RENEWALS,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub lending: LendingPolicy,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://library.db?mode=rwc".to_string());

        let max_renewals = env::var("MAX_RENEWALS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(DEFAULT_MAX_RENEWALS);

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            lending: LendingPolicy { max_renewals },
            seed_demo: env::var("SEED_DEMO")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(false),
        }
    }
}
