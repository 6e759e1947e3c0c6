use chrono_tz::Tz;
use std::env;

pub const DEFAULT_RESULTS_ADDR: &str = "0.0.0.0:8080";

/// Runtime settings, read from the environment (and `.env` via dotenv)
#[derive(Debug, Clone)]
pub struct Config {
    /// IANA timezone used for the report date (`REPORT_TIMEZONE`)
    pub timezone: Option<Tz>,
    /// Listen address of the results server (`RESULTS_ADDR`)
    pub results_addr: String,
    /// HMAC secret for signed result posts (`RESULTS_SECRET`)
    pub results_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timezone = lookup("REPORT_TIMEZONE")
            .filter(|name| !name.trim().is_empty())
            .and_then(|name| match name.trim().parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    log::warn!("⚠️ Unknown REPORT_TIMEZONE '{}', using local time", name);
                    None
                }
            });

        let results_addr = lookup("RESULTS_ADDR")
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RESULTS_ADDR.to_string());

        let results_secret = lookup("RESULTS_SECRET").filter(|secret| !secret.is_empty());
        if results_secret.is_none() {
            log::debug!("RESULTS_SECRET not set, result posts are accepted unsigned");
        }

        Self {
            timezone,
            results_addr,
            results_secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert!(config.timezone.is_none());
        assert_eq!(config.results_addr, DEFAULT_RESULTS_ADDR);
        assert!(config.results_secret.is_none());
    }

    #[test]
    fn test_reads_values() {
        let config = config_from(&[
            ("REPORT_TIMEZONE", "Europe/Istanbul"),
            ("RESULTS_ADDR", "127.0.0.1:3000"),
            ("RESULTS_SECRET", "s3cret"),
        ]);

        assert_eq!(config.timezone, Some(chrono_tz::Europe::Istanbul));
        assert_eq!(config.results_addr, "127.0.0.1:3000");
        assert_eq!(config.results_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_local() {
        let config = config_from(&[("REPORT_TIMEZONE", "Mars/Olympus_Mons")]);
        assert!(config.timezone.is_none());
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = config_from(&[("RESULTS_ADDR", " "), ("RESULTS_SECRET", "")]);

        assert_eq!(config.results_addr, DEFAULT_RESULTS_ADDR);
        assert!(config.results_secret.is_none());
    }
}
