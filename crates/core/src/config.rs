use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpantopoError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Statements longer than this are truncated before being stored on a
    /// slow-statement record.
    pub max_slow_sql_length: usize,
    pub db_latency_thresholds: DbLatencyThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_slow_sql_length: 2000,
            db_latency_thresholds: DbLatencyThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

/// Per-database-type slow-access latency thresholds, in milliseconds.
///
/// Parsed from the compact `"default:200,mysql:100"` syntax; a `default`
/// entry is mandatory and answers for any unlisted database type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbLatencyThresholds {
    thresholds: BTreeMap<String, i64>,
}

impl Default for DbLatencyThresholds {
    fn default() -> Self {
        let mut thresholds = BTreeMap::new();
        thresholds.insert("default".to_string(), 200);
        thresholds.insert("mongodb".to_string(), 100);
        Self { thresholds }
    }
}

impl DbLatencyThresholds {
    pub fn parse(spec: &str) -> Result<Self> {
        let mut thresholds = BTreeMap::new();
        for entry in spec.split(',') {
            let trimmed = entry.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some((db_type, millis)) = trimmed.split_once(':') else {
                return Err(SpantopoError::Config(
                    "threshold entries must use type:millis syntax".to_string(),
                ));
            };
            let db_type = db_type.trim().to_ascii_lowercase();
            if db_type.is_empty() {
                return Err(SpantopoError::Config(
                    "threshold database type cannot be empty".to_string(),
                ));
            }
            let millis = millis.trim().parse::<i64>().map_err(|e| {
                SpantopoError::Config(format!("bad threshold for {db_type}: {e}"))
            })?;
            thresholds.insert(db_type, millis);
        }
        if !thresholds.contains_key("default") {
            return Err(SpantopoError::Config(
                "threshold table needs a default entry".to_string(),
            ));
        }
        Ok(Self { thresholds })
    }

    pub fn threshold(&self, db_type: &str) -> i64 {
        let key = db_type.to_ascii_lowercase();
        match self.thresholds.get(&key) {
            Some(millis) => *millis,
            None => self.thresholds.get("default").copied().unwrap_or(i64::MAX),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    max_slow_sql_length: Option<usize>,
    db_latency_thresholds: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("SPANTOPO_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("spantopo/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| SpantopoError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| SpantopoError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        max_slow_sql_length: env::var("SPANTOPO_MAX_SLOW_SQL_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok()),
        db_latency_thresholds: env::var("SPANTOPO_DB_LATENCY_THRESHOLDS").ok(),
    }
}

fn apply_overrides(cfg: &mut AnalysisConfig, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.max_slow_sql_length {
        cfg.max_slow_sql_length = v;
    }
    if let Some(v) = overrides.db_latency_thresholds {
        cfg.db_latency_thresholds = DbLatencyThresholds::parse(&v).map_err(|e| {
            SpantopoError::Config(format!("bad db_latency_thresholds in {source}: {e} (value={v})"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_slow_sql_cap() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.max_slow_sql_length, 2000);
        assert_eq!(cfg.db_latency_thresholds.threshold("mongodb"), 100);
    }

    #[test]
    fn parse_thresholds_accepts_list() {
        let thresholds = DbLatencyThresholds::parse("default:200, mysql:100, Redis:20").unwrap();
        assert_eq!(thresholds.threshold("mysql"), 100);
        assert_eq!(thresholds.threshold("redis"), 20);
    }

    #[test]
    fn unknown_db_type_falls_back_to_default() {
        let thresholds = DbLatencyThresholds::parse("default:200,mysql:100").unwrap();
        assert_eq!(thresholds.threshold("h2"), 200);
    }

    #[test]
    fn parse_thresholds_rejects_bad_entries() {
        assert!(DbLatencyThresholds::parse("mysql").is_err());
        assert!(DbLatencyThresholds::parse("mysql:abc,default:200").is_err());
        assert!(DbLatencyThresholds::parse(":100,default:200").is_err());
    }

    #[test]
    fn parse_thresholds_requires_default() {
        assert!(DbLatencyThresholds::parse("mysql:100").is_err());
    }

    #[test]
    fn apply_file_overrides_updates_fields() {
        let mut cfg = AnalysisConfig::default();
        let file = ConfigOverrides {
            max_slow_sql_length: Some(512),
            db_latency_thresholds: Some("default:300,mysql:150".to_string()),
        };

        apply_overrides(&mut cfg, file, "config file").unwrap();

        assert_eq!(cfg.max_slow_sql_length, 512);
        assert_eq!(cfg.db_latency_thresholds.threshold("mysql"), 150);
        assert_eq!(cfg.db_latency_thresholds.threshold("oracle"), 300);
    }
}
