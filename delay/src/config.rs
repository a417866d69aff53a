use crate::delay::Delay;
use crate::error::DelayError;
use anyhow::{Context, Result};
use chrono::TimeDelta;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Serializable description of a [`Delay`].
///
/// ```yaml
/// kind: uniform
/// base_ms: 1000
/// spread_ms: 250
/// seed: 99
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayConfig {
    Fixed {
        base_ms: i64,
    },
    Uniform {
        base_ms: i64,
        spread_ms: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
    Normal {
        base_ms: i64,
        std_dev_ms: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

impl DelayConfig {
    /// Reads a config file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).with_context(|| format!("read delay config {}", path.display()))?;
        let is_json = path.extension().map(|e| e.eq_ignore_ascii_case("json")).unwrap_or(false);
        let cfg = if is_json { Self::from_json_str(&data)? } else { Self::from_yaml_str(&data)? };
        info!("loaded delay config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("parse delay config yaml")
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse delay config json")
    }

    pub fn base_ms(&self) -> i64 {
        match self {
            DelayConfig::Fixed { base_ms }
            | DelayConfig::Uniform { base_ms, .. }
            | DelayConfig::Normal { base_ms, .. } => *base_ms,
        }
    }

    /// `DELAY_BASE_MS` overrides the base, `DELAY_SEED` the seed of random kinds.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse::<i64>("DELAY_BASE_MS") {
            debug!("DELAY_BASE_MS overrides base to {}ms", v);
            match self {
                DelayConfig::Fixed { base_ms }
                | DelayConfig::Uniform { base_ms, .. }
                | DelayConfig::Normal { base_ms, .. } => *base_ms = v,
            }
        }
        if let Some(v) = env_parse::<u64>("DELAY_SEED") {
            match self {
                DelayConfig::Fixed { .. } => {}
                DelayConfig::Uniform { seed, .. } | DelayConfig::Normal { seed, .. } => {
                    debug!("DELAY_SEED overrides seed to {}", v);
                    *seed = Some(v);
                }
            }
        }
    }

    pub fn build(&self) -> Result<Delay, DelayError> {
        match *self {
            DelayConfig::Fixed { base_ms } => Ok(Delay::fixed(millis(base_ms)?)),
            DelayConfig::Uniform { base_ms, spread_ms, seed } => {
                Delay::variable_uniform(millis(base_ms)?, millis(spread_ms)?, rng(seed))
            }
            DelayConfig::Normal { base_ms, std_dev_ms, seed } => {
                Delay::variable_normal(millis(base_ms)?, millis(std_dev_ms)?, rng(seed))
            }
        }
    }
}

fn millis(ms: i64) -> Result<TimeDelta, DelayError> {
    // TimeDelta::milliseconds panics past its range
    TimeDelta::try_milliseconds(ms).ok_or(DelayError::MillisOutOfRange(ms))
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().filter(|v| !v.is_empty()).and_then(|v| v.trim().parse().ok())
}
