//! Common configuration keys
//!
//! Pipelines and jobs share a handful of keys (currently only the environment
//! variables). They are imported here so both entities handle them the same way.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Keys shared by every job-like configuration record
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigRecord {
    /// Environment variables exported to the job's commands
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ConfigRecord {
    /// Import the common keys from a configuration mapping
    ///
    /// Keys that are not common to all records are ignored.
    pub fn from_config(data: &Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(data.clone())
    }

    /// Dump the common keys as a mapping
    pub fn dump(&self) -> Mapping {
        let mut ret = Mapping::new();
        if !self.env.is_empty() {
            let env = self
                .env
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), Value::from(v.as_str())))
                .collect();
            ret.insert("env".into(), Value::Mapping(env));
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_unknown_keys() {
        let data: Value = serde_yaml::from_str(
            r#"
            env:
              RUST_LOG: debug
            jobs: {}
            "#,
        )
        .unwrap();

        let record = ConfigRecord::from_config(&data).unwrap();
        assert_eq!(record.env.get("RUST_LOG").map(String::as_str), Some("debug"));
    }

    #[test]
    fn test_dump_omits_empty_env() {
        let record = ConfigRecord::default();
        assert!(record.dump().is_empty());
    }

    #[test]
    fn test_rejects_non_string_env() {
        let data: Value = serde_yaml::from_str("env: [a, b]").unwrap();
        assert!(ConfigRecord::from_config(&data).is_err());
    }
}
