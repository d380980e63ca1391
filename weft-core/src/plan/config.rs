//! Planner configuration.

use serde::{Deserialize, Serialize};

/// Options for a [`Planner`](super::Planner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Emit a `trace` event for every call run by `execute()`.
    pub trace_execution: bool,
}

impl PlannerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = PlannerConfig::from_json(r#"{"trace_execution": true}"#).unwrap();
        assert!(config.trace_execution);

        assert_eq!(PlannerConfig::from_json("{}").unwrap(), PlannerConfig::default());
        assert!(!PlannerConfig::default().trace_execution);
    }

    #[test]
    fn mistyped_field_is_rejected() {
        assert!(PlannerConfig::from_json(r#"{"trace_execution": "yes"}"#).is_err());
    }
}
