use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    data::selection::PartySize,
    error::{ConfigError, IoError, RatescopeResult},
};

/// Label that replaces every non-selected hotel in the relabeled tables.
pub const DEFAULT_OTHER_LABEL: &str = "Other Hotels";

/// Defines which observation of a (hotel, room, check-in) triple counts as the latest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationOrder {
    /// **Default.** Rows are assumed to arrive in chronological observation order.
    #[default]
    LoadOrder,

    /// Rows are stably sorted by the named column before sequencing.
    ///
    /// Rows with equal values keep their relative load order.
    Column(String),
}

/// Configuration for loading offer books and computing comparisons.
///
/// # Example
/// ```
/// # use ratescope::prelude::*;
/// let cfg = PipelineConfig::default()
///     .with_other_label("Competitors")
///     .with_observation_order(ObservationOrder::Column("scraped_at".to_string()));
/// assert_eq!(cfg.other_label(), "Competitors");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Label for every hotel other than the selected one.
    other_label: String,

    /// Whether competitive-stock rows are relabeled like the other two tables.
    relabel_competitive: bool,

    /// How the internal observation sequence is derived at load time.
    observation_order: ObservationOrder,

    /// Party size pre-selected when no explicit choice was made.
    default_party_size: PartySize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            other_label: DEFAULT_OTHER_LABEL.to_string(),
            relabel_competitive: true,
            observation_order: ObservationOrder::default(),
            default_party_size: PartySize::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_other_label(self, label: impl Into<String>) -> Self {
        Self {
            other_label: label.into(),
            ..self
        }
    }

    pub fn with_relabel_competitive(self, relabel: bool) -> Self {
        Self {
            relabel_competitive: relabel,
            ..self
        }
    }

    pub fn with_observation_order(self, order: ObservationOrder) -> Self {
        Self {
            observation_order: order,
            ..self
        }
    }

    pub fn with_default_party_size(self, party_size: PartySize) -> Self {
        Self {
            default_party_size: party_size,
            ..self
        }
    }

    pub fn other_label(&self) -> &str {
        &self.other_label
    }

    pub fn relabel_competitive(&self) -> bool {
        self.relabel_competitive
    }

    pub fn observation_order(&self) -> &ObservationOrder {
        &self.observation_order
    }

    pub fn default_party_size(&self) -> PartySize {
        self.default_party_size
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> RatescopeResult<()> {
        if self.other_label.trim().is_empty() {
            return Err(ConfigError::Invalid("other_label must not be blank".to_string()).into());
        }

        if matches!(&self.observation_order, ObservationOrder::Column(name) if name.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "observation_order column name must not be blank".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> RatescopeResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> RatescopeResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            IoError::ReaderCreation(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RatescopeError;

    #[test]
    fn test_defaults_match_dashboard() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.other_label(), "Other Hotels");
        assert!(cfg.relabel_competitive());
        assert_eq!(cfg.observation_order(), &ObservationOrder::LoadOrder);
        assert_eq!(cfg.default_party_size().to_string(), "2");
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let cfg = PipelineConfig::from_json_str(
            r#"{ "relabel_competitive": false, "observation_order": { "column": "scraped_at" } }"#,
        )
        .expect("Failed to parse config");

        assert!(!cfg.relabel_competitive());
        assert_eq!(
            cfg.observation_order(),
            &ObservationOrder::Column("scraped_at".to_string())
        );
        assert_eq!(cfg.other_label(), DEFAULT_OTHER_LABEL);
    }

    #[test]
    fn test_from_json_rejects_blank_label() {
        let err = PipelineConfig::from_json_str(r#"{ "other_label": "  " }"#)
            .expect_err("Blank label must be rejected");
        assert!(matches!(err, RatescopeError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_json_rejects_invalid_party_size() {
        let err = PipelineConfig::from_json_str(r#"{ "default_party_size": 0 }"#)
            .expect_err("Zero party size must be rejected");
        assert!(matches!(err, RatescopeError::Config(ConfigError::Parse(_))));
    }
}
