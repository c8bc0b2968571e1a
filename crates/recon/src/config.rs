use serde::Deserialize;

use crate::error::ReconError;
use crate::reconcile::{DEFAULT_CONFLICT_SEPARATOR, DEFAULT_SIMILARITY_THRESHOLD};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine settings: the `[merge]` and `[pipeline]` tables of the config file.
///
/// Unknown tables are ignored so the same file can carry API and export
/// settings for other crates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Join key shared by both inputs.
    pub key_field: String,
    /// Minimum token-set similarity at which the longer text wins.
    pub similarity_threshold: f64,
    /// Joins two irreconcilable values for human review.
    pub conflict_separator: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            key_field: "kurzname".into(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            conflict_separator: DEFAULT_CONFLICT_SEPARATOR.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Post-merge pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Records without this field are dropped after the merge.
    pub required_field: String,
    /// Field holding the label identifier used for color lookup.
    pub label_field: String,
    /// Field the resolved color is written to.
    pub color_field: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            required_field: "hu".into(),
            label_field: "labelIds".into(),
            color_field: "resolved_colorCode".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let names = [
            ("merge.key_field", &self.merge.key_field),
            ("pipeline.required_field", &self.pipeline.required_field),
            ("pipeline.label_field", &self.pipeline.label_field),
            ("pipeline.color_field", &self.pipeline.color_field),
        ];
        for (name, value) in names {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{name} must not be empty")));
            }
        }

        let threshold = self.merge.similarity_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ReconError::ConfigValidation(format!(
                "merge.similarity_threshold must be within 0..=1, got {threshold}"
            )));
        }

        if self.merge.conflict_separator.is_empty() {
            return Err(ReconError::ConfigValidation(
                "merge.conflict_separator must not be empty".into(),
            ));
        }

        // The color column is written by enrichment; it must not clobber an input column
        // the pipeline reads.
        let color = &self.pipeline.color_field;
        if color == &self.merge.key_field
            || color == &self.pipeline.label_field
            || color == &self.pipeline.required_field
        {
            return Err(ReconError::ConfigValidation(format!(
                "pipeline.color_field '{color}' collides with another configured field"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.merge.key_field, "kurzname");
        assert_eq!(config.merge.similarity_threshold, 0.5);
        assert_eq!(config.merge.conflict_separator, "/");
        assert_eq!(config.pipeline.required_field, "hu");
        assert_eq!(config.pipeline.label_field, "labelIds");
        assert_eq!(config.pipeline.color_field, "resolved_colorCode");
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = ReconConfig::from_toml(
            r#"
[merge]
key_field = "id"

[pipeline]
required_field = "inspection_due"

[api]
base_url = "https://example.test"
"#,
        )
        .unwrap();
        assert_eq!(config.merge.key_field, "id");
        assert_eq!(config.merge.similarity_threshold, 0.5);
        assert_eq!(config.pipeline.required_field, "inspection_due");
        assert_eq!(config.pipeline.label_field, "labelIds");
    }

    #[test]
    fn threshold_out_of_range() {
        let err = ReconConfig::from_toml("[merge]\nsimilarity_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn empty_key_field_rejected() {
        let err = ReconConfig::from_toml("[merge]\nkey_field = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("merge.key_field"));
    }

    #[test]
    fn empty_separator_rejected() {
        let err = ReconConfig::from_toml("[merge]\nconflict_separator = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("conflict_separator"));
    }

    #[test]
    fn color_field_collision_rejected() {
        let err = ReconConfig::from_toml("[pipeline]\ncolor_field = \"labelIds\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = ReconConfig::from_toml("[merge\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = ReconConfig::from_toml("[merge]\nsimilarity_threshold = \"high\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
