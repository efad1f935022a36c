use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const DEFAULT_PREFIX: &str = "ERP";
pub const DEFAULT_DISPLAY_COLUMN: &str = "MDGKey";

/// Column name suffix for the mapping table's source-label column (`<prefix>System`).
pub const SOURCE_COLUMN_SUFFIX: &str = "System";

// ---------------------------------------------------------------------------
// Merge options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    #[serde(default)]
    pub key_fields: Vec<String>,
    /// Prepended to every data column in the mapping table.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Name of the display identifier column in both outputs.
    #[serde(default = "default_display_column")]
    pub display_column: String,
    #[serde(default)]
    pub labels: SourceNames,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            key_fields: Vec::new(),
            prefix: default_prefix(),
            display_column: default_display_column(),
            labels: SourceNames::default(),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_display_column() -> String {
    DEFAULT_DISPLAY_COLUMN.to_string()
}

// ---------------------------------------------------------------------------
// Source names
// ---------------------------------------------------------------------------

/// Text written into the mapping table's source column for each extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNames {
    #[serde(default = "default_primary_name")]
    pub primary: String,
    #[serde(default = "default_secondary_name")]
    pub secondary: String,
}

impl Default for SourceNames {
    fn default() -> Self {
        Self {
            primary: default_primary_name(),
            secondary: default_secondary_name(),
        }
    }
}

fn default_primary_name() -> String {
    "PRIMARY".to_string()
}

fn default_secondary_name() -> String {
    "SECONDARY".to_string()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeOptions {
    pub fn with_key_fields<I, S>(key_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_fields: key_fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let options: MergeOptions =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Name of the mapping table's source-label column.
    pub fn source_column(&self) -> String {
        format!("{}{}", self.prefix, SOURCE_COLUMN_SUFFIX)
    }

    /// Structural checks that need no table. Key field presence is checked
    /// against the tables at reconcile time.
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.prefix.trim().is_empty() {
            return Err(ReconError::ConfigValidation("prefix must not be empty".into()));
        }

        if self.display_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "display_column must not be empty".into(),
            ));
        }

        if self.display_column == self.source_column() {
            return Err(ReconError::ConfigValidation(format!(
                "display_column '{}' collides with the source column",
                self.display_column
            )));
        }

        if self.labels.primary.trim().is_empty() || self.labels.secondary.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "source labels must not be empty".into(),
            ));
        }

        if self.labels.primary == self.labels.secondary {
            return Err(ReconError::ConfigValidation(format!(
                "primary and secondary labels must differ, both are '{}'",
                self.labels.primary
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
    fn parse_minimal() {
        let o = MergeOptions::from_toml(r#"key_fields = ["Country/Region Key"]"#).unwrap();
        assert_eq!(o.key_fields, vec!["Country/Region Key"]);
        assert_eq!(o.prefix, "ERP");
        assert_eq!(o.display_column, "MDGKey");
        assert_eq!(o.labels.primary, "PRIMARY");
        assert_eq!(o.labels.secondary, "SECONDARY");
        assert_eq!(o.source_column(), "ERPSystem");
    }

    #[test]
    fn parse_full() {
        let input = r#"
key_fields = ["Country", "Region"]
prefix = "SAP"
display_column = "GoldenKey"

[labels]
primary = "S4"
secondary = "ECC"
"#;
        let o = MergeOptions::from_toml(input).unwrap();
        assert_eq!(o.key_fields.len(), 2);
        assert_eq!(o.prefix, "SAP");
        assert_eq!(o.display_column, "GoldenKey");
        assert_eq!(o.labels.primary, "S4");
        assert_eq!(o.labels.secondary, "ECC");
        assert_eq!(o.source_column(), "SAPSystem");
    }

    #[test]
    fn partial_labels_keep_defaults() {
        let o = MergeOptions::from_toml("[labels]\nprimary = \"S4\"\n").unwrap();
        assert_eq!(o.labels.primary, "S4");
        assert_eq!(o.labels.secondary, "SECONDARY");
        assert!(o.key_fields.is_empty());
    }

    #[test]
    fn reject_empty_prefix() {
        let err = MergeOptions::from_toml("prefix = \"  \"").unwrap_err();
        assert!(err.to_string().contains("prefix must not be empty"));
    }

    #[test]
    fn reject_equal_labels() {
        let err = MergeOptions::from_toml("[labels]\nprimary = \"X\"\nsecondary = \"X\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn reject_display_column_clash() {
        let err = MergeOptions::from_toml("display_column = \"ERPSystem\"").unwrap_err();
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn reject_unparseable() {
        let err = MergeOptions::from_toml("key_fields = 3").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
