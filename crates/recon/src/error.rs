use std::fmt;

/// Broad error class, for callers that only need to pick a remediation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied options are unusable (key fields, prefix, labels).
    Configuration,
    /// The input tables themselves cannot be reconciled.
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// No key field was supplied.
    NoKeyFields,
    /// Key fields that exist in neither table, in the caller's order.
    MissingKeyFields { fields: Vec<String> },
    /// Both tables have no records.
    EmptyInputs,
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Option validation error (empty prefix, clashing labels, etc.).
    ConfigValidation(String),
}

impl ReconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInputs => ErrorKind::Input,
            Self::NoKeyFields
            | Self::MissingKeyFields { .. }
            | Self::ConfigParse(_)
            | Self::ConfigValidation(_) => ErrorKind::Configuration,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKeyFields => write!(f, "at least one key field must be specified"),
            Self::MissingKeyFields { fields } => {
                write!(f, "key field(s) not found in either table: {}", fields.join(", "))
            }
            Self::EmptyInputs => write!(f, "both primary and secondary tables are empty"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
