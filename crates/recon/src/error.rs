use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty field name, threshold out of range, etc.).
    ConfigValidation(String),
    /// The join key is not a column of one of the inputs.
    MissingKeyField { input: String, field: String },
    /// The same key appears on more than one record of a single input.
    DuplicateKey { input: String, key: String },
    /// A column the pipeline depends on is not in the merged schema.
    MissingColumn { column: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingKeyField { input, field } => {
                write!(f, "{input} input: missing key field '{field}'")
            }
            Self::DuplicateKey { input, key } => {
                write!(f, "{input} input: duplicate key '{key}'")
            }
            Self::MissingColumn { column } => {
                write!(f, "merged records have no column '{column}'")
            }
        }
    }
}

impl std::error::Error for ReconError {}
