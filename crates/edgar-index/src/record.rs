//! Per-entity record parsing.
//!
//! Only the three fields the indices need are read: the identifier, the
//! display name and the ticker list. Everything else in the document is
//! ignored.

use edgar_core::Cik;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the JSON field holding an entity's display name.
///
/// The two bulk datasets disagree on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayNameField {
    /// `entityName`, used by company facts documents.
    EntityName,
    /// `name`, used by submission documents.
    Name,
}

impl DisplayNameField {
    /// JSON key of this field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EntityName => "entityName",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for DisplayNameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single record was left out of the indices.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The file could not be read.
    #[error("{path}: read failed: {message}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// The file is not valid JSON, or a field has the wrong type.
    #[error("{path}: invalid JSON: {message}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// A required field is absent or null.
    #[error("{path}: missing field `{field}`")]
    MissingField {
        /// File involved.
        path: PathBuf,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The identifier is not a valid CIK.
    #[error("{path}: invalid CIK: {message}")]
    InvalidCik {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },
}

/// Identifier as it appears upstream: a string in submissions, a number in
/// company facts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCik {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    cik: Option<RawCik>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "entityName")]
    entity_name: Option<String>,
    #[serde(default)]
    tickers: Option<Vec<String>>,
}

/// The indexable part of one entity document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Normalized identifier.
    pub cik: Cik,
    /// Display name.
    pub name: String,
    /// Ticker symbols, case as provided. Empty when the document has none.
    pub tickers: Vec<String>,
}

impl EntityRecord {
    /// Parses a record from raw JSON bytes.
    ///
    /// `path` is only used to label errors.
    ///
    /// # Errors
    /// Returns a [`RecordError`] if the bytes are not JSON, or the identifier
    /// or display name is missing or invalid.
    pub fn from_slice(
        bytes: &[u8],
        field: DisplayNameField,
        path: &Path,
    ) -> Result<Self, RecordError> {
        let raw: RawRecord = serde_json::from_slice(bytes).map_err(|e| RecordError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let cik = match raw.cik {
            Some(RawCik::Text(text)) => Cik::new(text),
            Some(RawCik::Number(number)) => Cik::from_number(number),
            None => {
                return Err(RecordError::MissingField {
                    path: path.to_path_buf(),
                    field: "cik",
                });
            }
        }
        .map_err(|e| RecordError::InvalidCik {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let name = match field {
            DisplayNameField::EntityName => raw.entity_name,
            DisplayNameField::Name => raw.name,
        }
        .ok_or_else(|| RecordError::MissingField {
            path: path.to_path_buf(),
            field: field.as_str(),
        })?;

        Ok(Self {
            cik,
            name,
            tickers: raw.tickers.unwrap_or_default(),
        })
    }

    /// Reads and parses the record stored at `path`.
    ///
    /// # Errors
    /// See [`EntityRecord::from_slice`]; also fails if the file cannot be read.
    pub fn read(path: &Path, field: DisplayNameField) -> Result<Self, RecordError> {
        let bytes = std::fs::read(path).map_err(|e| RecordError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_slice(&bytes, field, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str, field: DisplayNameField) -> Result<EntityRecord, RecordError> {
        EntityRecord::from_slice(json.as_bytes(), field, Path::new("CIK.json"))
    }

    #[test]
    fn test_submission_record() {
        let record = parse(
            r#"{"cik":"1018724","name":"Amazon.com Inc.","tickers":["AMZN","AMZN.B"],"sic":"5961"}"#,
            DisplayNameField::Name,
        )
        .unwrap();

        assert_eq!(record.cik.as_str(), "0001018724");
        assert_eq!(record.name, "Amazon.com Inc.");
        assert_eq!(record.tickers, vec!["AMZN", "AMZN.B"]);
    }

    #[test]
    fn test_facts_record_with_numeric_cik() {
        let record = parse(
            r#"{"cik":320193,"entityName":"Apple Inc.","facts":{}}"#,
            DisplayNameField::EntityName,
        )
        .unwrap();

        assert_eq!(record.cik.as_str(), "0000320193");
        assert_eq!(record.name, "Apple Inc.");
        assert!(record.tickers.is_empty());
    }

    #[test]
    fn test_display_field_selects_key() {
        // A submission document read with the facts field name has no name
        let err = parse(
            r#"{"cik":"320193","name":"Apple Inc.","tickers":[]}"#,
            DisplayNameField::EntityName,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RecordError::MissingField {
                field: "entityName",
                ..
            }
        ));
    }

    #[test]
    fn test_null_tickers_are_empty() {
        let record = parse(
            r#"{"cik":"320193","name":"Apple Inc.","tickers":null}"#,
            DisplayNameField::Name,
        )
        .unwrap();
        assert!(record.tickers.is_empty());
    }

    #[test]
    fn test_failures_are_classified() {
        assert!(matches!(
            parse(r#"{"cik":"3201"#, DisplayNameField::Name),
            Err(RecordError::Json { .. })
        ));
        assert!(matches!(
            parse(r#"{"name":"No Id"}"#, DisplayNameField::Name),
            Err(RecordError::MissingField { field: "cik", .. })
        ));
        assert!(matches!(
            parse(r#"{"cik":"ABC","name":"Bad Id"}"#, DisplayNameField::Name),
            Err(RecordError::InvalidCik { .. })
        ));
        assert!(matches!(
            parse(
                r#"{"cik":"1","name":"Bad","tickers":"AAPL"}"#,
                DisplayNameField::Name
            ),
            Err(RecordError::Json { .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let err = EntityRecord::read(Path::new("/no/such/CIK.json"), DisplayNameField::Name)
            .unwrap_err();
        assert!(matches!(err, RecordError::Io { .. }));
        assert!(err.to_string().contains("/no/such/CIK.json"));
    }
}
