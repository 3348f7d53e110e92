//! Central Index Key.
//!
//! EDGAR names every filer with a numeric CIK. Upstream documents spell it
//! with a variable width (`"320193"`) while file names and the persisted
//! indices always use the 10-digit zero-padded form (`"0000320193"`).
//! [`Cik`] only ever holds the padded form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EdgarError, Result};

/// Width of a normalized CIK.
pub const CIK_WIDTH: usize = 10;

/// A Central Index Key, zero-padded to [`CIK_WIDTH`] digits.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cik(String);

impl Cik {
    /// Normalizes a CIK string by left-padding it with `'0'`.
    ///
    /// Surrounding whitespace is ignored. Empty input, non-digit characters and
    /// inputs longer than [`CIK_WIDTH`] are rejected.
    ///
    /// # Example
    /// ```
    /// use edgar_core::Cik;
    ///
    /// let cik = Cik::new("320193").unwrap();
    /// assert_eq!(cik.as_str(), "0000320193");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(EdgarError::InvalidParameter("Empty CIK".to_string()));
        }
        if raw.len() > CIK_WIDTH {
            return Err(EdgarError::InvalidParameter(format!(
                "CIK longer than {} digits: {}",
                CIK_WIDTH, raw
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EdgarError::InvalidParameter(format!(
                "CIK must be numeric: {}",
                raw
            )));
        }

        Ok(Self(format!("{:0>10}", raw)))
    }

    /// Builds a CIK from its numeric value.
    pub fn from_number(value: u64) -> Result<Self> {
        Self::new(value.to_string())
    }

    /// Returns the padded CIK as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this entity's record in an extracted bulk archive.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("CIK{}.json", self.0)
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cik {
    type Err = EdgarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Cik {
    type Error = EdgarError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<Cik> for String {
    fn from(cik: Cik) -> Self {
        cik.0
    }
}

impl AsRef<str> for Cik {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cik_padding() {
        let cik = Cik::new("320193").unwrap();
        assert_eq!(cik.as_str(), "0000320193");
        assert_eq!(cik.as_str().len(), CIK_WIDTH);
    }

    #[test]
    fn test_cik_padding_is_idempotent() {
        for raw in ["1", "320193", "1018724", "9999999999"] {
            let once = Cik::new(raw).unwrap();
            let twice = Cik::new(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_distinct_inputs_stay_distinct() {
        let a = Cik::new("32019").unwrap();
        let b = Cik::new("320193").unwrap();
        let c = Cik::new("3201930").unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cik_rejects_invalid_input() {
        assert!(Cik::new("").is_err());
        assert!(Cik::new("   ").is_err());
        assert!(Cik::new("12345678901").is_err());
        assert!(Cik::new("AAPL").is_err());
        assert!(Cik::new("-320193").is_err());
    }

    #[test]
    fn test_cik_from_number() {
        assert_eq!(Cik::from_number(1018724).unwrap().as_str(), "0001018724");
        assert!(Cik::from_number(10_000_000_000).is_err());
    }

    #[test]
    fn test_file_name() {
        let cik: Cik = "320193".parse().unwrap();
        assert_eq!(cik.file_name(), "CIK0000320193.json");
    }

    #[test]
    fn test_serde_uses_bare_string() {
        let cik = Cik::new("320193").unwrap();
        let json = serde_json::to_string(&cik).unwrap();
        assert_eq!(json, "\"0000320193\"");

        let back: Cik = serde_json::from_str("\"320193\"").unwrap();
        assert_eq!(back, cik);

        assert!(serde_json::from_str::<Cik>("\"not-a-cik\"").is_err());
    }
}
