//! Reading entity facts documents.
//!
//! A company facts document groups its XBRL concepts by taxonomy:
//!
//! ```json
//! {
//!   "cik": 320193,
//!   "entityName": "Apple Inc.",
//!   "facts": {
//!     "dei": { "EntityCommonStockSharesOutstanding": { ... } },
//!     "us-gaap": {
//!       "Revenues": {
//!         "label": "Revenues",
//!         "description": "Amount of revenue recognized ...",
//!         "units": { "USD": [ { "fy": 2023, "fp": "FY", "val": 383285000000 } ] }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Documents are kept as raw JSON; fields are only interpreted when asked for.

use edgar_core::{Cik, EdgarError, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Unit whose observations [`Field::observations`] yields.
const USD: &str = "USD";

/// One reported value of a field.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Fiscal year of the filing that reported the value.
    pub fiscal_year: Option<i32>,
    /// Fiscal period (`FY`, `Q1`, ...).
    pub fiscal_period: Option<String>,
    /// Reported value.
    pub value: f64,
}

/// A field found in an entity's facts.
#[derive(Clone, Debug)]
pub struct Field<'a> {
    form: &'a str,
    name: String,
    data: &'a Value,
}

impl<'a> Field<'a> {
    /// Taxonomy group the field was found in (e.g. `us-gaap`).
    #[must_use]
    pub const fn form(&self) -> &'a str {
        self.form
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable label.
    #[must_use]
    pub fn label(&self) -> Option<&'a str> {
        let data = self.data;
        data.get("label").and_then(Value::as_str)
    }

    /// Long description.
    #[must_use]
    pub fn description(&self) -> Option<&'a str> {
        let data = self.data;
        data.get("description").and_then(Value::as_str)
    }

    /// Units the field reports values in.
    pub fn units(&self) -> impl Iterator<Item = &'a str> + 'a {
        let data = self.data;
        data.get("units")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|units| units.keys().map(String::as_str))
    }

    /// Lazily walks the USD observations as `(fiscal year, fiscal period, value)`.
    ///
    /// Entries without a numeric `val` are passed over.
    pub fn observations(&self) -> impl Iterator<Item = Observation> + 'a {
        let data = self.data;
        data.get("units")
            .and_then(|units| units.get(USD))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|item| {
                Some(Observation {
                    fiscal_year: item
                        .get("fy")
                        .and_then(Value::as_i64)
                        .and_then(|fy| i32::try_from(fy).ok()),
                    fiscal_period: item.get("fp").and_then(Value::as_str).map(str::to_string),
                    value: item.get("val")?.as_f64()?,
                })
            })
    }
}

/// Facts document of one entity.
#[derive(Clone, Debug)]
pub struct EntityFacts {
    raw: Map<String, Value>,
}

impl EntityFacts {
    /// Wraps a parsed document.
    ///
    /// # Errors
    /// Returns [`EdgarError::Parse`] if the document is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(raw) => Ok(Self { raw }),
            other => Err(EdgarError::Parse(format!(
                "Facts document must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Reads a facts document from disk.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if the file cannot be read and
    /// [`EdgarError::Parse`] if it is not a JSON object.
    pub fn read(path: &Path) -> Result<Self> {
        let value: Value = edgar_core::persist::read_json(path)?;
        Self::from_value(value)
    }

    /// Identifier recorded in the document.
    #[must_use]
    pub fn cik(&self) -> Option<Cik> {
        match self.raw.get("cik")? {
            Value::String(s) => Cik::new(s).ok(),
            Value::Number(n) => Cik::from_number(n.as_u64()?).ok(),
            _ => None,
        }
    }

    /// Entity display name.
    #[must_use]
    pub fn entity_name(&self) -> Option<&str> {
        self.raw.get("entityName").and_then(Value::as_str)
    }

    /// Taxonomy groups in document order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.facts().into_iter().flat_map(|facts| facts.keys().map(String::as_str))
    }

    /// Looks `field_name` up in each group in document order and returns
    /// the first match.
    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<Field<'_>> {
        self.facts()?.iter().find_map(|(form, group)| {
            group.get(field_name).map(|data| Field {
                form: form.as_str(),
                name: field_name.to_string(),
                data,
            })
        })
    }

    fn facts(&self) -> Option<&Map<String, Value>> {
        self.raw.get("facts").and_then(Value::as_object)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apple() -> EntityFacts {
        EntityFacts::from_value(json!({
            "cik": 320193,
            "entityName": "Apple Inc.",
            "facts": {
                "dei": {
                    "EntityCommonStockSharesOutstanding": {
                        "label": "Entity Common Stock, Shares Outstanding",
                        "description": "Shares outstanding.",
                        "units": {"shares": [{"fy": 2023, "fp": "Q1", "val": 15_728_702_000u64}]}
                    },
                    "Revenues": {
                        "label": "Revenues (dei)",
                        "units": {"USD": []}
                    }
                },
                "us-gaap": {
                    "Revenues": {
                        "label": "Revenues",
                        "description": "Amount of revenue recognized.",
                        "units": {"USD": [
                            {"fy": 2022, "fp": "FY", "val": 394_328_000_000u64},
                            {"fy": 2023, "fp": "Q1", "val": 117_154_000_000u64},
                            {"fy": null, "fp": "Q2"},
                            {"fy": 2023, "fp": "FY", "val": -1.5}
                        ]}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_metadata() {
        let facts = apple();
        assert_eq!(facts.cik(), Some(Cik::new("320193").unwrap()));
        assert_eq!(facts.entity_name(), Some("Apple Inc."));
        assert_eq!(facts.groups().collect::<Vec<_>>(), vec!["dei", "us-gaap"]);
    }

    #[test]
    fn test_get_returns_first_group_in_document_order() {
        let facts = apple();
        let field = facts.get("Revenues").unwrap();
        assert_eq!(field.form(), "dei");
        assert_eq!(field.label(), Some("Revenues (dei)"));
        assert_eq!(field.description(), None);
        assert_eq!(field.observations().count(), 0);
    }

    #[test]
    fn test_observations() {
        let facts = apple();
        let raw = facts.facts().unwrap()["us-gaap"]["Revenues"].clone();
        let field = Field {
            form: "us-gaap",
            name: "Revenues".to_string(),
            data: &raw,
        };

        let observations: Vec<_> = field.observations().collect();
        assert_eq!(observations.len(), 3);
        assert_eq!(
            observations[0],
            Observation {
                fiscal_year: Some(2022),
                fiscal_period: Some("FY".to_string()),
                value: 394_328_000_000.0,
            }
        );
        assert_eq!(observations[2].value, -1.5);
        assert_eq!(field.units().collect::<Vec<_>>(), vec!["USD"]);
    }

    #[test]
    fn test_non_usd_field_has_no_observations() {
        let facts = apple();
        let field = facts.get("EntityCommonStockSharesOutstanding").unwrap();
        assert_eq!(field.name(), "EntityCommonStockSharesOutstanding");
        assert_eq!(field.units().collect::<Vec<_>>(), vec!["shares"]);
        assert_eq!(field.observations().count(), 0);
    }

    #[test]
    fn test_missing_field_and_missing_facts() {
        assert!(apple().get("NoSuchConcept").is_none());

        let bare = EntityFacts::from_value(json!({"cik": "1"})).unwrap();
        assert!(bare.get("Revenues").is_none());
        assert_eq!(bare.groups().count(), 0);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            EntityFacts::from_value(json!([1, 2, 3])),
            Err(EdgarError::Parse(_))
        ));
    }
}
