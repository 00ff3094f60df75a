//! Class-name tables shipped alongside a model.
//!
//! Position `i` names model output `i`. Tables load from JSON either as a
//! plain array or as an object keyed by decimal index (`{"0": "..."}`), which
//! is how exported mobile models usually ship them. Keys must be written the
//! way the index prints: `"01"`, `"+1"` and `" 1"` are all rejected, so no
//! two keys can name the same class.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// Default classes for the rice NPK deficiency model.
pub const RICE_NPK_CLASSES: &[&str] = &[
    "Nitrogen_Deficiency",
    "Phosphorus_Deficiency",
    "Potassium_Deficiency",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelTable {
    names: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabels {
    List(Vec<String>),
    Keyed(BTreeMap<String, String>),
}

impl LabelTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn rice_npk() -> Self {
        Self::new(RICE_NPK_CLASSES.iter().map(|s| s.to_string()).collect())
    }

    /// Parse a JSON array or an index-keyed JSON object.
    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        let names = match serde_json::from_str::<RawLabels>(json)? {
            RawLabels::List(names) => names,
            RawLabels::Keyed(map) => dense_from_keyed(map)?,
        };
        if names.is_empty() {
            return Err(LabelError::Empty);
        }
        Ok(Self { names })
    }

    /// Read a label table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, LabelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(index, name)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::rice_npk()
    }
}

fn dense_from_keyed(map: BTreeMap<String, String>) -> Result<Vec<String>, LabelError> {
    let mut indexed = BTreeMap::new();
    for (key, name) in map {
        let index = match key.parse::<usize>() {
            Ok(index) if index.to_string() == key => index,
            _ => return Err(LabelError::InvalidKey(key)),
        };
        if indexed.insert(index, name).is_some() {
            return Err(LabelError::DuplicateIndex(index));
        }
    }

    // Keys must cover 0..n with no gaps.
    let mut names = Vec::with_capacity(indexed.len());
    for (expected, (index, name)) in indexed.into_iter().enumerate() {
        if index != expected {
            return Err(LabelError::MissingIndex(expected));
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array() {
        let labels = LabelTable::from_json(r#"["healthy", "nitrogen"]"#).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get(0), Some("healthy"));
        assert_eq!(labels.get(1), Some("nitrogen"));
        assert_eq!(labels.get(2), None);
    }

    #[test]
    fn parses_keyed_object_in_index_order() {
        // Lexicographic key order would put "10" before "2".
        let json = r#"{
            "0": "c0", "1": "c1", "2": "c2", "3": "c3", "4": "c4", "5": "c5",
            "6": "c6", "7": "c7", "8": "c8", "9": "c9", "10": "c10"
        }"#;
        let labels = LabelTable::from_json(json).unwrap();
        assert_eq!(labels.len(), 11);
        assert_eq!(labels.get(2), Some("c2"));
        assert_eq!(labels.get(10), Some("c10"));
    }

    #[test]
    fn keyed_object_with_gap_is_rejected() {
        let err = LabelTable::from_json(r#"{"0": "a", "2": "c"}"#).unwrap_err();
        assert!(matches!(err, LabelError::MissingIndex(1)));

        let err = LabelTable::from_json(r#"{"1": "b"}"#).unwrap_err();
        assert!(matches!(err, LabelError::MissingIndex(0)));
    }

    #[test]
    fn non_numeric_key_is_rejected() {
        let err = LabelTable::from_json(r#"{"0": "a", "one": "b"}"#).unwrap_err();
        assert!(matches!(err, LabelError::InvalidKey(k) if k == "one"));
    }

    #[test]
    fn aliased_keys_are_rejected() {
        // "01" would otherwise overwrite "1" and drop a label.
        let err = LabelTable::from_json(r#"{"0": "a", "1": "b", "01": "c"}"#).unwrap_err();
        assert!(matches!(err, LabelError::InvalidKey(k) if k == "01"));

        let err = LabelTable::from_json(r#"{"0": "a", "+1": "b"}"#).unwrap_err();
        assert!(matches!(err, LabelError::InvalidKey(k) if k == "+1"));
    }

    #[test]
    fn padded_keys_are_rejected() {
        let err = LabelTable::from_json(r#"{"0": "a", " 1": "b"}"#).unwrap_err();
        assert!(matches!(err, LabelError::InvalidKey(k) if k == " 1"));

        let err = LabelTable::from_json(r#"{"0 ": "a"}"#).unwrap_err();
        assert!(matches!(err, LabelError::InvalidKey(k) if k == "0 "));
    }

    #[test]
    fn empty_tables_are_rejected() {
        assert!(matches!(
            LabelTable::from_json("[]").unwrap_err(),
            LabelError::Empty
        ));
        assert!(matches!(
            LabelTable::from_json("{}").unwrap_err(),
            LabelError::Empty
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            LabelTable::from_json("not json").unwrap_err(),
            LabelError::Json(_)
        ));
        assert!(matches!(
            LabelTable::from_json("[1, 2]").unwrap_err(),
            LabelError::Json(_)
        ));
    }

    #[test]
    fn default_is_rice_npk() {
        let labels = LabelTable::default();
        let names: Vec<&str> = labels.iter().map(|(_, n)| n).collect();
        assert_eq!(names, RICE_NPK_CLASSES);
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!(
            "paddyscan-labels-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"["a", "b", "c"]"#).unwrap();
        let labels = LabelTable::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("paddyscan-labels-does-not-exist.json");
        assert!(LabelTable::from_file(&path).is_err());
    }

    #[test]
    fn serialises_as_array() {
        let json = serde_json::to_string(&LabelTable::rice_npk()).unwrap();
        assert_eq!(
            json,
            r#"["Nitrogen_Deficiency","Phosphorus_Deficiency","Potassium_Deficiency"]"#
        );
    }
}
