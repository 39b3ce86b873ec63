use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lab analyte tracked on a patient record.
///
/// Known analytes are matched on the exact names the clinic stores them
/// under; anything else, aliases like `INR` included, lands in `Other` with
/// its stored name. Keys always write back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabParameter {
    /// МНО
    Inr,
    /// АЧТВ
    Aptt,
    Creatinine,
    DDimer,
    Cholesterol,
    Other(String),
}

impl LabParameter {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inr => "МНО",
            Self::Aptt => "АЧТВ",
            Self::Creatinine => "Креатинин",
            Self::DDimer => "D-димер",
            Self::Cholesterol => "Холестерин",
            Self::Other(name) => name,
        }
    }

    pub fn parse(name: &str) -> Self {
        match name {
            "МНО" => Self::Inr,
            "АЧТВ" => Self::Aptt,
            "Креатинин" => Self::Creatinine,
            "D-димер" => Self::DDimer,
            "Холестерин" => Self::Cholesterol,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LabParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LabParameter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LabParameter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A measured value. Most analytes are numeric; free-text results are kept
/// verbatim, and any other JSON (null, booleans, objects) passes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LabValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(t) => t.trim().replace(',', ".").parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl From<f64> for LabValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Lab results keyed by analyte, stored as a plain name→value JSON object.
pub type LabResults = BTreeMap<LabParameter, LabValue>;
