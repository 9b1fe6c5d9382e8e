//! Typed views of the structured vCard properties N, ADR and ORG.
//!
//! On the tree these are [`Value::Structured`]: semicolon-separated fields,
//! each a comma-separated list. These types name the fields.

use crate::rfc::core::{ContentLine, Value};
use crate::rfc::parse::values::decode_structured;

/// Fields of a line's structured value, decoding raw text when needed.
fn fields_of(line: &ContentLine) -> Vec<Vec<String>> {
    match line.value().and_then(Value::as_structured) {
        Some(fields) => fields.to_vec(),
        None => decode_structured(&line.encoded_value()),
    }
}

fn field(fields: &[Vec<String>], index: usize) -> Vec<String> {
    fields
        .get(index)
        .map(|values| values.iter().filter(|v| !v.is_empty()).cloned().collect())
        .unwrap_or_default()
}

/// Trailing empty fields are kept so the field count stays fixed.
fn structured(fields: &[&Vec<String>]) -> Value {
    Value::Structured(
        fields
            .iter()
            .map(|values| {
                if values.is_empty() {
                    vec![String::new()]
                } else {
                    (*values).clone()
                }
            })
            .collect(),
    )
}

/// Structured name (N property, RFC 6350 §6.2.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredName {
    pub family: Vec<String>,
    pub given: Vec<String>,
    /// Middle names.
    pub additional: Vec<String>,
    /// Honorific prefixes such as "Dr.".
    pub prefixes: Vec<String>,
    /// Honorific suffixes such as "Jr.".
    pub suffixes: Vec<String>,
}

impl StructuredName {
    #[must_use]
    pub fn simple(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: vec![family.into()],
            given: vec![given.into()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_fields(fields: &[Vec<String>]) -> Self {
        Self {
            family: field(fields, 0),
            given: field(fields, 1),
            additional: field(fields, 2),
            prefixes: field(fields, 3),
            suffixes: field(fields, 4),
        }
    }

    /// Reads an N line, decoded or raw.
    #[must_use]
    pub fn from_line(line: &ContentLine) -> Self {
        Self::from_fields(&fields_of(line))
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        structured(&[
            &self.family,
            &self.given,
            &self.additional,
            &self.prefixes,
            &self.suffixes,
        ])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.family.is_empty()
            && self.given.is_empty()
            && self.additional.is_empty()
            && self.prefixes.is_empty()
            && self.suffixes.is_empty()
    }

    /// Given names followed by family names, space-separated.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.given
            .iter()
            .chain(&self.family)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Delivery address (ADR property, RFC 6350 §6.3.1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub po_box: Vec<String>,
    /// Apartment or suite.
    pub extended: Vec<String>,
    pub street: Vec<String>,
    /// City.
    pub locality: Vec<String>,
    /// State or province.
    pub region: Vec<String>,
    pub postal_code: Vec<String>,
    pub country: Vec<String>,
}

impl Address {
    #[must_use]
    pub fn from_fields(fields: &[Vec<String>]) -> Self {
        Self {
            po_box: field(fields, 0),
            extended: field(fields, 1),
            street: field(fields, 2),
            locality: field(fields, 3),
            region: field(fields, 4),
            postal_code: field(fields, 5),
            country: field(fields, 6),
        }
    }

    /// Reads an ADR line, decoded or raw.
    #[must_use]
    pub fn from_line(line: &ContentLine) -> Self {
        Self::from_fields(&fields_of(line))
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        structured(&[
            &self.po_box,
            &self.extended,
            &self.street,
            &self.locality,
            &self.region,
            &self.postal_code,
            &self.country,
        ])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.po_box.is_empty()
            && self.extended.is_empty()
            && self.street.is_empty()
            && self.locality.is_empty()
            && self.region.is_empty()
            && self.postal_code.is_empty()
            && self.country.is_empty()
    }

    /// Street through country on one line.
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            &self.street,
            &self.locality,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Organization (ORG property, RFC 6350 §6.6.4): a name followed by units
/// in decreasing scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub units: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_units(name: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// Commas inside a field are part of the text, not list separators.
    #[must_use]
    pub fn from_fields(fields: &[Vec<String>]) -> Self {
        let mut parts = fields.iter().map(|values| values.join(","));
        Self {
            name: parts.next().unwrap_or_default(),
            units: parts.filter(|unit| !unit.is_empty()).collect(),
        }
    }

    /// Reads an ORG line, decoded or raw.
    #[must_use]
    pub fn from_line(line: &ContentLine) -> Self {
        Self::from_fields(&fields_of(line))
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Structured(
            std::iter::once(&self.name)
                .chain(&self.units)
                .map(|part| vec![part.clone()])
                .collect(),
        )
    }
}
