//! Operator property blobs
//!
//! Keymap items and operator instances carry a flat-or-nested map of named
//! values. Keymap lookups compare these blobs either strictly (same key set,
//! same values) or loosely (only keys present on both sides are compared).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Enum identifiers are plain strings on disk; kept apart so rendering can
    /// tell them from free text.
    #[serde(skip_deserializing)]
    Enum(String),
    Group(OperatorProperties),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    fn equals_ex(&self, other: &PropertyValue, strict: bool) -> bool {
        match (self, other) {
            (PropertyValue::Group(a), PropertyValue::Group(b)) => {
                OperatorProperties::equals_ex(Some(a), Some(b), strict)
            }
            // An enum identifier and the same identifier as text are one value.
            (PropertyValue::Enum(a), PropertyValue::String(b))
            | (PropertyValue::String(a), PropertyValue::Enum(b)) => a == b,
            (PropertyValue::Float(a), PropertyValue::Int(b))
            | (PropertyValue::Int(b), PropertyValue::Float(a)) => *a == *b as f64,
            _ => self == other,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::String(s) => write!(f, "\"{s}\""),
            PropertyValue::Enum(s) => write!(f, "'{s}'"),
            PropertyValue::Group(g) => write!(f, "{g}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

/// Named properties of an operator call or keymap item, in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorProperties {
    values: BTreeMap<String, PropertyValue>,
}

impl OperatorProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn set_enum(&mut self, name: &str, ident: &str) {
        self.values
            .insert(name.to_string(), PropertyValue::Enum(ident.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every property of `other` that is not set here.
    pub fn fill_unset_from(&mut self, other: &OperatorProperties) {
        for (name, value) in &other.values {
            self.values
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Compare two optional blobs.
    ///
    /// Strict comparison requires the same key set and equal values. Loose
    /// comparison only looks at keys present on both sides. Two missing blobs
    /// are equal; one missing blob equals an empty one.
    pub fn equals_ex(
        a: Option<&OperatorProperties>,
        b: Option<&OperatorProperties>,
        strict: bool,
    ) -> bool {
        let empty = OperatorProperties::default();
        let a = a.unwrap_or(&empty);
        let b = b.unwrap_or(&empty);

        if strict && a.values.len() != b.values.len() {
            return false;
        }

        for (name, va) in &a.values {
            match b.values.get(name) {
                Some(vb) => {
                    if !va.equals_ex(vb, strict) {
                        return false;
                    }
                }
                None if strict => return false,
                None => {}
            }
        }
        true
    }

    /// Stable JSON form, used as the persisted identifier of a property set.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for OperatorProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_requires_same_keys() {
        let a = OperatorProperties::new().with("extend", true);
        let b = OperatorProperties::new()
            .with("extend", true)
            .with("deselect", false);

        assert!(!OperatorProperties::equals_ex(Some(&a), Some(&b), true));
        assert!(OperatorProperties::equals_ex(Some(&a), Some(&b), false));
        assert!(OperatorProperties::equals_ex(Some(&b), Some(&a), false));
    }

    #[test]
    fn test_loose_still_compares_shared_keys() {
        let a = OperatorProperties::new().with("mode", "EDGE");
        let b = OperatorProperties::new().with("mode", "FACE");
        assert!(!OperatorProperties::equals_ex(Some(&a), Some(&b), false));
    }

    #[test]
    fn test_missing_equals_empty() {
        let empty = OperatorProperties::new();
        assert!(OperatorProperties::equals_ex(None, None, true));
        assert!(OperatorProperties::equals_ex(None, Some(&empty), true));

        let set = OperatorProperties::new().with("x", 1);
        assert!(!OperatorProperties::equals_ex(None, Some(&set), true));
        assert!(OperatorProperties::equals_ex(None, Some(&set), false));
    }

    #[test]
    fn test_nested_group_comparison() {
        let inner_a = OperatorProperties::new().with("value", 2.0);
        let inner_b = OperatorProperties::new()
            .with("value", 2.0)
            .with("orient", "GLOBAL");
        let a = OperatorProperties::new().with("transform", PropertyValue::Group(inner_a));
        let b = OperatorProperties::new().with("transform", PropertyValue::Group(inner_b));

        assert!(!OperatorProperties::equals_ex(Some(&a), Some(&b), true));
        assert!(OperatorProperties::equals_ex(Some(&a), Some(&b), false));
    }

    #[test]
    fn test_enum_matches_string_ident() {
        let mut a = OperatorProperties::new();
        a.set_enum("type", "ADD");
        let b = OperatorProperties::new().with("type", "ADD");
        assert!(OperatorProperties::equals_ex(Some(&a), Some(&b), true));
    }

    #[test]
    fn test_json_is_key_ordered() {
        let props = OperatorProperties::new().with("b", 2).with("a", true);
        assert_eq!(props.to_json(), r#"{"a":true,"b":2}"#);
        let back = OperatorProperties::from_json(&props.to_json()).unwrap();
        assert_eq!(back, props);
    }

    #[test]
    fn test_fill_unset_keeps_existing() {
        let mut props = OperatorProperties::new().with("value", 1);
        let last = OperatorProperties::new().with("value", 5).with("axis", "Z");
        props.fill_unset_from(&last);
        assert_eq!(props.get("value"), Some(&PropertyValue::Int(1)));
        assert_eq!(props.get("axis").and_then(|v| v.as_str()), Some("Z"));
    }
}
