//! 📦 Common data structures: the plan/state value tree.
//!
//! 🎬 COLD OPEN. INT. TERRAFORM CORE. PLAN TIME.
//! A computed attribute stares into the void. The void says "(known after apply)".
//! The attribute has no value yet. It is not null. It is *unknown*. There is a difference,
//! and this module exists so the difference survives the trip through Rust.
//!
//! [`AttrValue`] is the humble, load-bearing enum every schema, validator and converter
//! passes around. Plans, states and nested blocks are all just [`AttrObject`]s.
//!
//! ⚠️ Numbers are kept as `serde_json::Number` on purpose: `5` stays `5` and `0.25` stays
//! `0.25`, so a wire → model → wire trip does not quietly turn integers into floats.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// 📦 An object-shaped attribute: a plan, a state, or any nested block inside them.
pub type AttrObject = BTreeMap<String, AttrValue>;

/// 🎯 One attribute value, in all of its plan-time glory.
///
/// `Unknown` only exists at plan time for computed attributes. It never reaches the
/// wire (serializes as `null`) and validators skip it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Null,
    Unknown,
    String(String),
    Number(Number),
    Bool(bool),
    List(Vec<AttrValue>),
    Object(AttrObject),
}

impl AttrValue {
    pub fn string(value: impl Into<String>) -> Self {
        AttrValue::String(value.into())
    }

    pub fn int(value: i64) -> Self {
        AttrValue::Number(Number::from(value))
    }

    /// 🔢 Floats that JSON can't hold (NaN, infinities) become `Null`. JSON has boundaries. We respect them.
    pub fn float(value: f64) -> Self {
        Number::from_f64(value)
            .map(AttrValue::Number)
            .unwrap_or(AttrValue::Null)
    }

    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttrValue::List(values.into_iter().map(AttrValue::string).collect())
    }

    /// 🏗️ Build an object value from `(name, value)` pairs. Mostly for tests and defaults.
    pub fn object<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, AttrValue)>,
    {
        AttrValue::Object(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AttrValue::Unknown)
    }

    /// ✅ Set means "the user (or the server) actually said something". Null and Unknown are silence.
    pub fn is_set(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            AttrValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&AttrObject> {
        match self {
            AttrValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut AttrObject> {
        match self {
            AttrValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// 🏷️ A human name for the variant, for diagnostics that want to say "expected X, got Y".
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Unknown => "unknown",
            AttrValue::String(_) => "string",
            AttrValue::Number(_) => "number",
            AttrValue::Bool(_) => "bool",
            AttrValue::List(_) => "list",
            AttrValue::Object(_) => "object",
        }
    }

    /// 🔄 Plain JSON in, attribute tree out. `null` becomes `Null`; there is no JSON spelling of Unknown.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(*b),
            Value::Number(n) => AttrValue::Number(n.clone()),
            Value::String(s) => AttrValue::String(s.clone()),
            Value::Array(items) => AttrValue::List(items.iter().map(AttrValue::from_json).collect()),
            Value::Object(map) => AttrValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// 🔄 Attribute tree out to plain JSON. Unknown flattens to `null`, because the wire has never heard of it.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Null | AttrValue::Unknown => Value::Null,
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Number(n) => Value::Number(n.clone()),
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::List(items) => Value::Array(items.iter().map(AttrValue::to_json).collect()),
            AttrValue::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::string(value)
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::int(value)
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        AttrValue::from_json(&value)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| AttrValue::from_json(&v))
    }
}
