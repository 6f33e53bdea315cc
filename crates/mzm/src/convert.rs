//! 🔄 Convert: the shared plumbing every `from_model` / `to_model` pair stands on.
//!
//! 🎬 *[forty converters walk into a bar. they all order "copy field A to key B".]*
//! *[the bartender sighs and writes this module.]*
//!
//! 🧠 Knowledge graph:
//! - [`AttrObjectExt`]: typed getters on a model object. Null and Unknown both read as "not set".
//! - [`copy_to_wire`] / [`copy_to_model`]: move one attribute across the border, same shape both sides.
//! - [`nested_to_wire`] / [`nested_to_model`]: same thing for a flat nested object, driven by its schema.
//! - [`pairs_to_wire`] / [`pairs_to_model`]: model maps ↔ the API's `[{name, value}]` arrays.
//! - [`EnumTable`]: model key ↔ wire code tables, where an unknown code is a bug, not a shrug.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::common::{AttrObject, AttrValue};
use crate::diagnostics::{Diagnostics, report_bug};
use crate::schema::{AttrType, Schema};

/// 📦 A `user_config` (or any other wire object) on its way to or from the API.
pub type WireMap = Map<String, Value>;

static NULL: AttrValue = AttrValue::Null;

/// 🎯 Typed reads on a model object.
///
/// Every getter returns `None` for null, unknown or missing. A *set* value of the wrong
/// type also returns `None`; the schema validated types before we got here.
pub trait AttrObjectExt {
    fn value(&self, name: &str) -> &AttrValue;
    fn get_string(&self, name: &str) -> Option<&str>;
    fn get_bool(&self, name: &str) -> Option<bool>;
    fn get_number(&self, name: &str) -> Option<&Number>;
    fn get_i64(&self, name: &str) -> Option<i64>;
    fn get_string_list(&self, name: &str) -> Option<Vec<String>>;
    fn get_object(&self, name: &str) -> Option<&AttrObject>;
    fn get_object_list(&self, name: &str) -> Option<Vec<&AttrObject>>;
    fn get_string_map(&self, name: &str) -> Option<BTreeMap<String, String>>;
    fn is_set(&self, name: &str) -> bool;
}

impl AttrObjectExt for AttrObject {
    fn value(&self, name: &str) -> &AttrValue {
        self.get(name).unwrap_or(&NULL)
    }

    fn get_string(&self, name: &str) -> Option<&str> {
        self.value(name).as_str()
    }

    fn get_bool(&self, name: &str) -> Option<bool> {
        self.value(name).as_bool()
    }

    fn get_number(&self, name: &str) -> Option<&Number> {
        self.value(name).as_number()
    }

    fn get_i64(&self, name: &str) -> Option<i64> {
        self.value(name).as_i64()
    }

    fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        self.value(name).as_list().map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    fn get_object(&self, name: &str) -> Option<&AttrObject> {
        self.value(name).as_object()
    }

    fn get_object_list(&self, name: &str) -> Option<Vec<&AttrObject>> {
        self.value(name)
            .as_list()
            .map(|items| items.iter().filter_map(AttrValue::as_object).collect())
    }

    fn get_string_map(&self, name: &str) -> Option<BTreeMap<String, String>> {
        self.value(name).as_object().map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
    }

    fn is_set(&self, name: &str) -> bool {
        self.value(name).is_set()
    }
}

/// 📤 Copy a model attribute to the wire under `key`, but only if it is set.
/// Null stays off the wire entirely; the API treats a missing key as "use your default".
pub fn copy_to_wire(wire: &mut WireMap, key: &str, model: &AttrObject, name: &str) {
    let value = model.value(name);
    if value.is_set() {
        wire.insert(key.to_string(), value.to_json());
    }
}

/// 📥 Copy a wire key into the model attribute `name`. Missing keys become `Null`.
pub fn copy_to_model(model: &mut AttrObject, name: &str, wire: &WireMap, key: &str) {
    let value = wire.get(key).map(AttrValue::from_json).unwrap_or_default();
    model.insert(name.to_string(), value);
}

/// 📤 A flat nested object whose wire keys match the model names. Unset fields are skipped.
pub fn nested_to_wire(nested: &AttrObject) -> Value {
    let mut wire = WireMap::new();
    for (name, value) in nested {
        if value.is_set() {
            wire.insert(name.clone(), value.to_json());
        }
    }
    Value::Object(wire)
}

/// 📥 The inverse of [`nested_to_wire`]: every schema attribute gets a value (Null if absent),
/// so the state object always has the full shape the schema promises.
pub fn nested_to_model(schema: &Schema, wire: Option<&Value>) -> AttrValue {
    let Some(Value::Object(wire)) = wire else {
        return AttrValue::Null;
    };
    let nested = schema
        .attributes
        .iter()
        .map(|(name, attribute)| {
            let value = wire.get(*name).map(AttrValue::from_json).unwrap_or_default();
            (name.to_string(), normalize_int(value, &attribute.ty))
        })
        .collect();
    AttrValue::Object(nested)
}

/// 📤 A model map `{k: v}` as the API's `[{key_name: k, value_name: v}]`, sorted by key.
pub fn pairs_to_wire(map: &BTreeMap<String, String>, key_name: &str, value_name: &str) -> Value {
    Value::Array(
        map.iter()
            .map(|(k, v)| {
                let mut pair = WireMap::new();
                pair.insert(key_name.to_string(), Value::String(k.clone()));
                pair.insert(value_name.to_string(), Value::String(v.clone()));
                Value::Object(pair)
            })
            .collect(),
    )
}

/// 📥 `[{key_name: k, value_name: v}]` back into a model map.
///
/// A malformed entry is the server's fault, not the user's. Still, it's reported as a
/// diagnostic rather than a panic: the user can't fix it, but they can at least see it.
pub fn pairs_to_model(
    wire: Option<&Value>,
    key_name: &str,
    value_name: &str,
    path: &str,
    diags: &mut Diagnostics,
) -> AttrValue {
    let Some(wire) = wire else {
        return AttrValue::Null;
    };
    let Some(items) = wire.as_array() else {
        if !wire.is_null() {
            diags.add_attribute_error(path, "Unexpected API response", format!("expected a list of pairs, got {wire}"));
        }
        return AttrValue::Null;
    };
    let mut map = AttrObject::new();
    for (i, item) in items.iter().enumerate() {
        let key = item.get(key_name).and_then(Value::as_str);
        let value = item.get(value_name).and_then(Value::as_str);
        match (key, value) {
            (Some(k), Some(v)) => {
                map.insert(k.to_string(), AttrValue::string(v));
            }
            _ => diags.add_attribute_error(
                format!("{path}[{i}]"),
                "Unexpected API response",
                format!("expected {{\"{key_name}\", \"{value_name}\"}} strings, got {item}"),
            ),
        }
    }
    AttrValue::Object(map)
}

/// 📖 Bidirectional model-key ↔ wire-code lookup.
///
/// The model side is what users type; the wire side is what the API insists on.
/// [`EnumTable::find_key`] panics for an unknown code: there is no silent fallback,
/// because a fallback would quietly rewrite somebody's config.
#[derive(Debug, Clone, Copy)]
pub struct EnumTable {
    name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl EnumTable {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, entries }
    }

    /// Model keys, in declaration order. Handy for `Validator::OneOf`.
    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }

    pub fn wire_code(&self, key: &str) -> &'static str {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, code)| *code)
            .unwrap_or_else(|| report_bug(format!("unknown {} key \"{key}\"", self.name)))
    }

    pub fn find_key(&self, code: &str) -> &'static str {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(key, _)| *key)
            .unwrap_or_else(|| report_bug(format!("unknown {} code \"{code}\"", self.name)))
    }
}

/// 🔢 Integer-typed schema attributes sometimes come back from the API as `5.0`.
/// Normalize those so a refresh doesn't show a phantom diff.
pub fn normalize_int(value: AttrValue, ty: &AttrType) -> AttrValue {
    match (ty, &value) {
        (AttrType::Int, AttrValue::Number(n)) if !n.is_i64() && !n.is_u64() => {
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 => AttrValue::int(f as i64),
                _ => value,
            }
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const THE_SCHEMES: EnumTable = EnumTable::new(
        "log construction scheme",
        &[("explicit", "explicit"), ("message_pass_through", "pass-through")],
    );

    #[test]
    fn the_one_where_labels_become_name_value_pairs_and_come_back() {
        let the_labels: BTreeMap<String, String> = [
            ("service".to_string(), "api".to_string()),
            ("env".to_string(), "prod".to_string()),
        ]
        .into_iter()
        .collect();

        let the_wire = pairs_to_wire(&the_labels, "label_name", "label_value");
        assert_eq!(
            the_wire,
            json!([
                {"label_name": "env", "label_value": "prod"},
                {"label_name": "service", "label_value": "api"}
            ])
        );

        let mut the_pile = Diagnostics::new();
        let the_model = pairs_to_model(Some(&the_wire), "label_name", "label_value", "labels", &mut the_pile);
        assert!(the_pile.is_empty());
        assert_eq!(
            the_model,
            AttrValue::object([("env", AttrValue::string("prod")), ("service", AttrValue::string("api"))])
        );
    }

    #[test]
    fn the_one_where_a_broken_pair_is_reported_not_swallowed() {
        let the_wire = json!([{"label_name": "env"}]);
        let mut the_pile = Diagnostics::new();
        pairs_to_model(Some(&the_wire), "label_name", "label_value", "labels", &mut the_pile);
        assert_eq!(the_pile.iter().next().and_then(|d| d.path.clone()), Some("labels[0]".to_string()));
    }

    #[test]
    fn the_one_where_null_never_makes_it_onto_the_wire() {
        let mut the_model = AttrObject::new();
        the_model.insert("uri".into(), "https://x".into());
        the_model.insert("max_bytes".into(), AttrValue::Null);
        the_model.insert("timeout_secs".into(), AttrValue::Unknown);

        let mut the_wire = WireMap::new();
        copy_to_wire(&mut the_wire, "uri", &the_model, "uri");
        copy_to_wire(&mut the_wire, "max_bytes", &the_model, "max_bytes");
        copy_to_wire(&mut the_wire, "timeout_secs", &the_model, "timeout_secs");
        assert_eq!(Value::Object(the_wire), json!({"uri": "https://x"}));
    }

    #[test]
    fn the_one_where_enum_tables_translate_both_ways() {
        assert_eq!(THE_SCHEMES.wire_code("message_pass_through"), "pass-through");
        assert_eq!(THE_SCHEMES.find_key("pass-through"), "message_pass_through");
        assert_eq!(THE_SCHEMES.keys(), vec!["explicit", "message_pass_through"]);
    }

    #[test]
    #[should_panic(expected = "unknown log construction scheme code")]
    fn the_one_where_an_unknown_code_panics_instead_of_guessing() {
        THE_SCHEMES.find_key("interpretive-dance");
    }

    #[test]
    fn the_one_where_five_point_oh_is_just_five() {
        let the_value = AttrValue::float(5.0);
        assert_eq!(normalize_int(the_value, &AttrType::Int), AttrValue::int(5));
        assert_eq!(normalize_int(AttrValue::float(5.5), &AttrType::Int), AttrValue::float(5.5));
    }
}
