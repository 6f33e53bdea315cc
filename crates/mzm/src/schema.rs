//! 📐 Schema: what a plan is allowed to look like.
//!
//! Every component type declares its attributes here: the type, whether it is required,
//! optional or computed, its default, and a stack of validators. The schema then does
//! two jobs before any converter runs:
//!
//! 1. [`Schema::apply_defaults`] fills in defaults and marks computed attributes Unknown,
//!    the way a plan looks right before apply.
//! 2. [`Schema::validate`] walks the plan and writes every problem into [`Diagnostics`].
//!
//! Converters downstream get to assume the shapes are right. If they turn out not to be,
//! that's a provider bug, and it panics (see [`crate::diagnostics::report_bug`]).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::common::{AttrObject, AttrValue};
use crate::diagnostics::Diagnostics;

mod validators;

pub use validators::Validator;

/// 🧬 The shape of an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttrType {
    String,
    Number,
    Int,
    Bool,
    List { element: Box<AttrType> },
    /// A map of string values. Stored as an object whose values are all strings.
    Map,
    /// A single nested object.
    Object { schema: Schema },
    /// A list of nested objects sharing one schema.
    ListNested { schema: Schema },
}

impl AttrType {
    pub fn list_of(element: AttrType) -> Self {
        AttrType::List {
            element: Box::new(element),
        }
    }

    pub fn object(schema: Schema) -> Self {
        AttrType::Object { schema }
    }

    pub fn list_nested(schema: Schema) -> Self {
        AttrType::ListNested { schema }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Number => "number",
            AttrType::Int => "whole number",
            AttrType::Bool => "bool",
            AttrType::List { .. } => "list",
            AttrType::Map => "map of strings",
            AttrType::Object { .. } => "object",
            AttrType::ListNested { .. } => "list of objects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

impl Mode {
    fn is_computed(self) -> bool {
        matches!(self, Mode::Computed | Mode::OptionalComputed)
    }
}

/// 🏷️ One attribute declaration. Built with the little builder methods below.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub ty: AttrType,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Attribute {
    fn with_mode(ty: AttrType, mode: Mode) -> Self {
        Self {
            ty,
            mode,
            default: None,
            sensitive: false,
            validators: Vec::new(),
            description: String::new(),
        }
    }

    pub fn required(ty: AttrType) -> Self {
        Self::with_mode(ty, Mode::Required)
    }

    pub fn optional(ty: AttrType) -> Self {
        Self::with_mode(ty, Mode::Optional)
    }

    pub fn computed(ty: AttrType) -> Self {
        Self::with_mode(ty, Mode::Computed)
    }

    pub fn optional_computed(ty: AttrType) -> Self {
        Self::with_mode(ty, Mode::OptionalComputed)
    }

    /// 🎁 A default implies the attribute is optional *and* computed, same as the framework does it.
    pub fn default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        if self.mode == Mode::Optional {
            self.mode = Mode::OptionalComputed;
        }
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// 📐 A set of named attributes. Ordered, so schema output and validation order are stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attr(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    /// 🔗 Glue two schemas together. Attributes from `other` win on a name clash.
    pub fn merge(mut self, other: Schema) -> Self {
        self.attributes.extend(other.attributes);
        if self.description.is_empty() {
            self.description = other.description;
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// 🎁 Plan-time default filling.
    ///
    /// - missing attributes become `Null`
    /// - null attributes with a default get the default
    /// - null computed attributes without a default become `Unknown`
    /// - nested objects and list-nested elements get the same treatment, recursively
    pub fn apply_defaults(&self, obj: &mut AttrObject) {
        for (name, attribute) in &self.attributes {
            let value = obj.entry(name.to_string()).or_insert(AttrValue::Null);
            if value.is_null() {
                if let Some(default) = &attribute.default {
                    *value = default.clone();
                } else if attribute.mode.is_computed() {
                    *value = AttrValue::Unknown;
                }
            }
            match (&attribute.ty, value) {
                (AttrType::Object { schema }, AttrValue::Object(nested)) => {
                    schema.apply_defaults(nested)
                }
                (AttrType::ListNested { schema }, AttrValue::List(items)) => {
                    for item in items.iter_mut() {
                        if let AttrValue::Object(nested) = item {
                            schema.apply_defaults(nested);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// 🔍 Validate a plan (or config) object. Every problem lands in the returned pile.
    pub fn validate(&self, obj: &AttrObject) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.validate_at(obj, "", &mut diags);
        diags
    }

    pub(crate) fn validate_at(&self, obj: &AttrObject, prefix: &str, diags: &mut Diagnostics) {
        for name in obj.keys() {
            if !self.attributes.contains_key(name.as_str()) {
                diags.add_attribute_error(
                    join_path(prefix, name),
                    "Unsupported attribute",
                    format!("An attribute named \"{name}\" is not expected here."),
                );
            }
        }

        for (name, attribute) in &self.attributes {
            let path = join_path(prefix, name);
            let value = obj.get(*name).unwrap_or(&AttrValue::Null);

            // 🧮 group validators look at siblings, so they run even when this one is null
            for validator in &attribute.validators {
                if validator.is_group() {
                    validator.check(name, value, obj, &path, diags);
                }
            }

            if value.is_unknown() {
                continue;
            }
            if value.is_null() {
                if attribute.mode == Mode::Required {
                    diags.add_attribute_error(
                        &path,
                        "Missing required argument",
                        format!("The argument \"{name}\" is required, but no definition was found."),
                    );
                }
                continue;
            }

            if !check_type(&attribute.ty, value, &path, diags) {
                continue;
            }
            for validator in &attribute.validators {
                if !validator.is_group() {
                    validator.check(name, value, obj, &path, diags);
                }
            }
        }
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// 🧬 Type check, recursing into nested schemas. Returns false when the shape is wrong,
/// so validators don't pile a second complaint on top of the first.
fn check_type(ty: &AttrType, value: &AttrValue, path: &str, diags: &mut Diagnostics) -> bool {
    let ok = match (ty, value) {
        (_, AttrValue::Null | AttrValue::Unknown) => true,
        (AttrType::String, AttrValue::String(_)) => true,
        (AttrType::Bool, AttrValue::Bool(_)) => true,
        (AttrType::Number, AttrValue::Number(_)) => true,
        (AttrType::Int, AttrValue::Number(n)) => n.is_i64() || n.is_u64(),
        (AttrType::List { element }, AttrValue::List(items)) => {
            let mut all_ok = true;
            for (i, item) in items.iter().enumerate() {
                all_ok &= check_type(element, item, &format!("{path}[{i}]"), diags);
            }
            return all_ok;
        }
        (AttrType::Map, AttrValue::Object(entries)) => {
            let mut all_ok = true;
            for (key, item) in entries {
                all_ok &= check_type(&AttrType::String, item, &format!("{path}[\"{key}\"]"), diags);
            }
            return all_ok;
        }
        (AttrType::Object { schema }, AttrValue::Object(nested)) => {
            schema.validate_at(nested, path, diags);
            return true;
        }
        (AttrType::ListNested { schema }, AttrValue::List(items)) => {
            let mut all_ok = true;
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                match item {
                    AttrValue::Object(nested) => schema.validate_at(nested, &item_path, diags),
                    other => {
                        all_ok = false;
                        type_mismatch(ty, other, &item_path, diags);
                    }
                }
            }
            return all_ok;
        }
        _ => false,
    };
    if !ok {
        type_mismatch(ty, value, path, diags);
    }
    ok
}

fn type_mismatch(ty: &AttrType, value: &AttrValue, path: &str, diags: &mut Diagnostics) {
    diags.add_attribute_error(
        path,
        "Incorrect attribute value type",
        format!("Expected a {}, got a {}.", ty.describe(), value.type_name()),
    );
}
