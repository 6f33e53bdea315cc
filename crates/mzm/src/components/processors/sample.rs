//! 🎲 Sample processor: keep one event in `rate`, but never drop the ones that match `always_include`.

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire, wire_value};
use crate::conditional::OperatorFamily;
use crate::convert::{AttrObjectExt, WireMap, copy_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

fn always_include_schema() -> Schema {
    Schema::new()
        .attr(
            "field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field to check"),
        )
        .attr(
            "operator",
            Attribute::required(AttrType::String)
                .validate(Validator::OneOf(OperatorFamily::NonChange.operators()))
                .describe("The comparison operator"),
        )
        .attr(
            "value_string",
            Attribute::optional(AttrType::String)
                .validate(Validator::ConflictsWith(vec!["value_number"]))
                .describe("The operand, when it is a string"),
        )
        .attr(
            "value_number",
            Attribute::optional(AttrType::Number)
                .validate(Validator::ConflictsWith(vec!["value_string"]))
                .describe("The operand, when it is a number"),
        )
        .attr(
            "case_sensitive",
            Attribute::optional(AttrType::Bool)
                .default(true)
                .describe("Compare strings case sensitively"),
        )
}

pub struct SampleProcessor;

impl ComponentType for SampleProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "sample";
    const API_TYPE: &'static str = "sample";
    const DESCRIPTION: &'static str = "Keep a fraction of events, plus every event matching a condition";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "rate",
                Attribute::optional(AttrType::Int)
                    .default(10i64)
                    .validate(Validator::NumberAtLeast(2.0))
                    .describe("Keep one event out of this many"),
            )
            .attr(
                "always_include",
                Attribute::optional(AttrType::object(always_include_schema()))
                    .describe("Events matching this check are always kept"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["rate"]);
        if let Some(include) = model.get_object("always_include") {
            let mut wire_include = WireMap::new();
            copy_all_to_wire(&mut wire_include, include, &["field", "operator", "case_sensitive"]);
            if include.is_set("value_number") {
                copy_to_wire(&mut wire_include, "value", include, "value_number");
            } else {
                copy_to_wire(&mut wire_include, "value", include, "value_string");
            }
            wire.insert("always_include".to_string(), Value::Object(wire_include));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), &["rate"]);
        let include = match wire_value(user_config, "always_include") {
            Value::Object(wire_include) => {
                let mut include = AttrObject::new();
                copy_all_to_model(
                    &mut include,
                    wire_include,
                    &always_include_schema(),
                    &["field", "operator", "case_sensitive"],
                );
                let (value_string, value_number) = match wire_value(wire_include, "value") {
                    Value::String(s) => (AttrValue::String(s.clone()), AttrValue::Null),
                    Value::Number(n) => (AttrValue::Null, AttrValue::Number(n.clone())),
                    Value::Null => (AttrValue::Null, AttrValue::Null),
                    other => {
                        diags.add_attribute_error(
                            "always_include.value",
                            "Unexpected API response",
                            format!("expected a string or a number, got {other}"),
                        );
                        (AttrValue::Null, AttrValue::Null)
                    }
                };
                include.insert("value_string".to_string(), value_string);
                include.insert("value_number".to_string(), value_number);
                AttrValue::Object(include)
            }
            _ => AttrValue::Null,
        };
        model.insert("always_include".to_string(), include);
    }
}
