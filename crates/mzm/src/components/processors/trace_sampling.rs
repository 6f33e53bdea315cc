//! 🧵 Trace sampling processor: keep or drop whole traces, not single spans.
//!
//! Head sampling decides once, with a flat `rate`. Tail sampling waits for the trace
//! and then picks a rate per matching conditional. One mode, one set of knobs: `rate`
//! belongs to head, `conditionals` belong to tail.

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire, wire_value};
use crate::conditional::OperatorFamily;
use crate::convert::{AttrObjectExt, WireMap, copy_to_model, copy_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::{conditional_attribute, conditional_to_model, conditional_to_wire};

const SAMPLE_TYPES: &[&str] = &["head", "tail"];
const FIELDS: &[&str] = &["sample_type", "rate", "trace_id_field", "parent_span_id_field"];

fn tail_conditional_schema() -> Schema {
    Schema::new()
        .attr(
            "rate",
            Attribute::required(AttrType::Int)
                .validate(Validator::NumberAtLeast(1.0))
                .describe("Keep one matching trace out of this many"),
        )
        .attr(
            "output_name",
            Attribute::computed(AttrType::String).describe("The name of the output for this rate"),
        )
        .attr(
            "conditional",
            conditional_attribute(OperatorFamily::All, "Traces matching this conditional use this rate"),
        )
}

pub struct TraceSamplingProcessor;

impl ComponentType for TraceSamplingProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "trace_sampling";
    const API_TYPE: &'static str = "trace-sampling";
    const DESCRIPTION: &'static str = "Sample whole traces, either up front or once they are complete";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "sample_type",
                Attribute::optional(AttrType::String)
                    .default("head")
                    .validate(Validator::OneOf(SAMPLE_TYPES.to_vec()))
                    .describe("Head or tail sampling"),
            )
            .attr(
                "rate",
                Attribute::optional(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("Head sampling: keep one trace out of this many"),
            )
            .attr(
                "trace_id_field",
                Attribute::optional(AttrType::String)
                    .default(".trace_id")
                    .describe("The field holding the trace id"),
            )
            .attr(
                "parent_span_id_field",
                Attribute::optional(AttrType::String)
                    .default(".parent_span_id")
                    .describe("The field holding the parent span id"),
            )
            .attr(
                "conditionals",
                Attribute::optional(AttrType::list_nested(tail_conditional_schema()))
                    .describe("Tail sampling: rates for traces matching each conditional, checked in order"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        match model.get_string("sample_type") {
            Some("head") => {
                if model.is_set("conditionals") {
                    diags.add_attribute_error(
                        "conditionals",
                        "Invalid Attribute Combination",
                        "conditionals cannot be used with head sampling",
                    );
                }
                if !model.is_set("rate") && !model.value("rate").is_unknown() {
                    diags.add_attribute_error("rate", "Missing rate", "head sampling needs a rate");
                }
            }
            Some("tail") => {
                if model.is_set("rate") {
                    diags.add_attribute_error(
                        "rate",
                        "Invalid Attribute Combination",
                        "rate cannot be used with tail sampling, give each conditional its own rate",
                    );
                }
                if !model.is_set("conditionals") && !model.value("conditionals").is_unknown() {
                    diags.add_attribute_error(
                        "conditionals",
                        "Missing conditionals",
                        "tail sampling needs at least one conditional",
                    );
                }
            }
            _ => {}
        }

        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        if let Some(conditionals) = model.get_object_list("conditionals") {
            let wire_conditionals = conditionals
                .into_iter()
                .map(|entry| {
                    let mut wire_entry = WireMap::new();
                    copy_to_wire(&mut wire_entry, "rate", entry, "rate");
                    copy_to_wire(&mut wire_entry, "output_name", entry, "output_name");
                    if let Some(conditional) = conditional_to_wire(entry, "conditional") {
                        wire_entry.insert("conditional".to_string(), conditional);
                    }
                    Value::Object(wire_entry)
                })
                .collect();
            wire.insert("conditionals".to_string(), Value::Array(wire_conditionals));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        let schema = Self::user_config_schema();
        copy_all_to_model(model, user_config, &schema, FIELDS);
        let conditionals = match wire_value(user_config, "conditionals") {
            Value::Array(entries) => AttrValue::List(
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(i, entry)| entry.as_object().map(|entry| (i, entry)))
                    .map(|(i, wire_entry)| {
                        let mut entry = AttrObject::new();
                        copy_all_to_model(&mut entry, wire_entry, &tail_conditional_schema(), &["rate"]);
                        copy_to_model(&mut entry, "output_name", wire_entry, "output_name");
                        entry.insert(
                            "conditional".to_string(),
                            conditional_to_model(
                                wire_entry.get("conditional"),
                                &format!("conditionals[{i}].conditional"),
                                diags,
                            ),
                        );
                        AttrValue::Object(entry)
                    })
                    .collect(),
            ),
            _ => AttrValue::Null,
        };
        model.insert("conditionals".to_string(), conditionals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{apply, plan, render};
    use crate::conditional::leaf;

    fn the_tail_conditional() -> AttrValue {
        AttrValue::object([
            ("rate", AttrValue::int(1)),
            (
                "conditional",
                AttrValue::object([("expressions", AttrValue::List(vec![leaf(".status", "equal", "error")]))]),
            ),
        ])
    }

    #[test]
    fn the_one_where_tail_sampling_keeps_every_failed_trace() {
        let the_plan = plan::<TraceSamplingProcessor>(vec![
            ("sample_type", AttrValue::string("tail")),
            ("conditionals", AttrValue::List(vec![the_tail_conditional()])),
        ]);
        let (the_wire, the_state) = apply::<TraceSamplingProcessor>(&the_plan);
        assert_eq!(the_wire["conditionals"][0]["rate"], 1);
        assert_eq!(the_wire["conditionals"][0]["conditional"]["expressions"][0]["value"], "error");
        assert!(the_wire.get("rate").is_none());

        let the_entries = the_state.get_object_list("conditionals").expect("💀 conditionals");
        let the_planned = the_plan.get_object_list("conditionals").expect("💀 planned");
        assert_eq!(the_entries[0].value("conditional"), the_planned[0].value("conditional"));
        assert_eq!(the_entries[0].value("output_name"), &AttrValue::Null, "the echo had no output name");
    }

    #[test]
    fn the_one_where_head_sampling_is_handed_tail_knobs() {
        let the_plan = plan::<TraceSamplingProcessor>(vec![
            ("sample_type", AttrValue::string("head")),
            ("rate", AttrValue::int(10)),
            ("conditionals", AttrValue::List(vec![the_tail_conditional()])),
        ]);
        let the_pile = render::<TraceSamplingProcessor>(&the_plan).expect_err("💀 head + conditionals");
        assert_eq!(the_pile.len(), 1);
    }

    #[test]
    fn the_one_where_tail_sampling_is_handed_a_flat_rate() {
        let the_plan = plan::<TraceSamplingProcessor>(vec![
            ("sample_type", AttrValue::string("tail")),
            ("rate", AttrValue::int(10)),
            ("conditionals", AttrValue::List(vec![the_tail_conditional()])),
        ]);
        assert!(render::<TraceSamplingProcessor>(&the_plan).is_err());
    }
}
