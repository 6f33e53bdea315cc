//! 🧺 Reduce processor: fold a run of events into one, until time, count, or a condition says stop.

use std::collections::HashSet;

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::components::shared::{object_list_to_model, object_list_to_wire};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire, wire_value};
use crate::conditional::OperatorFamily;
use crate::convert::{AttrObjectExt, WireMap};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::{conditional_attribute, conditional_to_model, conditional_to_wire};

const FIELDS: &[&str] = &["duration_ms", "max_events", "group_by"];
const FLUSH_WHEN: &[&str] = &["starts_when", "ends_when"];
const MERGE_STRATEGIES: &[&str] = &[
    "array",
    "concat",
    "concat_newline",
    "concat_raw",
    "discard",
    "flat_unique",
    "longest_array",
    "max",
    "min",
    "retain",
    "shortest_array",
    "sum",
];

fn date_format_schema() -> Schema {
    Schema::new()
        .attr(
            "field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field holding the date"),
        )
        .attr(
            "format",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The strftime format of the date"),
        )
}

fn merge_strategy_schema() -> Schema {
    Schema::new()
        .attr(
            "field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field to merge"),
        )
        .attr(
            "strategy",
            Attribute::required(AttrType::String)
                .validate(Validator::OneOf(MERGE_STRATEGIES.to_vec()))
                .describe("How values of the field are merged"),
        )
}

fn flush_condition_schema() -> Schema {
    Schema::new()
        .attr(
            "when",
            Attribute::required(AttrType::String)
                .validate(Validator::OneOf(FLUSH_WHEN.to_vec()))
                .describe("Flush when the matching event starts a new run, or when it ends the current one"),
        )
        .attr(
            "conditional",
            conditional_attribute(OperatorFamily::All, "The conditional that triggers a flush"),
        )
}

pub struct ReduceProcessor;

impl ComponentType for ReduceProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "reduce";
    const API_TYPE: &'static str = "reduce";
    const DESCRIPTION: &'static str = "Combine multiple events into a single event";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "duration_ms",
                Attribute::optional(AttrType::Int)
                    .default(30000i64)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("How long to collect events before flushing"),
            )
            .attr(
                "max_events",
                Attribute::optional(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("Flush after this many events, whatever the duration"),
            )
            .attr(
                "group_by",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .describe("Fields whose values partition events into separate reductions"),
            )
            .attr(
                "date_formats",
                Attribute::optional(AttrType::list_nested(date_format_schema()))
                    .describe("Date fields and their formats, so they can be merged as dates"),
            )
            .attr(
                "merge_strategies",
                Attribute::optional(AttrType::list_nested(merge_strategy_schema()))
                    .describe("Per-field merge strategies"),
            )
            .attr(
                "flush_condition",
                Attribute::optional(AttrType::object(flush_condition_schema()))
                    .describe("Flush early when an event matches a conditional"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        for name in ["date_formats", "merge_strategies"] {
            if let Some(items) = object_list_to_wire(model, name) {
                wire.insert(name.to_string(), items);
            }
        }
        if let Some(strategies) = model.get_object_list("merge_strategies") {
            let mut seen = HashSet::new();
            for (i, strategy) in strategies.into_iter().enumerate() {
                if let Some(field) = strategy.get_string("field") {
                    if !seen.insert(field) {
                        diags.add_attribute_error(
                            format!("merge_strategies[{i}].field"),
                            "Duplicate merge strategy",
                            format!("the field \"{field}\" already has a merge strategy"),
                        );
                    }
                }
            }
        }
        if let Some(flush) = model.get_object("flush_condition") {
            let mut wire_flush = WireMap::new();
            copy_all_to_wire(&mut wire_flush, flush, &["when"]);
            if let Some(conditional) = conditional_to_wire(flush, "conditional") {
                wire_flush.insert("conditional".to_string(), conditional);
            }
            wire.insert("flush_condition".to_string(), Value::Object(wire_flush));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert(
            "date_formats".to_string(),
            object_list_to_model(&date_format_schema(), user_config.get("date_formats")),
        );
        model.insert(
            "merge_strategies".to_string(),
            object_list_to_model(&merge_strategy_schema(), user_config.get("merge_strategies")),
        );
        let flush = match wire_value(user_config, "flush_condition") {
            Value::Object(wire_flush) => {
                let mut flush = AttrObject::new();
                copy_all_to_model(&mut flush, wire_flush, &flush_condition_schema(), &["when"]);
                flush.insert(
                    "conditional".to_string(),
                    conditional_to_model(wire_flush.get("conditional"), "flush_condition.conditional", diags),
                );
                AttrValue::Object(flush)
            }
            _ => AttrValue::Null,
        };
        model.insert("flush_condition".to_string(), flush);
    }
}
