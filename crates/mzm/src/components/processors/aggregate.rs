//! 🧮 Aggregate processor: roll metric events up over a tumbling or sliding window.
//!
//! Its conditional only takes non-change operators.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::conditional::{OperatorFamily, conditional_schema};
use crate::convert::{AttrObjectExt, WireMap};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::{conditional_to_model, conditional_to_wire};

const WINDOW_TYPES: &[&str] = &["tumbling", "sliding"];
const OPERATIONS: &[&str] = &["sum", "average", "min", "max", "distribution", "set_intersection"];
const FIELDS: &[&str] = &["window_type", "interval", "window_min", "operation", "group_by", "event_timestamp"];

pub struct AggregateProcessor;

impl ComponentType for AggregateProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "aggregate";
    const API_TYPE: &'static str = "aggregate-v2";
    const DESCRIPTION: &'static str = "Aggregate metric events over a time window";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "window_type",
                Attribute::optional(AttrType::String)
                    .default("tumbling")
                    .validate(Validator::OneOf(WINDOW_TYPES.to_vec()))
                    .describe("The kind of window events are aggregated over"),
            )
            .attr(
                "interval",
                Attribute::required(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The length of the window, in seconds"),
            )
            .attr(
                "window_min",
                Attribute::optional(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The minimum window length for sliding windows, in seconds"),
            )
            .attr(
                "operation",
                Attribute::optional(AttrType::String)
                    .default("sum")
                    .validate(Validator::OneOf(OPERATIONS.to_vec()))
                    .describe("How metric values in the window are combined"),
            )
            .attr(
                "group_by",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .describe("Fields whose values partition events into separate aggregates"),
            )
            .attr(
                "event_timestamp",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The event field holding the timestamp used for windowing"),
            )
            .attr(
                "conditional",
                Attribute::optional(AttrType::object(conditional_schema(OperatorFamily::NonChange)))
                    .describe("Only aggregate events matching this conditional"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        if model.is_set("window_min") && model.get_string("window_type") != Some("sliding") {
            diags.add_attribute_error(
                "window_min",
                "Invalid Attribute Combination",
                "window_min only applies to sliding windows",
            );
        }
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        if let Some(conditional) = conditional_to_wire(model, "conditional") {
            wire.insert("conditional".to_string(), conditional);
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert(
            "conditional".to_string(),
            conditional_to_model(user_config.get("conditional"), "conditional", diags),
        );
    }
}
