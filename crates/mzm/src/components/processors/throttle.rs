//! 🚰 Throttle processor: at most `threshold` events per window, per key.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::conditional::{OperatorFamily, conditional_schema};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::{conditional_to_model, conditional_to_wire};

const FIELDS: &[&str] = &["threshold", "window_ms", "key_field"];

pub struct ThrottleProcessor;

impl ComponentType for ThrottleProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "throttle";
    const API_TYPE: &'static str = "throttle";
    const DESCRIPTION: &'static str = "Rate limit events, optionally per key";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "threshold",
                Attribute::required(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The number of events allowed per window"),
            )
            .attr(
                "window_ms",
                Attribute::required(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The window length, in milliseconds"),
            )
            .attr(
                "key_field",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("A field whose values get a threshold each"),
            )
            .attr(
                "exclude",
                Attribute::optional(AttrType::object(conditional_schema(OperatorFamily::NonChange)))
                    .describe("Events matching this conditional are never throttled"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        if let Some(exclude) = conditional_to_wire(model, "exclude") {
            wire.insert("exclude".to_string(), exclude);
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert(
            "exclude".to_string(),
            conditional_to_model(user_config.get("exclude"), "exclude", diags),
        );
    }
}
