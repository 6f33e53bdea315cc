//! 🚦 Filter processor: let matching events through, or drop them.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::conditional::OperatorFamily;
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::{conditional_attribute, conditional_to_model, conditional_to_wire};

const ACTIONS: &[&str] = &["allow", "drop"];

pub struct FilterProcessor;

impl ComponentType for FilterProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "filter";
    const API_TYPE: &'static str = "filter";
    const DESCRIPTION: &'static str = "Allow or drop events based on a conditional expression";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "action",
                Attribute::optional(AttrType::String)
                    .default("allow")
                    .validate(Validator::OneOf(ACTIONS.to_vec()))
                    .describe("How to handle events matching the conditional"),
            )
            .attr(
                "conditional",
                conditional_attribute(OperatorFamily::All, "The conditional an event is matched against"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["action"]);
        if let Some(conditional) = conditional_to_wire(model, "conditional") {
            wire.insert("conditional".to_string(), conditional);
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), &["action"]);
        model.insert(
            "conditional".to_string(),
            conditional_to_model(user_config.get("conditional"), "conditional", diags),
        );
    }
}
