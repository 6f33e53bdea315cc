//! 📜 Script execution processor: run a JavaScript function over every event.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

pub struct ScriptExecutionProcessor;

impl ComponentType for ScriptExecutionProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "script_execution";
    const API_TYPE: &'static str = "js-script";
    const DESCRIPTION: &'static str = "Transform events with a JavaScript function";

    fn user_config_schema() -> Schema {
        Schema::new().attr(
            "script",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The script. It must define a function taking the event and returning the result"),
        )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        if let Some(script) = model.get_string("script") {
            if !script.contains("function") && !script.contains("=>") {
                diags.add_attribute_warning(
                    "script",
                    "Script defines no function",
                    "the pipeline calls a function with each event, and this script doesn't seem to define one",
                );
            }
        }
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["script"]);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), &["script"]);
    }
}
