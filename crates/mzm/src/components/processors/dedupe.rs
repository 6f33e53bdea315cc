//! 👯 Dedupe processor: drop events already seen recently.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const COMPARISON_TYPES: &[&str] = &["Match", "Ignore"];
const FIELDS: &[&str] = &["fields", "number_of_events", "comparison_type"];

pub struct DedupeProcessor;

impl ComponentType for DedupeProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "dedupe";
    const API_TYPE: &'static str = "dedupe";
    const DESCRIPTION: &'static str = "Remove duplicate events";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "fields",
                Attribute::required(AttrType::list_of(AttrType::String))
                    .validate(Validator::ListSizeBetween(1, 100))
                    .describe("The fields compared to decide whether two events are the same"),
            )
            .attr(
                "number_of_events",
                Attribute::optional(AttrType::Int)
                    .default(5000i64)
                    .validate(Validator::NumberBetween(1.0, 5000.0))
                    .describe("How many recent events are remembered for comparison"),
            )
            .attr(
                "comparison_type",
                Attribute::optional(AttrType::String)
                    .default("Match")
                    .validate(Validator::OneOf(COMPARISON_TYPES.to_vec()))
                    .describe("Compare on the listed fields (Match) or on everything except them (Ignore)"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttrValue;
    use crate::components::test_support::{apply, plan};
    use crate::convert::AttrObjectExt;
    use serde_json::json;

    #[test]
    fn the_one_where_ignore_compares_everything_else() {
        let the_plan = plan::<DedupeProcessor>(vec![
            ("fields", AttrValue::strings([".timestamp"])),
            ("comparison_type", AttrValue::string("Ignore")),
        ]);
        let (the_wire, the_state) = apply::<DedupeProcessor>(&the_plan);
        assert_eq!(
            the_wire,
            json!({"fields": [".timestamp"], "number_of_events": 5000, "comparison_type": "Ignore"})
        );
        assert_eq!(the_state.get_i64("number_of_events"), Some(5000));
    }
}
