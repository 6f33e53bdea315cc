//! 🧹 The field-shuffling processors: drop, compact, flatten, map and unroll.
//!
//! None of them have opinions beyond which fields to touch, so they share a file.

use crate::common::AttrObject;
use crate::components::shared::{object_list_to_model, object_list_to_wire};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

fn fields_attribute(description: &'static str) -> Attribute {
    Attribute::required(AttrType::list_of(AttrType::String))
        .validate(Validator::ListSizeBetween(1, 100))
        .describe(description)
}

// ============================================================
//  🗑️ drop fields
// ============================================================

pub struct DropFieldsProcessor;

impl ComponentType for DropFieldsProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "drop_fields";
    const API_TYPE: &'static str = "drop-fields";
    const DESCRIPTION: &'static str = "Remove fields from events";

    fn user_config_schema() -> Schema {
        Schema::new().attr("fields", fields_attribute("The fields to remove"))
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["fields"]);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), &["fields"]);
    }
}

// ============================================================
//  🗜️ compact fields
// ============================================================

const COMPACT_FIELDS: &[&str] = &["fields", "compact_array", "compact_object"];

pub struct CompactFieldsProcessor;

impl ComponentType for CompactFieldsProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "compact_fields";
    const API_TYPE: &'static str = "compact-fields";
    const DESCRIPTION: &'static str = "Remove empty values from the given fields";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr("fields", fields_attribute("The fields to compact"))
            .attr(
                "compact_array",
                Attribute::optional(AttrType::Bool)
                    .default(true)
                    .describe("Remove empty arrays"),
            )
            .attr(
                "compact_object",
                Attribute::optional(AttrType::Bool)
                    .default(true)
                    .describe("Remove empty objects"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, COMPACT_FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), COMPACT_FIELDS);
    }
}

// ============================================================
//  🥞 flatten fields
// ============================================================

const FLATTEN_FIELDS: &[&str] = &["fields", "delimiter"];

pub struct FlattenFieldsProcessor;

impl ComponentType for FlattenFieldsProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "flatten_fields";
    const API_TYPE: &'static str = "flatten-fields";
    const DESCRIPTION: &'static str = "Flatten nested objects into top-level fields";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "fields",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .describe("The fields to flatten. Flattens the whole event when empty"),
            )
            .attr(
                "delimiter",
                Attribute::optional(AttrType::String)
                    .default("_")
                    .validate(Validator::LengthBetween(1, 1))
                    .describe("The character joining nested key names"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FLATTEN_FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FLATTEN_FIELDS);
    }
}

// ============================================================
//  🗺️ map fields
// ============================================================

fn mapping_schema() -> Schema {
    Schema::new()
        .attr(
            "source_field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field to copy from"),
        )
        .attr(
            "target_field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field to copy to"),
        )
        .attr(
            "drop_source",
            Attribute::optional(AttrType::Bool)
                .default(false)
                .describe("Remove the source field afterwards"),
        )
        .attr(
            "overwrite_target",
            Attribute::optional(AttrType::Bool)
                .default(false)
                .describe("Overwrite the target field if it already exists"),
        )
}

pub struct MapFieldsProcessor;

impl ComponentType for MapFieldsProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "map_fields";
    const API_TYPE: &'static str = "map-fields";
    const DESCRIPTION: &'static str = "Copy or move fields to new names";

    fn user_config_schema() -> Schema {
        Schema::new().attr(
            "mappings",
            Attribute::required(AttrType::list_nested(mapping_schema()))
                .validate(Validator::ListSizeBetween(1, 100))
                .describe("The field mappings, applied in order"),
        )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        if let Some(mappings) = model.get_object_list("mappings") {
            for (i, mapping) in mappings.into_iter().enumerate() {
                if mapping.get_string("source_field").is_some()
                    && mapping.get_string("source_field") == mapping.get_string("target_field")
                {
                    diags.add_attribute_error(
                        format!("mappings[{i}].target_field"),
                        "Invalid mapping",
                        "a field cannot be mapped onto itself",
                    );
                }
            }
        }
        if let Some(mappings) = object_list_to_wire(model, "mappings") {
            wire.insert("mappings".to_string(), mappings);
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        model.insert(
            "mappings".to_string(),
            object_list_to_model(&mapping_schema(), user_config.get("mappings")),
        );
    }
}

// ============================================================
//  🌯 unroll
// ============================================================

const UNROLL_FIELDS: &[&str] = &["field", "values_only"];

pub struct UnrollProcessor;

impl ComponentType for UnrollProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "unroll";
    const API_TYPE: &'static str = "unroll";
    const DESCRIPTION: &'static str = "Turn one event holding an array into one event per array element";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "field",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The array field to unroll"),
            )
            .attr(
                "values_only",
                Attribute::optional(AttrType::Bool)
                    .default(true)
                    .describe("Emit only the element values, without the rest of the event"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, UNROLL_FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), UNROLL_FIELDS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttrValue;
    use crate::components::ComponentDefinition;
    use crate::components::test_support::{apply, plan, render};
    use serde_json::json;

    fn the_mapping(source: &str, target: &str) -> AttrValue {
        AttrValue::object([
            ("source_field", AttrValue::string(source)),
            ("target_field", AttrValue::string(target)),
            ("drop_source", AttrValue::Bool(true)),
        ])
    }

    #[test]
    fn the_one_where_msg_becomes_message() {
        let the_plan = plan::<MapFieldsProcessor>(vec![("mappings", AttrValue::List(vec![the_mapping(".msg", ".message")]))]);
        let (the_wire, the_state) = apply::<MapFieldsProcessor>(&the_plan);
        assert_eq!(
            the_wire["mappings"],
            json!([{"source_field": ".msg", "target_field": ".message", "drop_source": true, "overwrite_target": false}])
        );
        assert_eq!(the_state.value("mappings"), the_plan.value("mappings"));
    }

    #[test]
    fn the_one_where_a_field_is_mapped_onto_itself() {
        let the_plan = plan::<MapFieldsProcessor>(vec![("mappings", AttrValue::List(vec![the_mapping(".a", ".a")]))]);
        assert!(render::<MapFieldsProcessor>(&the_plan).is_err());
    }

    #[test]
    fn the_one_where_the_delimiter_is_one_character_or_nothing() {
        let the_plan = plan::<FlattenFieldsProcessor>(vec![("delimiter", AttrValue::string("::"))]);
        let the_pile = ComponentDefinition::of::<FlattenFieldsProcessor>().schema().validate(&the_plan);
        assert!(the_pile.has_error());

        let the_plan = plan::<FlattenFieldsProcessor>(vec![]);
        let (the_wire, _) = apply::<FlattenFieldsProcessor>(&the_plan);
        assert_eq!(the_wire, json!({"delimiter": "_"}));
    }

    #[test]
    fn the_one_where_compact_and_drop_and_unroll_just_pass_their_fields_along() {
        let (the_wire, _) = apply::<DropFieldsProcessor>(&plan::<DropFieldsProcessor>(vec![(
            "fields",
            AttrValue::strings([".password"]),
        )]));
        assert_eq!(the_wire, json!({"fields": [".password"]}));

        let (the_wire, _) = apply::<CompactFieldsProcessor>(&plan::<CompactFieldsProcessor>(vec![(
            "fields",
            AttrValue::strings([".tags"]),
        )]));
        assert_eq!(the_wire, json!({"fields": [".tags"], "compact_array": true, "compact_object": true}));

        let (the_wire, the_state) =
            apply::<UnrollProcessor>(&plan::<UnrollProcessor>(vec![("field", AttrValue::string(".records"))]));
        assert_eq!(the_wire["values_only"], true);
        assert_eq!(the_state.get_string("field"), Some(".records"));
    }
}
