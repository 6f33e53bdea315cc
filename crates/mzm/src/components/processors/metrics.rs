//! 📈 The metric processors: turn events into metrics, and keep metric tags from exploding.

use serde_json::{Value, json};

use crate::common::{AttrObject, AttrValue};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire, wire_value};
use crate::convert::{AttrObjectExt, WireMap, pairs_to_model, pairs_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

// ============================================================
//  📊 event to metric
// ============================================================

const METRIC_KINDS: &[&str] = &["absolute", "incremental"];
const METRIC_TYPES: &[&str] = &["counter", "gauge", "distribution", "set", "summary"];

/// 📤 A literal-or-field pair as the API's `{"value": ..}` or `{"field": ..}`.
fn literal_or_field_to_wire(model: &AttrObject, literal: &str, field: &str) -> Option<Value> {
    if model.is_set(literal) {
        Some(json!({"value": model.value(literal).to_json()}))
    } else if model.is_set(field) {
        Some(json!({"field": model.value(field).to_json()}))
    } else {
        None
    }
}

/// 📥 The inverse: the literal goes to `literal`, the field path to `field`, the other one is Null.
fn literal_or_field_to_model(model: &mut AttrObject, wire: &Value, literal: &str, field: &str) {
    let pick = |key: &str| wire.get(key).map(AttrValue::from_json).unwrap_or_default();
    model.insert(literal.to_string(), pick("value"));
    model.insert(field.to_string(), pick("field"));
}

pub struct EventToMetricProcessor;

impl ComponentType for EventToMetricProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "event_to_metric";
    const API_TYPE: &'static str = "event-to-metric";
    const DESCRIPTION: &'static str = "Build a metric out of each event";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "metric_name",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthBetween(1, 128))
                    .describe("The name of the metric"),
            )
            .attr(
                "metric_kind",
                Attribute::optional(AttrType::String)
                    .default("incremental")
                    .validate(Validator::OneOf(METRIC_KINDS.to_vec()))
                    .describe("Whether each value is a total (absolute) or a delta (incremental)"),
            )
            .attr(
                "metric_type",
                Attribute::required(AttrType::String)
                    .validate(Validator::OneOf(METRIC_TYPES.to_vec()))
                    .describe("The type of the metric"),
            )
            .attr(
                "value_number",
                Attribute::optional(AttrType::Number)
                    .validate(Validator::ExactlyOneOf(vec!["value_field"]))
                    .describe("A constant metric value"),
            )
            .attr(
                "value_field",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The event field holding the metric value"),
            )
            .attr(
                "namespace_value",
                Attribute::optional(AttrType::String)
                    .validate(Validator::ConflictsWith(vec!["namespace_field"]))
                    .describe("A constant namespace for the metric"),
            )
            .attr(
                "namespace_field",
                Attribute::optional(AttrType::String)
                    .validate(Validator::ConflictsWith(vec!["namespace_value"]))
                    .describe("The event field holding the namespace"),
            )
            .attr(
                "tags",
                Attribute::optional(AttrType::Map).describe("Tags for the metric, name to value"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["metric_name", "metric_kind", "metric_type"]);
        if let Some(value) = literal_or_field_to_wire(model, "value_number", "value_field") {
            wire.insert("value".to_string(), value);
        }
        if let Some(namespace) = literal_or_field_to_wire(model, "namespace_value", "namespace_field") {
            wire.insert("namespace".to_string(), namespace);
        }
        if let Some(tags) = model.get_string_map("tags") {
            wire.insert("tags".to_string(), pairs_to_wire(&tags, "name", "value"));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(
            model,
            user_config,
            &Self::user_config_schema(),
            &["metric_name", "metric_kind", "metric_type"],
        );
        literal_or_field_to_model(model, wire_value(user_config, "value"), "value_number", "value_field");
        literal_or_field_to_model(
            model,
            wire_value(user_config, "namespace"),
            "namespace_value",
            "namespace_field",
        );
        model.insert(
            "tags".to_string(),
            pairs_to_model(user_config.get("tags"), "name", "value", "tags", diags),
        );
    }
}

// ============================================================
//  🏷️ tag cardinality limit
// ============================================================

const CARDINALITY_FIELDS: &[&str] = &["tags", "exclude_tags", "action", "value_limit", "mode"];

pub struct TagCardinalityLimitProcessor;

impl ComponentType for TagCardinalityLimitProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "tag_cardinality_limit";
    const API_TYPE: &'static str = "metrics-tag-cardinality-limit";
    const DESCRIPTION: &'static str = "Cap the number of distinct values a metric tag can take";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "tags",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .validate(Validator::ConflictsWith(vec!["exclude_tags"]))
                    .describe("Only limit these tags. All tags are limited when empty"),
            )
            .attr(
                "exclude_tags",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .validate(Validator::ConflictsWith(vec!["tags"]))
                    .describe("Limit every tag except these"),
            )
            .attr(
                "action",
                Attribute::optional(AttrType::String)
                    .default("drop_tag")
                    .validate(Validator::OneOf(vec!["drop_tag", "drop_event"]))
                    .describe("What happens to an event carrying a value over the limit"),
            )
            .attr(
                "value_limit",
                Attribute::optional(AttrType::Int)
                    .default(500i64)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The number of distinct values allowed per tag"),
            )
            .attr(
                "mode",
                Attribute::optional(AttrType::String)
                    .default("exact")
                    .validate(Validator::OneOf(vec!["exact", "probabilistic"]))
                    .describe("Track values exactly, or with a bloom filter using less memory"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, CARDINALITY_FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), CARDINALITY_FIELDS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentDefinition;
    use crate::components::test_support::{apply, obj, plan};

    #[test]
    fn the_one_where_response_time_becomes_a_distribution() {
        let the_plan = plan::<EventToMetricProcessor>(vec![
            ("metric_name", AttrValue::string("response_time")),
            ("metric_type", AttrValue::string("distribution")),
            ("value_field", AttrValue::string(".duration_ms")),
            ("namespace_value", AttrValue::string("web")),
            ("tags", AttrValue::Object(obj([("service", AttrValue::string("checkout"))]))),
        ]);
        let (the_wire, the_state) = apply::<EventToMetricProcessor>(&the_plan);
        assert_eq!(
            the_wire,
            json!({
                "metric_name": "response_time",
                "metric_kind": "incremental",
                "metric_type": "distribution",
                "value": {"field": ".duration_ms"},
                "namespace": {"value": "web"},
                "tags": [{"name": "service", "value": "checkout"}],
            })
        );
        for name in ["metric_name", "metric_kind", "metric_type", "value_field", "namespace_value", "tags"] {
            assert_eq!(the_state.value(name), the_plan.value(name), "💀 {name} drifted");
        }
        assert_eq!(the_state.value("value_number"), &AttrValue::Null);
    }

    #[test]
    fn the_one_where_the_value_is_both_constant_and_a_field() {
        let the_plan = plan::<EventToMetricProcessor>(vec![
            ("metric_name", AttrValue::string("hits")),
            ("metric_type", AttrValue::string("counter")),
            ("value_number", AttrValue::int(1)),
            ("value_field", AttrValue::string(".count")),
        ]);
        let the_pile = ComponentDefinition::of::<EventToMetricProcessor>().schema().validate(&the_plan);
        assert!(the_pile.has_error());

        let the_plan = plan::<EventToMetricProcessor>(vec![
            ("metric_name", AttrValue::string("hits")),
            ("metric_type", AttrValue::string("counter")),
        ]);
        let the_pile = ComponentDefinition::of::<EventToMetricProcessor>().schema().validate(&the_plan);
        assert!(the_pile.has_error(), "💀 neither value nor field should not pass either");
    }

    #[test]
    fn the_one_where_a_constant_value_comes_back_as_a_number() {
        let the_plan = plan::<EventToMetricProcessor>(vec![
            ("metric_name", AttrValue::string("hits")),
            ("metric_type", AttrValue::string("counter")),
            ("value_number", AttrValue::int(1)),
        ]);
        let (the_wire, the_state) = apply::<EventToMetricProcessor>(&the_plan);
        assert_eq!(the_wire["value"], json!({"value": 1}));
        assert_eq!(the_state.value("value_number"), &AttrValue::int(1));
        assert_eq!(the_state.value("value_field"), &AttrValue::Null);
        assert_eq!(the_state.value("tags"), &AttrValue::Null);
    }

    #[test]
    fn the_one_where_tags_and_exclude_tags_cannot_share_a_room() {
        let the_plan = plan::<TagCardinalityLimitProcessor>(vec![
            ("tags", AttrValue::strings(["host"])),
            ("exclude_tags", AttrValue::strings(["env"])),
        ]);
        let the_pile = ComponentDefinition::of::<TagCardinalityLimitProcessor>().schema().validate(&the_plan);
        assert!(the_pile.has_error());

        let the_plan = plan::<TagCardinalityLimitProcessor>(vec![("exclude_tags", AttrValue::strings(["env"]))]);
        let (the_wire, the_state) = apply::<TagCardinalityLimitProcessor>(&the_plan);
        assert_eq!(
            the_wire,
            json!({"exclude_tags": ["env"], "action": "drop_tag", "value_limit": 500, "mode": "exact"})
        );
        assert_eq!(the_state.get_i64("value_limit"), Some(500));
    }
}
