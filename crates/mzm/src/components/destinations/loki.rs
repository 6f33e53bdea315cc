//! 🪵 Loki destination: ship events to Grafana Loki with a set of stream labels.

use crate::common::AttrObject;
use crate::components::shared::{JSON_OR_TEXT, auth_schema, auth_to_wire};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, pairs_to_model, pairs_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const AUTH_STRATEGIES: &[&str] = &["basic"];
const FIELDS: &[&str] = &["endpoint", "path", "encoding"];

pub struct LokiDestination;

impl ComponentType for LokiDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "loki";
    const API_TYPE: &'static str = "loki";
    const DESCRIPTION: &'static str = "Send log events to Grafana Loki";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "endpoint",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The base URL of the Loki instance"),
            )
            .attr(
                "path",
                Attribute::optional(AttrType::String)
                    .default("/loki/api/v1/push")
                    .describe("The path to the push API"),
            )
            .attr(
                "encoding",
                Attribute::optional(AttrType::String)
                    .default("json")
                    .validate(Validator::OneOf(JSON_OR_TEXT.to_vec()))
                    .describe("The encoding to apply to the data"),
            )
            .attr(
                "auth",
                Attribute::required(AttrType::object(auth_schema(AUTH_STRATEGIES)))
                    .describe("Basic authentication for Loki"),
            )
            .attr(
                "labels",
                Attribute::required(AttrType::Map)
                    .describe("Key/value pairs used as Loki stream labels"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        auth_to_wire(&mut wire, model, "auth", diags);
        if let Some(labels) = model.get_string_map("labels") {
            if labels.is_empty() {
                diags.add_attribute_error("labels", "Missing labels", "Loki needs at least one stream label");
            }
            wire.insert("labels".to_string(), pairs_to_wire(&labels, "label_name", "label_value"));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert(
            "auth".to_string(),
            nested_to_model(&auth_schema(AUTH_STRATEGIES), user_config.get("auth")),
        );
        model.insert(
            "labels".to_string(),
            pairs_to_model(user_config.get("labels"), "label_name", "label_value", "labels", diags),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttrValue;
    use crate::components::test_support::{apply, plan, read, render};
    use serde_json::json;

    fn the_plan(labels: AttrValue) -> AttrObject {
        plan::<LokiDestination>(vec![
            ("endpoint", AttrValue::string("https://loki.example.com")),
            (
                "auth",
                AttrValue::object([
                    ("strategy", AttrValue::string("basic")),
                    ("user", AttrValue::string("grafana")),
                    ("password", AttrValue::string("p4ss")),
                ]),
            ),
            ("labels", labels),
        ])
    }

    #[test]
    fn the_one_where_labels_ride_as_label_name_and_label_value() {
        let the_plan = the_plan(AttrValue::object([
            ("service", AttrValue::string("checkout")),
            ("env", AttrValue::string("prod")),
        ]));
        let (the_wire, the_state) = apply::<LokiDestination>(&the_plan);
        assert_eq!(
            the_wire["labels"],
            json!([
                {"label_name": "env", "label_value": "prod"},
                {"label_name": "service", "label_value": "checkout"}
            ])
        );
        assert_eq!(the_wire["path"], "/loki/api/v1/push");
        assert_eq!(the_state.value("labels"), the_plan.value("labels"));
    }

    #[test]
    fn the_one_where_no_labels_means_no_loki() {
        let the_plan = the_plan(AttrValue::Object(AttrObject::new()));
        assert!(render::<LokiDestination>(&the_plan).is_err());
    }

    #[test]
    fn the_one_where_a_half_label_from_the_api_is_reported() {
        let the_plan = the_plan(AttrValue::Null);
        let the_result = read::<LokiDestination>(
            &the_plan,
            json!({"endpoint": "https://loki.example.com", "labels": [{"label_name": "env"}]}),
        );
        let the_pile = the_result.expect_err("💀 a label without a value is not a label");
        assert_eq!(
            the_pile.iter().next().and_then(|d| d.path.clone()),
            Some("labels[0]".to_string())
        );
    }
}
