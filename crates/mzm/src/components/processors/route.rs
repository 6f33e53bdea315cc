//! 🔀 Route processor: send each event down the first route whose conditional matches.
//!
//! Each route is a conditional tree with a `label` glued onto the root, and an
//! `output_name` the API assigns. On the wire the label sits right next to the tree's
//! own `expressions` / `logical_operation`. Events that match nothing leave through the
//! `unmatched` output, also named by the API.

use std::collections::HashSet;

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::components::{ComponentKind, ComponentType, wire_value};
use crate::conditional::{OperatorFamily, conditional_schema, unwind_conditional_from_model, unwind_conditional_to_model};
use crate::convert::{AttrObjectExt, WireMap, copy_to_model, copy_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

fn route_schema() -> Schema {
    conditional_schema(OperatorFamily::All)
        .attr(
            "label",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthBetween(1, 255))
                .describe("A label for the route, unique within the processor"),
        )
        .attr(
            "output_name",
            Attribute::computed(AttrType::String)
                .describe("The name of the output downstream components connect to"),
        )
}

pub struct RouteProcessor;

impl ComponentType for RouteProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "route";
    const API_TYPE: &'static str = "route";
    const DESCRIPTION: &'static str = "Route events to different outputs based on conditional expressions";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "conditionals",
                Attribute::required(AttrType::list_nested(route_schema()))
                    .validate(Validator::ListSizeBetween(1, 100))
                    .describe("The routes, checked in order"),
            )
            .attr(
                "unmatched",
                Attribute::computed(AttrType::String)
                    .describe("The output name for events that match no route"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        let Some(routes) = model.get_object_list("conditionals") else {
            return wire;
        };

        let mut seen = HashSet::new();
        let mut wire_routes = Vec::with_capacity(routes.len());
        for (i, route) in routes.into_iter().enumerate() {
            if let Some(label) = route.get_string("label") {
                if !seen.insert(label) {
                    diags.add_attribute_error(
                        format!("conditionals[{i}].label"),
                        "Duplicate route label",
                        format!("the label \"{label}\" is used by more than one route"),
                    );
                }
            }
            let mut wire_route = unwind_conditional_from_model(route);
            copy_to_wire(&mut wire_route, "label", route, "label");
            copy_to_wire(&mut wire_route, "output_name", route, "output_name");
            wire_routes.push(Value::Object(wire_route));
        }
        wire.insert("conditionals".to_string(), Value::Array(wire_routes));
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics) {
        let routes = match wire_value(user_config, "conditionals") {
            Value::Array(entries) => {
                let mut routes = Vec::with_capacity(entries.len());
                for (i, entry) in entries.iter().enumerate() {
                    let path = format!("conditionals[{i}]");
                    let Some(mut route) = unwind_conditional_to_model(entry, &path, diags) else {
                        continue;
                    };
                    if let Value::Object(entry) = entry {
                        copy_to_model(&mut route, "label", entry, "label");
                        copy_to_model(&mut route, "output_name", entry, "output_name");
                    }
                    routes.push(AttrValue::Object(route));
                }
                AttrValue::List(routes)
            }
            _ => AttrValue::Null,
        };
        model.insert("conditionals".to_string(), routes);
        copy_to_model(model, "unmatched", user_config, "unmatched");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{plan, read, render};
    use crate::conditional::leaf;
    use serde_json::json;

    fn the_route(label: &str, field: &str) -> AttrValue {
        AttrValue::object([
            ("label", AttrValue::string(label)),
            ("expressions", AttrValue::List(vec![leaf(field, "exists", ())])),
        ])
    }

    #[test]
    fn the_one_where_labels_sit_next_to_the_tree() -> anyhow::Result<()> {
        let the_plan = plan::<RouteProcessor>(vec![(
            "conditionals",
            AttrValue::List(vec![the_route("errors", ".error"), the_route("audits", ".audit")]),
        )]);
        let the_wire = render::<RouteProcessor>(&the_plan).map_err(anyhow::Error::new)?;
        assert_eq!(
            the_wire["conditionals"][0],
            json!({
                "label": "errors",
                "logical_operation": "AND",
                "expressions": [{"field": ".error", "str_operator": "exists"}]
            }),
            "output_name is unknown at plan time and stays off the wire"
        );
        Ok(())
    }

    #[test]
    fn the_one_where_the_api_names_the_outputs() -> anyhow::Result<()> {
        let the_plan = plan::<RouteProcessor>(vec![(
            "conditionals",
            AttrValue::List(vec![the_route("errors", ".error")]),
        )]);
        let the_state = read::<RouteProcessor>(
            &the_plan,
            json!({
                "conditionals": [{
                    "label": "errors",
                    "output_name": "route-1-errors",
                    "logical_operation": "AND",
                    "expressions": [{"field": ".error", "str_operator": "exists"}]
                }],
                "unmatched": "route-1-unmatched"
            }),
        )
        .map_err(anyhow::Error::new)?;

        let the_routes = the_state.get_object_list("conditionals").expect("💀 routes");
        assert_eq!(the_routes[0].get_string("output_name"), Some("route-1-errors"));
        assert_eq!(the_routes[0].get_string("label"), Some("errors"));
        assert_eq!(the_state.get_string("unmatched"), Some("route-1-unmatched"));
        Ok(())
    }

    #[test]
    fn the_one_where_two_routes_share_a_name() {
        let the_plan = plan::<RouteProcessor>(vec![(
            "conditionals",
            AttrValue::List(vec![the_route("dupe", ".a"), the_route("dupe", ".b")]),
        )]);
        let the_pile = render::<RouteProcessor>(&the_plan).expect_err("💀 duplicate labels");
        assert_eq!(
            the_pile.iter().next().and_then(|d| d.path.clone()),
            Some("conditionals[1].label".to_string())
        );
    }
}
