//! 🐶 Datadog logs destination.

use crate::common::AttrObject;
use crate::components::shared::GZIP_OR_NONE;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const SITES: &[&str] = &["us1", "us3", "us5", "eu1"];
const FIELDS: &[&str] = &["site", "api_key", "compression"];

pub struct DatadogLogsDestination;

impl ComponentType for DatadogLogsDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "datadog_logs";
    const API_TYPE: &'static str = "datadog-logs";
    const DESCRIPTION: &'static str = "Send log events to Datadog";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "site",
                Attribute::required(AttrType::String)
                    .validate(Validator::OneOf(SITES.to_vec()))
                    .describe("The Datadog site the account lives in"),
            )
            .attr(
                "api_key",
                Attribute::required(AttrType::String)
                    .sensitive()
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The Datadog API key"),
            )
            .attr(
                "compression",
                Attribute::optional(AttrType::String)
                    .default("none")
                    .validate(Validator::OneOf(GZIP_OR_NONE.to_vec()))
                    .describe("The compression strategy used on the encoded data prior to sending"),
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
    use crate::components::ComponentDefinition;
    use crate::components::test_support::{apply, plan};
    use serde_json::json;

    #[test]
    fn the_one_where_eu1_is_a_place() {
        let the_plan = plan::<DatadogLogsDestination>(vec![
            ("site", AttrValue::string("eu1")),
            ("api_key", AttrValue::string("dd-key")),
        ]);
        let (the_wire, _) = apply::<DatadogLogsDestination>(&the_plan);
        assert_eq!(
            the_wire,
            json!({"site": "eu1", "api_key": "dd-key", "compression": "none", "ack_enabled": true})
        );
    }

    #[test]
    fn the_one_where_mars1_is_not() {
        let the_plan = plan::<DatadogLogsDestination>(vec![
            ("site", AttrValue::string("mars1")),
            ("api_key", AttrValue::string("dd-key")),
        ]);
        let the_pile = ComponentDefinition::of::<DatadogLogsDestination>().schema().validate(&the_plan);
        assert!(the_pile.has_error());
    }
}
