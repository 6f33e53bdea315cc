//! 🆕 New Relic destination: events, metrics or logs, one API per destination.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const APIS: &[&str] = &["events", "metrics", "logs"];
const FIELDS: &[&str] = &["account_id", "license_key", "api"];

pub struct NewRelicDestination;

impl ComponentType for NewRelicDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "new_relic";
    const API_TYPE: &'static str = "new-relic";
    const DESCRIPTION: &'static str = "Send events, metrics or logs to New Relic";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "account_id",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The New Relic account id"),
            )
            .attr(
                "license_key",
                Attribute::required(AttrType::String)
                    .sensitive()
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The New Relic license key"),
            )
            .attr(
                "api",
                Attribute::required(AttrType::String)
                    .validate(Validator::OneOf(APIS.to_vec()))
                    .describe("Which New Relic ingest API to send to"),
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
