//! 🦩 Splunk HEC source: speak the HTTP Event Collector protocol, receive what Splunk forwarders send.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema};

pub struct SplunkHecSource;

impl ComponentType for SplunkHecSource {
    const KIND: ComponentKind = ComponentKind::Source;
    const TYPE_NAME: &'static str = "splunk_hec";
    const API_TYPE: &'static str = "splunk-hec";
    const DESCRIPTION: &'static str = "Receive data in the Splunk HTTP Event Collector format";

    fn user_config_schema() -> Schema {
        Schema::new().attr(
            "capture_metadata",
            Attribute::optional(AttrType::Bool)
                .default(false)
                .describe("Enable the inclusion of all http headers and query string parameters"),
        )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["capture_metadata"]);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), &["capture_metadata"]);
    }
}
