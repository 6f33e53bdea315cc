//! 🦩 Splunk HEC logs destination.

use crate::common::AttrObject;
use crate::components::shared::GZIP_OR_NONE;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const FIELDS: &[&str] = &[
    "endpoint",
    "token",
    "source",
    "source_type",
    "index",
    "host_field",
    "compression",
    "tls_verify_certificate",
];

pub struct SplunkHecLogsDestination;

impl ComponentType for SplunkHecLogsDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "splunk_hec_logs";
    const API_TYPE: &'static str = "splunk-hec-logs";
    const DESCRIPTION: &'static str = "Send log events to a Splunk HTTP Event Collector";

    fn user_config_schema() -> Schema {
        let optional_text = |description: &'static str| {
            Attribute::optional(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe(description)
        };
        Schema::new()
            .attr(
                "endpoint",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The base URL of the Splunk instance"),
            )
            .attr(
                "token",
                Attribute::required(AttrType::String)
                    .sensitive()
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The HEC token"),
            )
            .attr("source", optional_text("The source value to set on each event"))
            .attr("source_type", optional_text("The sourcetype value to set on each event"))
            .attr("index", optional_text("The Splunk index to write to"))
            .attr("host_field", optional_text("The event field holding the host name"))
            .attr(
                "compression",
                Attribute::optional(AttrType::String)
                    .default("none")
                    .validate(Validator::OneOf(GZIP_OR_NONE.to_vec()))
                    .describe("The compression strategy used on the encoded data prior to sending"),
            )
            .attr(
                "tls_verify_certificate",
                Attribute::optional(AttrType::Bool)
                    .default(true)
                    .describe("Verify the TLS certificate of the endpoint"),
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
