//! 🧱 Kafka destination: produce events onto a topic.

use crate::common::AttrObject;
use crate::components::shared::{
    JSON_OR_TEXT, brokers_attribute, brokers_schema, object_list_to_model, object_list_to_wire, sasl_schema,
};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const COMPRESSIONS: &[&str] = &["gzip", "lz4", "snappy", "zstd", "none"];
const FIELDS: &[&str] = &["topic", "event_key_field", "encoding", "compression", "tls_enabled"];

pub struct KafkaDestination;

impl ComponentType for KafkaDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "kafka";
    const API_TYPE: &'static str = "kafka";
    const DESCRIPTION: &'static str = "Publish events to a kafka topic";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr("brokers", brokers_attribute())
            .attr(
                "topic",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The kafka topic to publish to"),
            )
            .attr(
                "event_key_field",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The event field to use as the message key"),
            )
            .attr(
                "encoding",
                Attribute::optional(AttrType::String)
                    .default("json")
                    .validate(Validator::OneOf(JSON_OR_TEXT.to_vec()))
                    .describe("The encoding to apply to the data"),
            )
            .attr(
                "compression",
                Attribute::optional(AttrType::String)
                    .default("none")
                    .validate(Validator::OneOf(COMPRESSIONS.to_vec()))
                    .describe("The compression codec for produced batches"),
            )
            .attr(
                "tls_enabled",
                Attribute::optional(AttrType::Bool)
                    .default(true)
                    .describe("Connect to the brokers over TLS"),
            )
            .attr(
                "sasl",
                Attribute::optional(AttrType::object(sasl_schema()))
                    .describe("SASL authentication for the brokers"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        if let Some(brokers) = object_list_to_wire(model, "brokers") {
            wire.insert("brokers".to_string(), brokers);
        }
        copy_all_to_wire(&mut wire, model, FIELDS);
        if let Some(sasl) = model.get_object("sasl") {
            wire.insert("sasl".to_string(), nested_to_wire(sasl));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        model.insert(
            "brokers".to_string(),
            object_list_to_model(&brokers_schema(), user_config.get("brokers")),
        );
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert("sasl".to_string(), nested_to_model(&sasl_schema(), user_config.get("sasl")));
    }
}
