//! 🧱 Kafka source: consume topics from a cluster you already run.

use crate::common::{AttrObject, AttrValue};
use crate::components::shared::{
    brokers_attribute, brokers_schema, object_list_to_model, object_list_to_wire, sasl_schema,
};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::DECODINGS;

const FIELDS: &[&str] = &["topics", "group_id", "tls_enabled", "decoding"];

pub struct KafkaSource;

impl ComponentType for KafkaSource {
    const KIND: ComponentKind = ComponentKind::Source;
    const TYPE_NAME: &'static str = "kafka";
    const API_TYPE: &'static str = "kafka";
    const DESCRIPTION: &'static str = "Consume events from one or more kafka topics";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr("brokers", brokers_attribute())
            .attr(
                "topics",
                Attribute::required(AttrType::list_of(AttrType::String))
                    .validate(Validator::ListSizeBetween(1, 100))
                    .describe("The kafka topics to consume from"),
            )
            .attr(
                "group_id",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The consumer group id"),
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
            .attr(
                "decoding",
                Attribute::optional(AttrType::String)
                    .default("json")
                    .validate(Validator::OneOf(DECODINGS.to_vec()))
                    .describe("The decoding method for converting messages into data events"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{apply, obj, plan};
    use serde_json::json;

    #[test]
    fn the_one_where_brokers_and_sasl_survive_the_trip() {
        let the_plan = plan::<KafkaSource>(vec![
            (
                "brokers",
                AttrValue::List(vec![AttrValue::object([
                    ("host", AttrValue::string("kafka-1.internal")),
                    ("port", AttrValue::int(9092)),
                ])]),
            ),
            ("topics", AttrValue::strings(["logs"])),
            ("group_id", AttrValue::string("mezmo")),
            (
                "sasl",
                AttrValue::Object(obj([
                    ("mechanism", AttrValue::string("scram-sha-512")),
                    ("username", AttrValue::string("consumer")),
                    ("password", AttrValue::string("s3cr3t")),
                ])),
            ),
        ]);
        let (the_wire, the_state) = apply::<KafkaSource>(&the_plan);
        assert_eq!(the_wire["brokers"], json!([{"host": "kafka-1.internal", "port": 9092}]));
        assert_eq!(the_wire["sasl"]["mechanism"], "scram-sha-512");
        assert_eq!(the_state.value("brokers"), the_plan.value("brokers"));
        assert_eq!(the_state.value("sasl"), the_plan.value("sasl"));
        assert_eq!(the_state.get_bool("tls_enabled"), Some(true));
    }
}
