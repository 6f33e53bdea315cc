//! 🔎 Elasticsearch destination: bulk-index events, optionally signing requests for AWS.

use crate::common::AttrObject;
use crate::components::shared::{GZIP_OR_NONE, auth_schema, auth_to_wire};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{WireMap, nested_to_model};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const AUTH_STRATEGIES: &[&str] = &["basic", "aws"];
const FIELDS: &[&str] = &["endpoints", "index", "pipeline", "compression"];

pub struct ElasticsearchDestination;

impl ComponentType for ElasticsearchDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "elasticsearch";
    const API_TYPE: &'static str = "elasticsearch";
    const DESCRIPTION: &'static str = "Index events into Elasticsearch or OpenSearch";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "endpoints",
                Attribute::required(AttrType::list_of(AttrType::String))
                    .validate(Validator::ListSizeBetween(1, 10))
                    .describe("The Elasticsearch endpoints to send events to"),
            )
            .attr(
                "auth",
                Attribute::required(AttrType::object(auth_schema(AUTH_STRATEGIES)))
                    .describe("Basic credentials, or AWS credentials for request signing"),
            )
            .attr(
                "index",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The index to write to. Supports template syntax"),
            )
            .attr(
                "pipeline",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The ingest pipeline to run events through"),
            )
            .attr(
                "compression",
                Attribute::optional(AttrType::String)
                    .default("none")
                    .validate(Validator::OneOf(GZIP_OR_NONE.to_vec()))
                    .describe("The compression strategy used on the encoded data prior to sending"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        auth_to_wire(&mut wire, model, "auth", diags);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert(
            "auth".to_string(),
            nested_to_model(&auth_schema(AUTH_STRATEGIES), user_config.get("auth")),
        );
    }
}
