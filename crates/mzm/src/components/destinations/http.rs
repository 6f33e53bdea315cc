//! 🌐 HTTP destination: POST (or PUT, or, if you must, TRACE) events at any URL.

use crate::common::AttrObject;
use crate::components::shared::{GZIP_OR_NONE, auth_schema, auth_to_wire};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, pairs_to_model, pairs_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const AUTH_STRATEGIES: &[&str] = &["basic", "bearer", "none"];
const ENCODINGS: &[&str] = &["json", "ndjson", "text"];
const METHODS: &[&str] = &["post", "put", "patch", "delete", "get", "head", "options", "trace"];
const FIELDS: &[&str] = &["uri", "encoding", "compression", "method", "max_bytes", "timeout_secs"];

pub struct HttpDestination;

impl ComponentType for HttpDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "http";
    const API_TYPE: &'static str = "http";
    const DESCRIPTION: &'static str = "Send events to an HTTP endpoint";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "uri",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The full URI to make HTTP requests to"),
            )
            .attr(
                "encoding",
                Attribute::optional(AttrType::String)
                    .default("json")
                    .validate(Validator::OneOf(ENCODINGS.to_vec()))
                    .describe("The encoding to apply to the data"),
            )
            .attr(
                "compression",
                Attribute::optional(AttrType::String)
                    .default("none")
                    .validate(Validator::OneOf(GZIP_OR_NONE.to_vec()))
                    .describe("The compression strategy used on the encoded data prior to sending"),
            )
            .attr(
                "method",
                Attribute::optional(AttrType::String)
                    .default("post")
                    .validate(Validator::OneOf(METHODS.to_vec()))
                    .describe("The HTTP method to use for the destination"),
            )
            .attr(
                "auth",
                Attribute::optional(AttrType::object(auth_schema(AUTH_STRATEGIES)))
                    .describe("Configures HTTP authentication"),
            )
            .attr(
                "headers",
                Attribute::optional(AttrType::Map)
                    .describe("A key/value object describing a header name and its value"),
            )
            .attr(
                "max_bytes",
                Attribute::optional(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The maximum number of uncompressed bytes when batching data"),
            )
            .attr(
                "timeout_secs",
                Attribute::optional(AttrType::Int)
                    .validate(Validator::NumberAtLeast(1.0))
                    .describe("The maximum time a batch can wait before being sent"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        auth_to_wire(&mut wire, model, "auth", diags);
        if let Some(headers) = model.get_string_map("headers") {
            wire.insert("headers".to_string(), pairs_to_wire(&headers, "header_name", "header_value"));
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
            "headers".to_string(),
            pairs_to_model(user_config.get("headers"), "header_name", "header_value", "headers", diags),
        );
    }
}
