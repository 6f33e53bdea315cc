//! 🪣 S3 destination: batch events into objects in a bucket.

use crate::common::AttrObject;
use crate::components::shared::{GZIP_OR_NONE, JSON_OR_TEXT, aws_credentials_schema};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const FIELDS: &[&str] = &["region", "bucket", "prefix", "encoding", "compression", "batch_timeout_secs"];

pub struct S3Destination;

impl ComponentType for S3Destination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "s3";
    const API_TYPE: &'static str = "s3";
    const DESCRIPTION: &'static str = "Write batches of events as objects in an S3 bucket";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "auth",
                Attribute::required(AttrType::object(aws_credentials_schema()))
                    .describe("AWS credentials with write access to the bucket"),
            )
            .attr(
                "region",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The AWS region of the bucket"),
            )
            .attr(
                "bucket",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthBetween(3, 63))
                    .describe("The bucket name"),
            )
            .attr(
                "prefix",
                Attribute::optional(AttrType::String)
                    .describe("A prefix to apply to all object keys"),
            )
            .attr(
                "encoding",
                Attribute::optional(AttrType::String)
                    .default("text")
                    .validate(Validator::OneOf(JSON_OR_TEXT.to_vec()))
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
                "batch_timeout_secs",
                Attribute::optional(AttrType::Int)
                    .default(300i64)
                    .validate(Validator::NumberBetween(1.0, 1800.0))
                    .describe("The maximum age of a batch before it is flushed"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        if let Some(auth) = model.get_object("auth") {
            wire.insert("auth".to_string(), nested_to_wire(auth));
        }
        copy_all_to_wire(&mut wire, model, FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        model.insert(
            "auth".to_string(),
            nested_to_model(&aws_credentials_schema(), user_config.get("auth")),
        );
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
    }
}
