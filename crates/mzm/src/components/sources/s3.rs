//! 🪣 S3 source: objects land in a bucket, SQS says so, the pipeline reads them.

use crate::common::AttrObject;
use crate::components::shared::aws_credentials_schema;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const COMPRESSIONS: &[&str] = &["auto", "gzip", "zstd", "none"];
const FIELDS: &[&str] = &["region", "sqs_queue_url", "compression"];

pub struct S3Source;

impl ComponentType for S3Source {
    const KIND: ComponentKind = ComponentKind::Source;
    const TYPE_NAME: &'static str = "s3";
    const API_TYPE: &'static str = "s3";
    const DESCRIPTION: &'static str = "Read objects from an S3 bucket as they are announced on an SQS queue";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "auth",
                Attribute::required(AttrType::object(aws_credentials_schema()))
                    .describe("AWS credentials with access to the queue and the bucket"),
            )
            .attr(
                "region",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The AWS region of the SQS queue"),
            )
            .attr(
                "sqs_queue_url",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The URL of the SQS queue receiving bucket notifications"),
            )
            .attr(
                "compression",
                Attribute::optional(AttrType::String)
                    .default("auto")
                    .validate(Validator::OneOf(COMPRESSIONS.to_vec()))
                    .describe("The compression of the objects in the bucket"),
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
