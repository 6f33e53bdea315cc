//! 🎪 Demo source: fake logs on tap, for when you want to see the pipeline move.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const FORMATS: &[&str] = &[
    "env_sensor",
    "financial",
    "nginx",
    "json",
    "apache_common",
    "apache_error",
    "bsd_syslog",
    "syslog",
    "http_metrics",
    "generic_metrics",
];

pub struct DemoSource;

impl ComponentType for DemoSource {
    const KIND: ComponentKind = ComponentKind::Source;
    const TYPE_NAME: &'static str = "demo";
    const API_TYPE: &'static str = "demo-logs";
    const DESCRIPTION: &'static str = "Generate fake log events in one of several well-known formats";

    fn user_config_schema() -> Schema {
        Schema::new().attr(
            "format",
            Attribute::required(AttrType::String)
                .validate(Validator::OneOf(FORMATS.to_vec()))
                .describe("The format of the generated events"),
        )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, &["format"]);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), &["format"]);
    }
}
