//! 🪶 Mezmo destination: send events back to Mezmo Log Analysis.
//!
//! The only destination with an enum whose model keys and wire codes disagree:
//! users write `message_pass_through`, the API wants `pass-through`.

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, EnumTable, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const LOG_CONSTRUCTION_SCHEMES: EnumTable = EnumTable::new(
    "log construction scheme",
    &[("explicit", "explicit"), ("message_pass_through", "pass-through")],
);

const FIELDS: &[&str] = &["host", "ingestion_key"];

fn query_schema() -> Schema {
    Schema::new()
        .attr(
            "hostname",
            Attribute::optional(AttrType::String)
                .default("mezmo")
                .validate(Validator::LengthAtLeast(1))
                .describe("The value to use as the hostname for each line"),
        )
        .attr(
            "tags",
            Attribute::optional(AttrType::list_of(AttrType::String))
                .describe("Tags to attach to each line"),
        )
        .attr("ip", Attribute::optional(AttrType::String).describe("The IP address to use for each line"))
        .attr("mac", Attribute::optional(AttrType::String).describe("The MAC address to use for each line"))
}

fn explicit_scheme_options_schema() -> Schema {
    let field = |description: &'static str| {
        Attribute::optional(AttrType::String)
            .validate(Validator::LengthAtLeast(1))
            .describe(description)
    };
    Schema::new()
        .attr("line", field("The event field holding the line text"))
        .attr("meta_field", field("The event field holding line metadata"))
        .attr("app", field("The event field holding the app name"))
        .attr("file", field("The event field holding the file name"))
        .attr("timestamp", field("The event field holding the line timestamp"))
        .attr("env", field("The event field holding the environment"))
        .attr("level", field("The event field holding the log level"))
}

pub struct MezmoDestination;

impl ComponentType for MezmoDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "mezmo";
    const API_TYPE: &'static str = "logs";
    const DESCRIPTION: &'static str = "Send log events to Mezmo Log Analysis";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "host",
                Attribute::optional(AttrType::String)
                    .default("logs.mezmo.com")
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The host for the Mezmo ingestion API"),
            )
            .attr(
                "ingestion_key",
                Attribute::required(AttrType::String)
                    .sensitive()
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The ingestion key of the Mezmo account"),
            )
            .attr(
                "query",
                Attribute::optional(AttrType::object(query_schema()))
                    .describe("Query parameters sent along with every batch"),
            )
            .attr(
                "log_construction_scheme",
                Attribute::optional(AttrType::String)
                    .default("explicit")
                    .validate(Validator::OneOf(LOG_CONSTRUCTION_SCHEMES.keys()))
                    .describe("How the log line is built from the event"),
            )
            .attr(
                "explicit_scheme_options",
                Attribute::optional(AttrType::object(explicit_scheme_options_schema()))
                    .describe("Which event fields become which parts of the line, for the explicit scheme"),
            )
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        if let Some(query) = model.get_object("query") {
            wire.insert("query".to_string(), nested_to_wire(query));
        }
        if let Some(scheme) = model.get_string("log_construction_scheme") {
            if scheme != "explicit" && model.is_set("explicit_scheme_options") {
                diags.add_attribute_error(
                    "explicit_scheme_options",
                    "Invalid Attribute Combination",
                    format!("explicit_scheme_options can only be used with the \"explicit\" scheme, not \"{scheme}\""),
                );
            }
            wire.insert(
                "log_construction_scheme".to_string(),
                Value::String(LOG_CONSTRUCTION_SCHEMES.wire_code(scheme).to_string()),
            );
        }
        if let Some(options) = model.get_object("explicit_scheme_options") {
            wire.insert("explicit_scheme_options".to_string(), nested_to_wire(options));
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        model.insert("query".to_string(), nested_to_model(&query_schema(), user_config.get("query")));
        let scheme = user_config
            .get("log_construction_scheme")
            .and_then(Value::as_str)
            .map(|code| AttrValue::string(LOG_CONSTRUCTION_SCHEMES.find_key(code)))
            .unwrap_or_default();
        model.insert("log_construction_scheme".to_string(), scheme);
        model.insert(
            "explicit_scheme_options".to_string(),
            nested_to_model(&explicit_scheme_options_schema(), user_config.get("explicit_scheme_options")),
        );
    }
}
