//! 🔬 Parse processor: turn a string field into structure, with one of a dozen parsers.
//!
//! Each parser that takes options has its own `<parser>_options` attribute. On the wire
//! there is a single `options` object, and `parser` carries the API's code for the
//! parser (`parse_json`, `parse_grok`, ...).

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, EnumTable, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const PARSERS: EnumTable = EnumTable::new(
    "parser",
    &[
        ("apache_log", "parse_apache_log"),
        ("cef_log", "parse_cef"),
        ("common_log", "parse_common_log"),
        ("csv_row", "parse_csv"),
        ("grok_parser", "parse_grok"),
        ("json_parser", "parse_json"),
        ("key_value_log", "parse_key_value"),
        ("nginx_log", "parse_nginx_log"),
        ("regex_parser", "parse_regex"),
        ("syslog", "parse_syslog"),
        ("timestamp_parser", "parse_timestamp"),
    ],
);

const FIELDS: &[&str] = &["field", "target_field"];

/// Parsers that cannot do anything without their options.
const NEEDS_OPTIONS: &[&str] = &["grok_parser", "regex_parser", "timestamp_parser"];

/// 🧩 `(parser key, options attribute, options schema)` for every parser that takes options.
fn parser_options() -> Vec<(&'static str, &'static str, Schema)> {
    let text = |description: &'static str| {
        Attribute::optional(AttrType::String)
            .validate(Validator::LengthAtLeast(1))
            .describe(description)
    };
    vec![
        (
            "apache_log",
            "apache_log_options",
            Schema::new()
                .attr(
                    "format",
                    Attribute::required(AttrType::String)
                        .validate(Validator::OneOf(vec!["common", "combined", "error"]))
                        .describe("The apache log format"),
                )
                .attr("timestamp_format", text("The strftime format of the timestamp")),
        ),
        (
            "csv_row",
            "csv_row_options",
            Schema::new().attr(
                "field_names",
                Attribute::optional(AttrType::list_of(AttrType::String))
                    .describe("Names for the parsed columns, in order"),
            ),
        ),
        (
            "grok_parser",
            "grok_parser_options",
            Schema::new().attr(
                "pattern",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The grok pattern"),
            ),
        ),
        (
            "key_value_log",
            "key_value_log_options",
            Schema::new()
                .attr(
                    "key_value_delimiter",
                    Attribute::optional(AttrType::String)
                        .default("=")
                        .describe("The string separating a key from its value"),
                )
                .attr(
                    "field_delimiter",
                    Attribute::optional(AttrType::String)
                        .default(" ")
                        .describe("The string separating one key/value pair from the next"),
                ),
        ),
        (
            "nginx_log",
            "nginx_log_options",
            Schema::new()
                .attr(
                    "format",
                    Attribute::required(AttrType::String)
                        .validate(Validator::OneOf(vec!["combined", "error"]))
                        .describe("The nginx log format"),
                )
                .attr("timestamp_format", text("The strftime format of the timestamp")),
        ),
        (
            "regex_parser",
            "regex_parser_options",
            Schema::new()
                .attr(
                    "pattern",
                    Attribute::required(AttrType::String)
                        .validate(Validator::LengthAtLeast(1))
                        .describe("The regular expression, with named capture groups"),
                )
                .attr(
                    "case_sensitive",
                    Attribute::optional(AttrType::Bool).default(true).describe("Match case sensitively"),
                )
                .attr(
                    "multiline",
                    Attribute::optional(AttrType::Bool).default(false).describe("^ and $ match at line breaks"),
                )
                .attr(
                    "match_newline",
                    Attribute::optional(AttrType::Bool).default(false).describe(". also matches a newline"),
                ),
        ),
        (
            "timestamp_parser",
            "timestamp_parser_options",
            Schema::new().attr(
                "format",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The strftime format of the timestamp"),
            ),
        ),
    ]
}

pub struct ParseProcessor;

impl ComponentType for ParseProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "parse";
    const API_TYPE: &'static str = "parse";
    const DESCRIPTION: &'static str = "Parse a string field into structured data";

    fn user_config_schema() -> Schema {
        let mut schema = Schema::new()
            .attr(
                "field",
                Attribute::required(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The field holding the string to parse"),
            )
            .attr(
                "target_field",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("Where the parsed result goes. Defaults to replacing the source field"),
            )
            .attr(
                "parser",
                Attribute::required(AttrType::String)
                    .validate(Validator::OneOf(PARSERS.keys()))
                    .describe("The parser to use"),
            );
        for (parser, name, options) in parser_options() {
            schema = schema.attr(
                name,
                Attribute::optional(AttrType::object(options))
                    .describe(format!("Options for the {parser} parser")),
            );
        }
        schema
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        let Some(parser) = model.get_string("parser") else {
            return wire;
        };
        wire.insert("parser".to_string(), Value::String(PARSERS.wire_code(parser).to_string()));

        let selected = format!("{parser}_options");
        for (_, name, _) in parser_options() {
            if name != selected && model.is_set(name) {
                diags.add_attribute_error(
                    name,
                    "Invalid Attribute Combination",
                    format!("{name} cannot be used with the {parser} parser"),
                );
            }
        }
        match model.get_object(&selected) {
            Some(options) => {
                wire.insert("options".to_string(), nested_to_wire(options));
            }
            None if NEEDS_OPTIONS.contains(&parser) && !model.value(&selected).is_unknown() => {
                diags.add_attribute_error(
                    &selected,
                    "Missing parser options",
                    format!("the {parser} parser needs {selected}"),
                );
            }
            None => {}
        }
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
        let parser = user_config
            .get("parser")
            .and_then(Value::as_str)
            .map(|code| PARSERS.find_key(code));
        model.insert("parser".to_string(), parser.map(AttrValue::string).unwrap_or_default());
        for (other, name, options) in parser_options() {
            let value = if Some(other) == parser {
                nested_to_model(&options, user_config.get("options"))
            } else {
                AttrValue::Null
            };
            model.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{apply, plan, read, render};
    use serde_json::json;

    #[test]
    fn the_one_where_grok_gets_its_pattern_and_its_code_name() {
        let the_plan = plan::<ParseProcessor>(vec![
            ("field", AttrValue::string(".message")),
            ("parser", AttrValue::string("grok_parser")),
            (
                "grok_parser_options",
                AttrValue::object([("pattern", AttrValue::string("%{COMMONAPACHELOG}"))]),
            ),
        ]);
        let (the_wire, the_state) = apply::<ParseProcessor>(&the_plan);
        assert_eq!(
            the_wire,
            json!({"field": ".message", "parser": "parse_grok", "options": {"pattern": "%{COMMONAPACHELOG}"}})
        );
        assert_eq!(the_state.get_string("parser"), Some("grok_parser"));
        assert_eq!(the_state.value("grok_parser_options"), the_plan.value("grok_parser_options"));
        assert_eq!(the_state.value("regex_parser_options"), &AttrValue::Null);
    }

    #[test]
    fn the_one_where_json_needs_no_options_at_all() -> anyhow::Result<()> {
        let the_plan = plan::<ParseProcessor>(vec![
            ("field", AttrValue::string(".message")),
            ("parser", AttrValue::string("json_parser")),
        ]);
        let the_wire = render::<ParseProcessor>(&the_plan).map_err(anyhow::Error::new)?;
        assert!(the_wire.get("options").is_none());
        Ok(())
    }

    #[test]
    fn the_one_where_regex_is_handed_grok_options() {
        let the_plan = plan::<ParseProcessor>(vec![
            ("field", AttrValue::string(".message")),
            ("parser", AttrValue::string("regex_parser")),
            (
                "grok_parser_options",
                AttrValue::object([("pattern", AttrValue::string("%{WORD}"))]),
            ),
        ]);
        let the_pile = render::<ParseProcessor>(&the_plan).expect_err("💀 wrong options, no options");
        let the_paths: Vec<_> = the_pile.iter().filter_map(|d| d.path.clone()).collect();
        assert_eq!(the_paths, vec!["grok_parser_options".to_string(), "regex_parser_options".to_string()]);
    }

    #[test]
    fn the_one_where_the_api_speaks_in_parse_codes() -> anyhow::Result<()> {
        let the_plan = plan::<ParseProcessor>(vec![]);
        let the_state = read::<ParseProcessor>(
            &the_plan,
            json!({"field": ".line", "parser": "parse_key_value", "options": {"key_value_delimiter": ":"}}),
        )
        .map_err(anyhow::Error::new)?;
        assert_eq!(the_state.get_string("parser"), Some("key_value_log"));
        let the_options = the_state.get_object("key_value_log_options").expect("💀 options");
        assert_eq!(the_options.get_string("key_value_delimiter"), Some(":"));
        assert_eq!(the_options.value("field_delimiter"), &AttrValue::Null);
        Ok(())
    }
}
