//! 🧰 Bits of schema that more than one component type carries around.
//!
//! Auth blocks, kafka brokers, SASL, the usual compression list. Declared once, here,
//! so the http destination and the elasticsearch destination at least agree on what
//! a password is.

use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::convert::{AttrObjectExt, WireMap, nested_to_model, nested_to_wire};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

pub(crate) const GZIP_OR_NONE: &[&str] = &["gzip", "none"];

/// Encodings most sinks accept for their payloads.
pub(crate) const JSON_OR_TEXT: &[&str] = &["json", "text"];

pub(crate) const SASL_MECHANISMS: &[&str] = &["plain", "scram-sha-256", "scram-sha-512"];

/// 🔐 An `auth` block offering the given strategies.
///
/// Only the credential fields the strategies actually use are declared. `basic` brings
/// `user`/`password`, `bearer` brings `token`, `aws` brings the access key pair and region.
pub(crate) fn auth_schema(strategies: &[&'static str]) -> Schema {
    let mut schema = Schema::new().attr(
        "strategy",
        Attribute::required(AttrType::String)
            .validate(Validator::OneOf(strategies.to_vec()))
            .describe("The authentication strategy to use"),
    );
    if strategies.contains(&"basic") {
        schema = schema
            .attr(
                "user",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The username for basic authentication"),
            )
            .attr(
                "password",
                Attribute::optional(AttrType::String)
                    .sensitive()
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The password for basic authentication"),
            );
    }
    if strategies.contains(&"bearer") {
        schema = schema.attr(
            "token",
            Attribute::optional(AttrType::String)
                .sensitive()
                .validate(Validator::LengthAtLeast(1))
                .describe("The token for bearer authentication"),
        );
    }
    if strategies.contains(&"aws") {
        schema = schema
            .attr(
                "access_key_id",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The AWS access key id"),
            )
            .attr(
                "secret_access_key",
                Attribute::optional(AttrType::String)
                    .sensitive()
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The AWS secret access key"),
            )
            .attr(
                "region",
                Attribute::optional(AttrType::String)
                    .validate(Validator::LengthAtLeast(1))
                    .describe("The AWS region"),
            );
    }
    schema
}

/// 🔐 Check that the chosen strategy brought its credentials along.
///
/// The schema can't express "required when strategy is X", so this runs inside
/// `from_model`. An unknown or missing strategy is left to the schema's own checks.
pub(crate) fn validate_auth(auth: &AttrObject, path: &str, diags: &mut Diagnostics) {
    let Some(strategy) = auth.get_string("strategy") else {
        return;
    };
    let needed: &[&str] = match strategy {
        "basic" => &["user", "password"],
        "bearer" => &["token"],
        "aws" => &["access_key_id", "secret_access_key", "region"],
        _ => &[],
    };
    for field in needed {
        if !auth.is_set(field) && !auth.value(field).is_unknown() {
            diags.add_attribute_error(
                format!("{path}.{field}"),
                "Missing authentication field",
                format!("\"{field}\" is required when the auth strategy is \"{strategy}\""),
            );
        }
    }
}

/// 📤 Validate and serialize an optional `auth` attribute into `wire`.
pub(crate) fn auth_to_wire(wire: &mut WireMap, model: &AttrObject, name: &str, diags: &mut Diagnostics) {
    if let Some(auth) = model.get_object(name) {
        validate_auth(auth, name, diags);
        wire.insert(name.to_string(), nested_to_wire(auth));
    }
}

/// 🪪 AWS credentials without a strategy switch, as the S3 components take them.
pub(crate) fn aws_credentials_schema() -> Schema {
    Schema::new()
        .attr(
            "access_key_id",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The AWS access key id"),
        )
        .attr(
            "secret_access_key",
            Attribute::required(AttrType::String)
                .sensitive()
                .validate(Validator::LengthAtLeast(1))
                .describe("The AWS secret access key"),
        )
}

/// 🧱 Kafka bootstrap brokers: `[{host, port}]`.
pub(crate) fn brokers_schema() -> Schema {
    Schema::new()
        .attr(
            "host",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The broker host"),
        )
        .attr(
            "port",
            Attribute::required(AttrType::Int)
                .validate(Validator::NumberBetween(1.0, 65535.0))
                .describe("The broker port"),
        )
}

pub(crate) fn brokers_attribute() -> Attribute {
    Attribute::required(AttrType::list_nested(brokers_schema()))
        .validate(Validator::ListSizeBetween(1, 100))
        .describe("The kafka brokers to connect to")
}

pub(crate) fn sasl_schema() -> Schema {
    Schema::new()
        .attr(
            "mechanism",
            Attribute::optional(AttrType::String)
                .validate(Validator::OneOf(SASL_MECHANISMS.to_vec()))
                .describe("The SASL mechanism to use"),
        )
        .attr(
            "username",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The SASL username"),
        )
        .attr(
            "password",
            Attribute::required(AttrType::String)
                .sensitive()
                .validate(Validator::LengthAtLeast(1))
                .describe("The SASL password"),
        )
}

/// 📤 A list of flat nested objects, each copied key for key.
pub(crate) fn object_list_to_wire(model: &AttrObject, name: &str) -> Option<Value> {
    model.get_object_list(name).map(|items| {
        Value::Array(items.into_iter().map(nested_to_wire).collect())
    })
}

/// 📥 The inverse of [`object_list_to_wire`], shaped by the item schema.
pub(crate) fn object_list_to_model(schema: &Schema, wire: Option<&Value>) -> AttrValue {
    match wire {
        Some(Value::Array(items)) => AttrValue::List(
            items
                .iter()
                .map(|item| nested_to_model(schema, Some(item)))
                .collect(),
        ),
        _ => AttrValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_basic_auth_forgets_its_password() {
        let the_auth = match AttrValue::object([
            ("strategy", AttrValue::string("basic")),
            ("user", AttrValue::string("me")),
        ]) {
            AttrValue::Object(auth) => auth,
            _ => unreachable!(),
        };
        let mut the_pile = Diagnostics::new();
        validate_auth(&the_auth, "auth", &mut the_pile);
        assert_eq!(the_pile.len(), 1);
        assert_eq!(
            the_pile.iter().next().and_then(|d| d.path.clone()),
            Some("auth.password".to_string())
        );
    }

    #[test]
    fn the_one_where_aws_wants_all_three() {
        let the_auth = match AttrValue::object([("strategy", AttrValue::string("aws"))]) {
            AttrValue::Object(auth) => auth,
            _ => unreachable!(),
        };
        let mut the_pile = Diagnostics::new();
        validate_auth(&the_auth, "auth", &mut the_pile);
        assert_eq!(the_pile.len(), 3);
    }

    #[test]
    fn the_one_where_the_schema_only_offers_fields_its_strategies_use() {
        let the_schema = auth_schema(&["basic", "none"]);
        assert!(the_schema.get("password").is_some_and(|a| a.sensitive));
        assert!(the_schema.get("token").is_none());
        assert!(the_schema.get("region").is_none());
    }
}
