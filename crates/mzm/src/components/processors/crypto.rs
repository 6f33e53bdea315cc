//! 🔐 Encrypt and decrypt fields processors. Same knobs, opposite directions.
//!
//! The key length has to match the AES variant (16, 24 or 32 characters), which the
//! schema alone can't say, so `from_model` checks it.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::{AttrObjectExt, WireMap};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

const ALGORITHMS: &[&str] = &[
    "AES-256-CFB",
    "AES-192-CFB",
    "AES-128-CFB",
    "AES-256-OFB",
    "AES-192-OFB",
    "AES-128-OFB",
    "AES-256-CTR",
    "AES-192-CTR",
    "AES-128-CTR",
    "AES-256-CBC-PKCS7",
    "AES-192-CBC-PKCS7",
    "AES-128-CBC-PKCS7",
];

fn crypto_schema(raw_bytes: &'static str, raw_bytes_description: &'static str) -> Schema {
    Schema::new()
        .attr(
            "algorithm",
            Attribute::required(AttrType::String)
                .validate(Validator::OneOf(ALGORITHMS.to_vec()))
                .describe("The AES variant to use"),
        )
        .attr(
            "field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field to transform"),
        )
        .attr(
            "key",
            Attribute::required(AttrType::String)
                .sensitive()
                .validate(Validator::LengthBetween(16, 32))
                .describe("The key. 16, 24 or 32 characters for AES-128, -192 or -256"),
        )
        .attr(
            "iv_field",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The field holding the initialization vector"),
        )
        .attr(
            raw_bytes,
            Attribute::optional(AttrType::Bool)
                .default(true)
                .describe(raw_bytes_description),
        )
}

fn crypto_from_model(model: &AttrObject, raw_bytes: &str, diags: &mut Diagnostics) -> WireMap {
    if let (Some(algorithm), Some(key)) = (model.get_string("algorithm"), model.get_string("key")) {
        let expected = match algorithm.get(4..7) {
            Some("128") => 16,
            Some("192") => 24,
            _ => 32,
        };
        let actual = key.chars().count();
        if actual != expected {
            diags.add_attribute_error(
                "key",
                "Invalid key length",
                format!("{algorithm} needs a {expected} character key, got {actual}"),
            );
        }
    }
    let mut wire = WireMap::new();
    copy_all_to_wire(&mut wire, model, &["algorithm", "field", "key", "iv_field", raw_bytes]);
    wire
}

// ============================================================
//  🔒 encrypt
// ============================================================

pub struct EncryptFieldsProcessor;

impl ComponentType for EncryptFieldsProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "encrypt_fields";
    const API_TYPE: &'static str = "encrypt-fields";
    const DESCRIPTION: &'static str = "Encrypt the value of a field";

    fn user_config_schema() -> Schema {
        crypto_schema("encode_raw_bytes", "Base64 encode the encrypted bytes")
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        crypto_from_model(model, "encode_raw_bytes", diags)
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(
            model,
            user_config,
            &Self::user_config_schema(),
            &["algorithm", "field", "key", "iv_field", "encode_raw_bytes"],
        );
    }
}

// ============================================================
//  🔓 decrypt
// ============================================================

pub struct DecryptFieldsProcessor;

impl ComponentType for DecryptFieldsProcessor {
    const KIND: ComponentKind = ComponentKind::Processor;
    const TYPE_NAME: &'static str = "decrypt_fields";
    const API_TYPE: &'static str = "decrypt-fields";
    const DESCRIPTION: &'static str = "Decrypt the value of a field";

    fn user_config_schema() -> Schema {
        crypto_schema("decode_raw_bytes", "Base64 decode the field before decrypting it")
    }

    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap {
        crypto_from_model(model, "decode_raw_bytes", diags)
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(
            model,
            user_config,
            &Self::user_config_schema(),
            &["algorithm", "field", "key", "iv_field", "decode_raw_bytes"],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttrValue;
    use crate::components::test_support::{plan, read, render};
    use serde_json::json;

    fn the_plan<T: ComponentType>(algorithm: &str, key: &str) -> AttrObject {
        plan::<T>(vec![
            ("algorithm", AttrValue::string(algorithm)),
            ("field", AttrValue::string(".ssn")),
            ("key", AttrValue::string(key)),
            ("iv_field", AttrValue::string(".iv")),
        ])
    }

    #[test]
    fn the_one_where_aes_128_wants_sixteen_characters() -> anyhow::Result<()> {
        let the_wire = render::<EncryptFieldsProcessor>(&the_plan::<EncryptFieldsProcessor>(
            "AES-128-CFB",
            "0123456789abcdef",
        ))
        .map_err(anyhow::Error::new)?;
        assert_eq!(the_wire["encode_raw_bytes"], true);

        let the_pile = render::<EncryptFieldsProcessor>(&the_plan::<EncryptFieldsProcessor>(
            "AES-256-CFB",
            "0123456789abcdef",
        ))
        .expect_err("💀 a 128 bit key for AES-256");
        assert_eq!(the_pile.iter().next().and_then(|d| d.path.clone()), Some("key".to_string()));
        Ok(())
    }

    #[test]
    fn the_one_where_decrypt_keeps_the_key_it_was_given() -> anyhow::Result<()> {
        let the_plan = the_plan::<DecryptFieldsProcessor>("AES-192-CTR", "0123456789abcdef01234567");
        let the_state = read::<DecryptFieldsProcessor>(
            &the_plan,
            json!({"algorithm": "AES-192-CTR", "field": ".ssn", "iv_field": ".iv", "decode_raw_bytes": false}),
        )
        .map_err(anyhow::Error::new)?;
        assert_eq!(the_state.get_string("key"), Some("0123456789abcdef01234567"));
        assert_eq!(the_state.get_bool("decode_raw_bytes"), Some(false));
        Ok(())
    }
}
