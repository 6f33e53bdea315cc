//! 🌐 HTTP source: the pipeline opens a port and waits for someone to POST at it.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType, copy_all_to_model, copy_all_to_wire};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

use super::DECODINGS;

const FIELDS: &[&str] = &["decoding", "capture_metadata"];

pub struct HttpSource;

impl ComponentType for HttpSource {
    const KIND: ComponentKind = ComponentKind::Source;
    const TYPE_NAME: &'static str = "http";
    const API_TYPE: &'static str = "http";
    const DESCRIPTION: &'static str = "Receive data over HTTP. The ingestion endpoint is created by the API.";

    fn user_config_schema() -> Schema {
        Schema::new()
            .attr(
                "decoding",
                Attribute::optional(AttrType::String)
                    .default("json")
                    .validate(Validator::OneOf(DECODINGS.to_vec()))
                    .describe("The decoding method for converting frames into data events"),
            )
            .attr(
                "capture_metadata",
                Attribute::optional(AttrType::Bool)
                    .default(false)
                    .describe("Enable the inclusion of all http headers and query string parameters"),
            )
    }

    fn from_model(model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        let mut wire = WireMap::new();
        copy_all_to_wire(&mut wire, model, FIELDS);
        wire
    }

    fn to_model(user_config: &WireMap, model: &mut AttrObject, _diags: &mut Diagnostics) {
        copy_all_to_model(model, user_config, &Self::user_config_schema(), FIELDS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttrValue;
    use crate::components::test_support::{apply, plan};
    use crate::convert::AttrObjectExt;
    use serde_json::json;

    #[test]
    fn the_one_where_defaults_go_out_on_the_wire() {
        let the_plan = plan::<HttpSource>(vec![]);
        let (the_wire, the_state) = apply::<HttpSource>(&the_plan);
        assert_eq!(the_wire, json!({"decoding": "json", "capture_metadata": false}));
        assert_eq!(the_state.get_string("decoding"), Some("json"));
        assert_eq!(the_state.value("inputs"), &AttrValue::Null, "sources have no inputs attribute");
    }
}
