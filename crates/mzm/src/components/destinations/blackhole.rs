//! 🕳️ Blackhole destination: accepts everything, keeps nothing. Great for testing, terrible for audits.

use crate::common::AttrObject;
use crate::components::{ComponentKind, ComponentType};
use crate::convert::WireMap;
use crate::diagnostics::Diagnostics;
use crate::schema::Schema;

pub struct BlackholeDestination;

impl ComponentType for BlackholeDestination {
    const KIND: ComponentKind = ComponentKind::Destination;
    const TYPE_NAME: &'static str = "blackhole";
    const API_TYPE: &'static str = "blackhole";
    const DESCRIPTION: &'static str = "Drop every event it receives";

    fn user_config_schema() -> Schema {
        Schema::new()
    }

    fn from_model(_model: &AttrObject, _diags: &mut Diagnostics) -> WireMap {
        WireMap::new()
    }

    fn to_model(_user_config: &WireMap, _model: &mut AttrObject, _diags: &mut Diagnostics) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttrValue;
    use crate::components::test_support::{apply, plan};
    use crate::convert::AttrObjectExt;
    use serde_json::json;

    #[test]
    fn the_one_where_the_only_config_is_the_ack() {
        let the_plan = plan::<BlackholeDestination>(vec![
            ("inputs", AttrValue::strings(["a", "b"])),
            ("ack_enabled", AttrValue::Bool(false)),
        ]);
        let (the_wire, the_state) = apply::<BlackholeDestination>(&the_plan);
        assert_eq!(the_wire, json!({"ack_enabled": false}));
        assert_eq!(the_state.get_bool("ack_enabled"), Some(false));
        assert_eq!(the_state.get_string_list("inputs"), Some(vec!["a".to_string(), "b".to_string()]));
    }
}
