//! ⚙️ Processors: everything that happens to an event between getting in and getting out.
//!
//! Half of these carry a conditional tree somewhere (filter, route, reduce, aggregate,
//! throttle, sample, trace sampling). The helpers at the bottom wire those trees in and
//! out so each processor only has to say *where* its tree lives.

use serde_json::Value;

use super::ComponentDefinition;
use crate::common::{AttrObject, AttrValue};
use crate::conditional::{OperatorFamily, conditional_schema, unwind_conditional_from_model, unwind_conditional_to_model};
use crate::convert::AttrObjectExt;
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute};

mod aggregate;
mod crypto;
mod dedupe;
mod fields;
mod filter;
mod metrics;
mod parse;
mod reduce;
mod route;
mod sample;
mod script_execution;
mod throttle;
mod trace_sampling;

pub use aggregate::AggregateProcessor;
pub use crypto::{DecryptFieldsProcessor, EncryptFieldsProcessor};
pub use dedupe::DedupeProcessor;
pub use fields::{
    CompactFieldsProcessor, DropFieldsProcessor, FlattenFieldsProcessor, MapFieldsProcessor, UnrollProcessor,
};
pub use filter::FilterProcessor;
pub use metrics::{EventToMetricProcessor, TagCardinalityLimitProcessor};
pub use parse::ParseProcessor;
pub use reduce::ReduceProcessor;
pub use route::RouteProcessor;
pub use sample::SampleProcessor;
pub use script_execution::ScriptExecutionProcessor;
pub use throttle::ThrottleProcessor;
pub use trace_sampling::TraceSamplingProcessor;

pub fn definitions() -> Vec<ComponentDefinition> {
    vec![
        ComponentDefinition::of::<FilterProcessor>(),
        ComponentDefinition::of::<RouteProcessor>(),
        ComponentDefinition::of::<ReduceProcessor>(),
        ComponentDefinition::of::<AggregateProcessor>(),
        ComponentDefinition::of::<ThrottleProcessor>(),
        ComponentDefinition::of::<SampleProcessor>(),
        ComponentDefinition::of::<TraceSamplingProcessor>(),
        ComponentDefinition::of::<DedupeProcessor>(),
        ComponentDefinition::of::<DropFieldsProcessor>(),
        ComponentDefinition::of::<CompactFieldsProcessor>(),
        ComponentDefinition::of::<ParseProcessor>(),
        ComponentDefinition::of::<MapFieldsProcessor>(),
        ComponentDefinition::of::<EncryptFieldsProcessor>(),
        ComponentDefinition::of::<DecryptFieldsProcessor>(),
        ComponentDefinition::of::<FlattenFieldsProcessor>(),
        ComponentDefinition::of::<UnrollProcessor>(),
        ComponentDefinition::of::<ScriptExecutionProcessor>(),
        ComponentDefinition::of::<EventToMetricProcessor>(),
        ComponentDefinition::of::<TagCardinalityLimitProcessor>(),
    ]
}

/// 🌳 A required conditional tree attribute.
pub(crate) fn conditional_attribute(family: OperatorFamily, description: &'static str) -> Attribute {
    Attribute::required(AttrType::object(conditional_schema(family))).describe(description)
}

/// 📤 The tree under `name`, unwound for the wire. `None` when the attribute isn't set.
pub(crate) fn conditional_to_wire(model: &AttrObject, name: &str) -> Option<Value> {
    model
        .get_object(name)
        .map(|node| Value::Object(unwind_conditional_from_model(node)))
}

/// 📥 A wire tree back into a model node. Null in, null out; broken in, diagnostics out.
pub(crate) fn conditional_to_model(wire: Option<&Value>, path: &str, diags: &mut Diagnostics) -> AttrValue {
    match wire {
        None | Some(Value::Null) => AttrValue::Null,
        Some(tree) => unwind_conditional_to_model(tree, path, diags)
            .map(AttrValue::Object)
            .unwrap_or_default(),
    }
}
