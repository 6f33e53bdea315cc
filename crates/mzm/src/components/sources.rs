//! 📥 Sources: where the data gets into the pipeline.

use super::ComponentDefinition;

mod demo;
mod http;
mod kafka;
mod s3;
mod splunk_hec;

pub use demo::DemoSource;
pub use http::HttpSource;
pub use kafka::KafkaSource;
pub use s3::S3Source;
pub use splunk_hec::SplunkHecSource;

/// Decodings the push-style sources understand.
pub(crate) const DECODINGS: &[&str] = &["json", "ndjson", "bytes", "auto"];

pub fn definitions() -> Vec<ComponentDefinition> {
    vec![
        ComponentDefinition::of::<HttpSource>(),
        ComponentDefinition::of::<DemoSource>(),
        ComponentDefinition::of::<KafkaSource>(),
        ComponentDefinition::of::<S3Source>(),
        ComponentDefinition::of::<SplunkHecSource>(),
    ]
}
