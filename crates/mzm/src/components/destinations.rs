//! 📤 Destinations: where the data leaves the pipeline.
//!
//! Every destination also carries `ack_enabled`, which lives in the base schema
//! (see [`super::base_schema`]) and is written by [`super::ComponentDefinition`].

use super::ComponentDefinition;

mod blackhole;
mod datadog_logs;
mod elasticsearch;
mod http;
mod kafka;
mod loki;
mod mezmo;
mod new_relic;
mod s3;
mod splunk_hec_logs;

pub use blackhole::BlackholeDestination;
pub use datadog_logs::DatadogLogsDestination;
pub use elasticsearch::ElasticsearchDestination;
pub use http::HttpDestination;
pub use kafka::KafkaDestination;
pub use loki::LokiDestination;
pub use mezmo::MezmoDestination;
pub use new_relic::NewRelicDestination;
pub use s3::S3Destination;
pub use splunk_hec_logs::SplunkHecLogsDestination;

pub fn definitions() -> Vec<ComponentDefinition> {
    vec![
        ComponentDefinition::of::<BlackholeDestination>(),
        ComponentDefinition::of::<HttpDestination>(),
        ComponentDefinition::of::<LokiDestination>(),
        ComponentDefinition::of::<MezmoDestination>(),
        ComponentDefinition::of::<ElasticsearchDestination>(),
        ComponentDefinition::of::<KafkaDestination>(),
        ComponentDefinition::of::<S3Destination>(),
        ComponentDefinition::of::<SplunkHecLogsDestination>(),
        ComponentDefinition::of::<DatadogLogsDestination>(),
        ComponentDefinition::of::<NewRelicDestination>(),
    ]
}
