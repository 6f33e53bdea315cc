//! 🚀 mzm: the Mezmo pipeline component provider, minus the plugin protocol.
//!
//! 🎬 *[a plan walks into an API. the API asks for user_config. the plan has no idea what that is.]*
//!
//! This crate is the translator standing between a declarative plan (Terraform-shaped
//! attribute trees) and the Mezmo pipeline API's JSON. Every source, destination and
//! processor type gets a schema and two converters: `from_model` (plan → request body)
//! and `to_model` (response → state). The conditional-expression tree in
//! [`conditional`] is the one piece with actual recursion in it. Everything else is
//! lovingly hand-enumerated field copying. 🦆
//!
//! 🧠 Knowledge graph:
//! - [`common`]: `AttrValue`, the plan/state value tree
//! - [`schema`]: attribute declarations, validators, default filling
//! - [`convert`]: typed getters and the wire copy helpers every converter leans on
//! - [`conditional`]: the AND/OR tree unwinding, both directions
//! - [`components`]: sources, destinations, processors and the registry
//! - [`client`]: the pipeline API (HTTP for real, in-memory for tests and dry runs)
//! - [`resource`]: create/read/update/delete glue that stitches it all together
//! - [`app_config`]: figment-powered provider configuration

pub mod app_config;
pub mod client;
pub mod common;
pub mod components;
pub mod conditional;
pub mod convert;
pub mod diagnostics;
pub mod resource;
pub mod schema;

pub use common::{AttrObject, AttrValue};
pub use components::{Component, ComponentDefinition, ComponentKind};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
