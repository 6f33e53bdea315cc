//! 🧩 Components: sources, destinations, processors, and the registry that knows them all.
//!
//! 🎬 COLD OPEN. INT. PIPELINE EDITOR. A USER DRAGS A BOX ONTO THE CANVAS.
//! The box is called "HTTP destination". Behind it: one schema, two converters, and a
//! `user_config` blob the API guards like a dragon guards gold. Multiply by forty.
//!
//! ## Architecture 📐
//!
//! ```text
//!   plan (AttrObject)                                  API (Component JSON)
//!  ┌────────────────────┐   ComponentDefinition   ┌────────────────────────────┐
//!  │ id, pipeline_id    │ ───── from_model ─────▶ │ id, type, title,           │
//!  │ title, description │                         │ description, inputs,       │
//!  │ inputs             │ ◀──── to_model ──────── │ generation_id, user_config │
//!  │ <type-specific>    │                         └────────────────────────────┘
//!  └────────────────────┘
//! ```
//!
//! Every component type is a zero-sized marker implementing [`ComponentType`]. The base
//! attributes (id, title, inputs...) are handled once, here, in [`ComponentDefinition`];
//! the type only ever sees its own `user_config` slice. The registry
//! ([`all_definitions`]) erases the marker types into plain function pointers so the
//! resource layer and the CLI can look components up by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{AttrObject, AttrValue};
use crate::convert::{AttrObjectExt, WireMap, copy_to_model, copy_to_wire, normalize_int};
use crate::diagnostics::Diagnostics;
use crate::schema::{AttrType, Attribute, Schema, Validator};

pub mod destinations;
pub mod processors;
pub(crate) mod shared;
pub mod sources;

/// 🎭 Which part of the pipeline a component lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Source,
    Destination,
    Processor,
}

impl ComponentKind {
    /// The URL segment the API uses for this kind.
    pub fn path_segment(self) -> &'static str {
        match self {
            ComponentKind::Source => "source",
            ComponentKind::Destination => "destination",
            ComponentKind::Processor => "processor",
        }
    }

    /// Sources are where data starts. They have nobody upstream to list.
    pub fn has_inputs(self) -> bool {
        !matches!(self, ComponentKind::Source)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ComponentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" | "sources" => Ok(ComponentKind::Source),
            "destination" | "destinations" => Ok(ComponentKind::Destination),
            "processor" | "processors" => Ok(ComponentKind::Processor),
            other => anyhow::bail!(
                "💀 '{other}' is not a component kind. Try 'source', 'destination' or 'processor'."
            ),
        }
    }
}

/// 📦 A pipeline component as the API sees it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<i64>,
    #[serde(default)]
    pub user_config: WireMap,
    /// Lives in the URL, not the body.
    #[serde(skip)]
    pub pipeline_id: String,
}

/// 🧩 One component type: its names, its `user_config` schema, and its two converters.
///
/// Implementors only deal with their own slice of the model. Base attributes
/// (`id`, `title`, `inputs`, ...) are handled by [`ComponentDefinition`].
pub trait ComponentType {
    const KIND: ComponentKind;
    /// The name users write (`http`, `route`, ...).
    const TYPE_NAME: &'static str;
    /// The `type` the API uses, which is not always the same thing.
    const API_TYPE: &'static str;
    const DESCRIPTION: &'static str;

    fn user_config_schema() -> Schema;

    /// 📤 Plan → `user_config`. Problems go into `diags`; callers discard the map if any are errors.
    fn from_model(model: &AttrObject, diags: &mut Diagnostics) -> WireMap;

    /// 📥 `user_config` → state. Writes every attribute of [`ComponentType::user_config_schema`] into `model`.
    fn to_model(user_config: &WireMap, model: &mut AttrObject, diags: &mut Diagnostics);
}

/// 📇 A type-erased [`ComponentType`], ready to sit in the registry.
#[derive(Clone, Copy)]
pub struct ComponentDefinition {
    pub kind: ComponentKind,
    pub type_name: &'static str,
    pub api_type: &'static str,
    pub description: &'static str,
    user_config_schema: fn() -> Schema,
    user_config_from_model: fn(&AttrObject, &mut Diagnostics) -> WireMap,
    user_config_to_model: fn(&WireMap, &mut AttrObject, &mut Diagnostics),
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .field("api_type", &self.api_type)
            .finish()
    }
}

impl ComponentDefinition {
    pub fn of<T: ComponentType>() -> Self {
        Self {
            kind: T::KIND,
            type_name: T::TYPE_NAME,
            api_type: T::API_TYPE,
            description: T::DESCRIPTION,
            user_config_schema: T::user_config_schema,
            user_config_from_model: T::from_model,
            user_config_to_model: T::to_model,
        }
    }

    /// 🏷️ The resource name a Terraform user would type, e.g. `mezmo_http_destination`.
    pub fn resource_name(&self) -> String {
        format!("mezmo_{}_{}", self.type_name, self.kind)
    }

    /// 📐 Base attributes plus the type's `user_config` attributes.
    pub fn schema(&self) -> Schema {
        base_schema(self.kind)
            .merge((self.user_config_schema)())
            .describe(self.description)
    }

    /// 📐 Just the type-specific part, without the base attributes.
    pub fn user_config_schema(&self) -> Schema {
        (self.user_config_schema)()
    }

    /// 📤 Plan → API request body.
    ///
    /// `prior_state` is the state from the last apply, if there is one. It supplies `id`
    /// and `generation_id` on update, since a plan has those as Unknown or stale.
    pub fn from_model(
        &self,
        plan: &AttrObject,
        prior_state: Option<&AttrObject>,
    ) -> Result<Component, Diagnostics> {
        let mut diags = Diagnostics::new();

        let pipeline_id = match plan.get_string("pipeline_id") {
            Some(pipeline_id) => pipeline_id.to_string(),
            None => {
                diags.add_attribute_error(
                    "pipeline_id",
                    "Missing pipeline_id",
                    "A component cannot exist outside of a pipeline.",
                );
                String::new()
            }
        };

        let id = prior_state
            .and_then(|state| state.get_string("id"))
            .or_else(|| plan.get_string("id"))
            .map(str::to_string);
        let generation_id = prior_state
            .and_then(|state| state.get_i64("generation_id"))
            .or_else(|| plan.get_i64("generation_id"));

        let inputs = if self.kind.has_inputs() {
            plan.get_string_list("inputs")
        } else {
            None
        };

        let mut user_config = (self.user_config_from_model)(plan, &mut diags);
        if self.kind == ComponentKind::Destination {
            copy_to_wire(&mut user_config, "ack_enabled", plan, "ack_enabled");
        }

        if diags.has_error() {
            return Err(diags);
        }

        Ok(Component {
            id,
            component_type: self.api_type.to_string(),
            title: plan.get_string("title").map(str::to_string),
            description: plan.get_string("description").map(str::to_string),
            inputs,
            generation_id,
            user_config,
            pipeline_id,
        })
    }

    /// 📥 API response → state.
    ///
    /// Starts from the plan (so `pipeline_id` and anything the API doesn't echo survives),
    /// then overwrites every attribute the response speaks for. Sensitive attributes the API
    /// redacted keep the plan's value.
    pub fn to_model(&self, plan: &AttrObject, component: &Component) -> Result<AttrObject, Diagnostics> {
        let mut diags = Diagnostics::new();
        let mut state = plan.clone();

        state.insert(
            "id".to_string(),
            component.id.clone().map(AttrValue::String).unwrap_or_default(),
        );
        state.insert(
            "generation_id".to_string(),
            component.generation_id.map(AttrValue::int).unwrap_or_default(),
        );
        state.insert(
            "title".to_string(),
            component.title.clone().map(AttrValue::String).unwrap_or_default(),
        );
        state.insert(
            "description".to_string(),
            component.description.clone().map(AttrValue::String).unwrap_or_default(),
        );
        if self.kind.has_inputs() {
            state.insert(
                "inputs".to_string(),
                component
                    .inputs
                    .as_ref()
                    .map(|inputs| AttrValue::strings(inputs.iter().cloned()))
                    .unwrap_or_default(),
            );
        }

        (self.user_config_to_model)(&component.user_config, &mut state, &mut diags);
        if self.kind == ComponentKind::Destination {
            copy_to_model(&mut state, "ack_enabled", &component.user_config, "ack_enabled");
        }

        restore_sensitive(&self.user_config_schema(), &mut state, plan);

        if diags.has_error() {
            return Err(diags);
        }
        Ok(state)
    }
}

/// 🔒 The API answers secrets with silence. Put the planned value back where silence was.
fn restore_sensitive(schema: &Schema, state: &mut AttrObject, plan: &AttrObject) {
    for (name, attribute) in &schema.attributes {
        let planned = plan.value(name);
        let Some(current) = state.get_mut(*name) else {
            continue;
        };
        if attribute.sensitive {
            if current.is_null() && planned.is_set() {
                *current = planned.clone();
            }
            continue;
        }
        if let (AttrType::Object { schema }, AttrValue::Object(nested), AttrValue::Object(planned_nested)) =
            (&attribute.ty, current, planned)
        {
            restore_sensitive(schema, nested, planned_nested);
        }
    }
}

/// 📐 The attributes every component of a kind carries, whatever its type.
pub fn base_schema(kind: ComponentKind) -> Schema {
    let mut schema = Schema::new()
        .attr(
            "id",
            Attribute::computed(AttrType::String).describe("The uuid of the component"),
        )
        .attr(
            "pipeline_id",
            Attribute::required(AttrType::String)
                .validate(Validator::LengthAtLeast(1))
                .describe("The uuid of the pipeline"),
        )
        .attr(
            "title",
            Attribute::optional(AttrType::String)
                .validate(Validator::LengthBetween(1, 256))
                .describe("A user-defined title for the component"),
        )
        .attr(
            "description",
            Attribute::optional(AttrType::String)
                .validate(Validator::LengthBetween(1, 1024))
                .describe("A user-defined value describing the component"),
        )
        .attr(
            "generation_id",
            Attribute::computed(AttrType::Int)
                .describe("An internal field used for component versioning"),
        );
    if kind.has_inputs() {
        schema = schema.attr(
            "inputs",
            Attribute::optional(AttrType::list_of(AttrType::String))
                .describe("The ids of the upstream components that send data to this one"),
        );
    }
    if kind == ComponentKind::Destination {
        schema = schema.attr(
            "ack_enabled",
            Attribute::optional(AttrType::Bool)
                .default(true)
                .describe("Acknowledge data from the source only once the destination has received it"),
        );
    }
    schema
}

/// 📇 Every registered component type, sources first.
pub fn all_definitions() -> Vec<ComponentDefinition> {
    let mut definitions = sources::definitions();
    definitions.extend(destinations::definitions());
    definitions.extend(processors::definitions());
    definitions
}

/// 🔍 Look a definition up by kind and user-facing type name.
pub fn find_definition(kind: ComponentKind, type_name: &str) -> Option<ComponentDefinition> {
    all_definitions()
        .into_iter()
        .find(|definition| definition.kind == kind && definition.type_name == type_name)
}

/// 🔧 Shorthand for the common "type-specific attributes copied straight across" case.
pub(crate) fn copy_all_to_wire(wire: &mut WireMap, model: &AttrObject, names: &[&str]) {
    for name in names {
        copy_to_wire(wire, name, model, name);
    }
}

/// 🔧 The inverse of [`copy_all_to_wire`]. Whole-number attributes are normalized against `schema`.
pub(crate) fn copy_all_to_model(model: &mut AttrObject, wire: &WireMap, schema: &Schema, names: &[&str]) {
    for name in names {
        copy_to_model(model, name, wire, name);
        if let (Some(attribute), Some(value)) = (schema.get(name), model.get_mut(*name)) {
            *value = normalize_int(std::mem::take(value), &attribute.ty);
        }
    }
}

/// 🔍 Peek at a wire key as a `Value`, `Null` if absent.
pub(crate) fn wire_value<'a>(wire: &'a WireMap, key: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    wire.get(key).unwrap_or(&NULL)
}

/// 🧪 Plan builders shared by the per-type tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn obj<'a>(pairs: impl IntoIterator<Item = (&'a str, AttrValue)>) -> AttrObject {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// A plan the way it looks right before apply: defaults filled, computed attrs Unknown.
    pub(crate) fn plan<T: ComponentType>(pairs: Vec<(&str, AttrValue)>) -> AttrObject {
        let mut plan = obj(pairs);
        plan.insert("pipeline_id".to_string(), AttrValue::string("pipe-1"));
        ComponentDefinition::of::<T>().schema().apply_defaults(&mut plan);
        plan
    }

    /// Validate, convert to the wire, pretend the API echoed it back, convert to state.
    pub(crate) fn apply<T: ComponentType>(plan: &AttrObject) -> (Value, AttrObject) {
        let definition = ComponentDefinition::of::<T>();
        let the_pile = definition.schema().validate(plan);
        assert!(!the_pile.has_error(), "💀 plan did not validate:\n{the_pile}");
        let mut component = match definition.from_model(plan, None) {
            Ok(component) => component,
            Err(diags) => panic!("💀 from_model failed:\n{diags}"),
        };
        component.id = Some("component-1".to_string());
        component.generation_id = Some(0);
        let the_user_config = Value::Object(component.user_config.clone());
        let the_state = match definition.to_model(plan, &component) {
            Ok(state) => state,
            Err(diags) => panic!("💀 to_model failed:\n{diags}"),
        };
        (the_user_config, the_state)
    }

    /// Only the `from_model` half, returning the diagnostics on failure.
    pub(crate) fn render<T: ComponentType>(plan: &AttrObject) -> Result<Value, Diagnostics> {
        ComponentDefinition::of::<T>()
            .from_model(plan, None)
            .map(|component| Value::Object(component.user_config))
    }

    /// State from a canned `user_config`, as if it came from a refresh.
    pub(crate) fn read<T: ComponentType>(plan: &AttrObject, user_config: Value) -> Result<AttrObject, Diagnostics> {
        let component = Component {
            id: Some("component-1".to_string()),
            component_type: T::API_TYPE.to_string(),
            generation_id: Some(3),
            user_config: match user_config {
                Value::Object(map) => map,
                other => panic!("💀 user_config must be an object, got {other}"),
            },
            ..Component::default()
        };
        ComponentDefinition::of::<T>().to_model(plan, &component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn the_http_destination() -> ComponentDefinition {
        find_definition(ComponentKind::Destination, "http").expect("💀 http destination is registered")
    }

    fn the_plan() -> AttrObject {
        let mut plan: AttrObject = [
            ("pipeline_id".to_string(), AttrValue::string("pipe-1")),
            ("title".to_string(), AttrValue::string("my http")),
            ("inputs".to_string(), AttrValue::strings(["src-1"])),
            ("uri".to_string(), AttrValue::string("https://example.com/ingest")),
            (
                "auth".to_string(),
                AttrValue::object([
                    ("strategy", AttrValue::string("basic")),
                    ("user", AttrValue::string("me")),
                    ("password", AttrValue::string("hunter2")),
                ]),
            ),
        ]
        .into_iter()
        .collect();
        the_http_destination().schema().apply_defaults(&mut plan);
        plan
    }

    #[test]
    fn the_one_where_every_type_name_is_unique_within_its_kind() {
        let mut the_seen = HashSet::new();
        for definition in all_definitions() {
            assert!(
                the_seen.insert((definition.kind, definition.type_name)),
                "💀 {} {} registered twice",
                definition.kind,
                definition.type_name
            );
        }
        assert!(the_seen.len() >= 30, "the registry is suspiciously small: {}", the_seen.len());
    }

    #[test]
    fn the_one_where_every_schema_keeps_its_hands_off_the_base_attributes() {
        for definition in all_definitions() {
            let user_config = definition.user_config_schema();
            for base in base_schema(definition.kind).attributes.keys() {
                assert!(
                    !user_config.attributes.contains_key(base),
                    "💀 {} redeclares base attribute {base}",
                    definition.resource_name()
                );
            }
        }
    }

    #[test]
    fn the_one_where_an_empty_plan_converts_without_panicking_for_every_type() {
        // 🧪 a plan with nothing but defaults must never reach a report_bug panic
        for definition in all_definitions() {
            let mut plan = AttrObject::new();
            plan.insert("pipeline_id".into(), AttrValue::string("p"));
            definition.schema().apply_defaults(&mut plan);
            let _ = definition.from_model(&plan, None);
        }
    }

    #[test]
    fn the_one_where_the_envelope_carries_base_fields_and_prior_ids() -> anyhow::Result<()> {
        let mut the_prior = AttrObject::new();
        the_prior.insert("id".into(), AttrValue::string("dest-9"));
        the_prior.insert("generation_id".into(), AttrValue::int(4));

        let the_component = the_http_destination()
            .from_model(&the_plan(), Some(&the_prior))
            .map_err(anyhow::Error::new)?;

        assert_eq!(the_component.pipeline_id, "pipe-1");
        let the_body = serde_json::to_value(&the_component)?;
        assert_eq!(the_body["id"], "dest-9");
        assert_eq!(the_body["generation_id"], 4);
        assert_eq!(the_body["type"], "http");
        assert_eq!(the_body["inputs"], json!(["src-1"]));
        assert_eq!(the_body["user_config"]["ack_enabled"], true);
        assert!(the_body.get("pipeline_id").is_none(), "pipeline_id lives in the URL");
        Ok(())
    }

    #[test]
    fn the_one_where_redacted_secrets_keep_their_planned_value() -> anyhow::Result<()> {
        let the_plan = the_plan();
        let mut the_component = the_http_destination()
            .from_model(&the_plan, None)
            .map_err(anyhow::Error::new)?;
        the_component.id = Some("dest-1".into());
        the_component.generation_id = Some(1);
        if let Some(Value::Object(auth)) = the_component.user_config.get_mut("auth") {
            auth.remove("password");
        }

        let the_state = the_http_destination()
            .to_model(&the_plan, &the_component)
            .map_err(anyhow::Error::new)?;
        let the_auth = the_state.get_object("auth").expect("💀 auth");
        assert_eq!(the_auth.get_string("password"), Some("hunter2"));
        assert_eq!(the_state.get_string("id"), Some("dest-1"));
        assert_eq!(the_state.get_i64("generation_id"), Some(1));
        Ok(())
    }

    #[test]
    fn the_one_where_kinds_parse_from_the_command_line() -> anyhow::Result<()> {
        assert_eq!("processors".parse::<ComponentKind>()?, ComponentKind::Processor);
        assert!("sprocket".parse::<ComponentKind>().is_err());
        Ok(())
    }
}
