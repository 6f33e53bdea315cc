//! 🧵 The resource lifecycle: plan, create, read, update, delete.
//!
//! 🎬 *[a plan enters. `from_model` turns it into a request. the API answers. `to_model` turns the
//! answer into state. the state is saved. nobody speaks of the diagnostics unless there are errors.]*
//!
//! [`ComponentResource`] is one component type bound to one API. Every operation returns an
//! [`Outcome`]: the new state (or `None` when there is nothing to keep) plus whatever
//! diagnostics came up along the way. API failures are diagnostics too, never panics.

use tracing::{debug, info, warn};

use crate::client::PipelineApi;
use crate::common::AttrObject;
use crate::components::{Component, ComponentDefinition};
use crate::convert::AttrObjectExt;
use crate::diagnostics::Diagnostics;

/// 📦 What an operation left behind.
#[derive(Debug, Default)]
pub struct Outcome {
    /// `None` after a delete, after a failed create, or when a read finds the component gone.
    pub state: Option<AttrObject>,
    pub diagnostics: Diagnostics,
}

impl Outcome {
    fn failed(diagnostics: Diagnostics) -> Self {
        Self { state: None, diagnostics }
    }

    fn from_conversion(result: Result<AttrObject, Diagnostics>) -> Self {
        match result {
            Ok(state) => Self {
                state: Some(state),
                diagnostics: Diagnostics::new(),
            },
            Err(diagnostics) => Self::failed(diagnostics),
        }
    }
}

/// 🧩 One component type, wired to an API.
#[derive(Debug)]
pub struct ComponentResource<A> {
    pub definition: ComponentDefinition,
    pub api: A,
}

impl<A: PipelineApi> ComponentResource<A> {
    pub fn new(definition: ComponentDefinition, api: A) -> Self {
        Self { definition, api }
    }

    /// 💀 The diagnostic for a failed API call.
    fn api_error(&self, action: &str, error: &anyhow::Error) -> Diagnostics {
        let mut diags = Diagnostics::new();
        diags.add_error(
            format!("Error {action} {} {}", self.definition.type_name, self.definition.kind),
            format!("{error:#}"),
        );
        diags
    }

    /// 📐 Fill defaults into `config` and check it, including the cross-field rules
    /// only the converter knows about. The returned plan is what `create`/`update` expect.
    pub fn plan(&self, config: &AttrObject) -> (AttrObject, Diagnostics) {
        let schema = self.definition.schema();
        let mut plan = config.clone();
        schema.apply_defaults(&mut plan);
        let mut diags = schema.validate(&plan);
        if !diags.has_error() {
            if let Err(conversion) = self.definition.from_model(&plan, None) {
                diags.extend(conversion);
            }
        }
        debug!(
            "📐 Planned {} with {} diagnostic(s)",
            self.definition.resource_name(),
            diags.len()
        );
        (plan, diags)
    }

    /// 🚧 Schema check ahead of conversion. `from_model` trusts enum values to be known.
    fn checked(&self, plan: &AttrObject) -> Result<(), Diagnostics> {
        let diags = self.definition.schema().validate(plan);
        if diags.has_error() {
            warn!("🚧 Refusing an unvalidated {} plan", self.definition.resource_name());
            return Err(diags);
        }
        Ok(())
    }

    /// 🚀 Create from a plan. Plans that skipped [`Self::plan`] are validated here first.
    pub async fn create(&self, plan: &AttrObject) -> Outcome {
        if let Err(diags) = self.checked(plan) {
            return Outcome::failed(diags);
        }
        let component = match self.definition.from_model(plan, None) {
            Ok(component) => component,
            Err(diags) => return Outcome::failed(diags),
        };
        info!("🚀 Creating {} in pipeline {}", self.definition.resource_name(), component.pipeline_id);
        match self.api.create_component(self.definition.kind, &component).await {
            Ok(created) => Outcome::from_conversion(self.definition.to_model(plan, &created)),
            Err(error) => Outcome::failed(self.api_error("creating", &error)),
        }
    }

    /// 🔍 Refresh `state` from the API. A component that no longer exists yields no state and no error.
    pub async fn read(&self, state: &AttrObject) -> Outcome {
        let Some((pipeline_id, id)) = self.address(state) else {
            let mut diags = Diagnostics::new();
            diags.add_error(
                format!("Error reading {} {}", self.definition.type_name, self.definition.kind),
                "The state has no pipeline_id or id to read from.",
            );
            return Outcome::failed(diags);
        };
        match self.api.get_component(self.definition.kind, pipeline_id, id).await {
            Ok(Some(component)) => Outcome::from_conversion(self.definition.to_model(state, &component)),
            Ok(None) => {
                warn!("🕳️ {} {id} is gone, dropping it from state", self.definition.resource_name());
                Outcome::default()
            }
            Err(error) => Outcome::failed(self.api_error("reading", &error)),
        }
    }

    pub async fn update(&self, plan: &AttrObject, prior_state: &AttrObject) -> Outcome {
        if let Err(diags) = self.checked(plan) {
            return Outcome {
                state: Some(prior_state.clone()),
                diagnostics: diags,
            };
        }
        let component: Component = match self.definition.from_model(plan, Some(prior_state)) {
            Ok(component) => component,
            Err(diags) => return Outcome::failed(diags),
        };
        info!(
            "🔄 Updating {} {}",
            self.definition.resource_name(),
            component.id.as_deref().unwrap_or("<no id>")
        );
        match self.api.update_component(self.definition.kind, &component).await {
            Ok(updated) => Outcome::from_conversion(self.definition.to_model(plan, &updated)),
            Err(error) => Outcome {
                state: Some(prior_state.clone()),
                diagnostics: self.api_error("updating", &error),
            },
        }
    }

    pub async fn delete(&self, state: &AttrObject) -> Outcome {
        let Some((pipeline_id, id)) = self.address(state) else {
            debug!("🗑️ Nothing to delete, the state was never created");
            return Outcome::default();
        };
        info!("🗑️ Deleting {} {id}", self.definition.resource_name());
        match self.api.delete_component(self.definition.kind, pipeline_id, id).await {
            Ok(()) => Outcome::default(),
            Err(error) => Outcome {
                state: Some(state.clone()),
                diagnostics: self.api_error("deleting", &error),
            },
        }
    }

    fn address<'s>(&self, state: &'s AttrObject) -> Option<(&'s str, &'s str)> {
        Some((state.get_string("pipeline_id")?, state.get_string("id")?))
    }
}
