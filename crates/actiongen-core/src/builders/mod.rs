//! Context builder traits and adapters for language-specific codegen.
pub mod csharp;

use crate::schema::{ActionDefinition, ActionSchema};
use crate::Error;
use serde_json::Value as JsonValue;

/// Trait for converting an ActionDefinition into a language-specific template context.
pub trait ActionContextBuilder {
    fn build(&self, action: &ActionDefinition) -> crate::Result<JsonValue>;
}

pub struct ActionContext;

impl ActionContext {
    /// Transform every action into a language-specific context
    /// The returned contexts keep schema order, which is the emitted order
    pub fn transform_actions(
        language: &str,
        schema: &ActionSchema,
    ) -> crate::Result<Vec<JsonValue>> {
        let builder = Self::get_builder(language)?;
        schema
            .actions
            .iter()
            .map(|action| builder.build(action))
            .collect()
    }

    pub fn get_builder(language: &str) -> crate::Result<Box<dyn ActionContextBuilder>> {
        match language.to_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(Box::new(csharp::CSharpActionContextBuilder)),
            other => Err(Error::template(format!(
                "No context builder for template language '{other}'"
            ))),
        }
    }
}
