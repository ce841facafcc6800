//! actiongen Core Library
//!
//! This library provides the core functionality for generating C# action
//! request/response messages and the matching action enumeration from a YAML
//! action schema.

pub mod builders;
pub mod config;
pub mod error;
pub mod generate;
pub mod location;
pub mod manifest;
pub mod naming;
pub mod schema;
pub mod templates;
pub mod type_map;

pub use crate::{
    config::Config,
    error::{Error, Result},
    generate::{
        check, generate, render_documents, AlwaysConfirm, DocumentKind, GeneratedDocument,
        GeneratedDocuments, GenerationReport, StaleDocument, WriteGate,
    },
    location::OutputLocation,
    naming::{normalize, NamingConvention},
    schema::{ActionDefinition, ActionSchema, FieldDefinition},
    templates::{TemplateDir, TemplateKind, TemplateManager, TemplateOptions},
    type_map::{TargetType, TypeRegistry},
};
