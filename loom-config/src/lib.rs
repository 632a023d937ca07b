//! Descriptor schemas and configuration loading for the textloom runtime.
//!
//! Models, tools, and workflows are described by declarative YAML documents.
//! [`ConfigStore`] loads and validates all three collections once, at startup;
//! the runtime registries resolve live handles from the validated descriptors.

#![warn(missing_docs, clippy::pedantic)]

mod descriptor;
mod error;
mod store;

pub use descriptor::{
    ModelDescriptor, ParamMap, ProviderKind, ToolDescriptor, ToolRef, WorkflowDescriptor,
};
pub use error::{ConfigError, ConfigResult};
pub use store::ConfigStore;
