//! Name-keyed registry resolving tool descriptors into cached handles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use loom_config::{ParamMap, ToolDescriptor};
use tracing::{debug, warn};

use crate::builtin::{FileLoader, Summarizer, TextToMarkdown};
use crate::tool::{Tool, ToolError, ToolHandle, ToolResult};

/// Registry that lazily constructs tools from descriptors and caches them by
/// name.
///
/// Construction parameters are fixed at first resolution: a call that hits the
/// cache ignores any params it supplies (the registry logs a warning so the
/// discarded override is observable).
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    cache: Mutex<HashMap<String, ToolHandle>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.lock().expect("tool cache poisoned");
        let constructed: Vec<_> = cache.keys().cloned().collect();
        f.debug_struct("ToolRegistry")
            .field("declared", &self.descriptors.len())
            .field("constructed", &constructed)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates a registry over the supplied descriptors.
    #[must_use]
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Self {
        Self {
            descriptors,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the declared tool descriptors in document order.
    #[must_use]
    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Resolves a tool name to a live handle, constructing it on first use.
    ///
    /// `params` override the descriptor defaults, but only at construction
    /// time; they are ignored on a cache hit.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when no descriptor matches,
    /// [`ToolError::Unsupported`] when the descriptor names a tool without an
    /// implementation, or [`ToolError::InvalidParams`] when construction
    /// parameters fail validation.
    ///
    /// # Panics
    ///
    /// Panics if the internal cache lock is poisoned.
    pub fn get(&self, name: &str, params: Option<&ParamMap>) -> ToolResult<ToolHandle> {
        let mut cache = self.cache.lock().expect("tool cache poisoned");

        if let Some(handle) = cache.get(name) {
            if params.is_some_and(|params| !params.is_empty()) {
                warn!(
                    tool = name,
                    "tool already constructed; supplied parameters are ignored"
                );
            }
            return Ok(handle.clone());
        }

        let descriptor = self
            .descriptors
            .iter()
            .find(|descriptor| descriptor.name == name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_owned(),
            })?;

        let merged = merge_params(&descriptor.params, params);
        let executor = build_builtin(&descriptor.name, &merged)?;
        let handle = ToolHandle::new(
            descriptor.name.as_str(),
            descriptor.description.as_str(),
            descriptor.return_direct,
            executor,
        );

        debug!(tool = name, "tool constructed and cached");
        cache.insert(name.to_owned(), handle.clone());
        Ok(handle)
    }
}

fn merge_params(defaults: &ParamMap, overrides: Option<&ParamMap>) -> ParamMap {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn build_builtin(name: &str, params: &ParamMap) -> ToolResult<Arc<dyn Tool>> {
    match name {
        "summarizer" => Ok(Arc::new(Summarizer::from_params(params)?)),
        "text_to_markdown" => Ok(Arc::new(TextToMarkdown)),
        "file_loader" => Ok(Arc::new(FileLoader::from_params(params)?)),
        _ => Err(ToolError::Unsupported {
            name: name.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptors() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "summarizer".into(),
                description: "Summarizes text".into(),
                return_direct: false,
                params: json!({ "max_length": 50 }).as_object().cloned().unwrap(),
            },
            ToolDescriptor {
                name: "text_to_markdown".into(),
                description: "Converts plain text into markdown format".into(),
                ..ToolDescriptor::default()
            },
            ToolDescriptor {
                name: "web_search".into(),
                description: "Search the web for information".into(),
                ..ToolDescriptor::default()
            },
        ]
    }

    #[test]
    fn unknown_tool_errors() {
        let registry = ToolRegistry::new(descriptors());
        let err = registry.get("missing", None).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool { name } if name == "missing"));
    }

    #[test]
    fn declared_but_unimplemented_tool_errors() {
        let registry = ToolRegistry::new(descriptors());
        let err = registry.get("web_search", None).unwrap_err();
        assert!(matches!(err, ToolError::Unsupported { name } if name == "web_search"));
    }

    #[test]
    fn caches_by_name() {
        let registry = ToolRegistry::new(descriptors());
        let first = registry.get("summarizer", None).unwrap();
        let second = registry.get("summarizer", None).unwrap();
        assert_eq!(first.name(), second.name());
        assert_eq!(registry.cache.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn params_are_ignored_after_first_construction() {
        // Regression test: a cache hit keeps the originally constructed
        // parameters, whatever the caller passes.
        let registry = ToolRegistry::new(descriptors());

        let tight = json!({ "max_length": 5 }).as_object().cloned().unwrap();
        let first = registry.get("summarizer", Some(&tight)).unwrap();

        let wide = json!({ "max_length": 5000 }).as_object().cloned().unwrap();
        let second = registry.get("summarizer", Some(&wide)).unwrap();

        let input = "One two three four five. Six seven eight nine ten.";
        let out_first = first.run(input).await.unwrap();
        let out_second = second.run(input).await.unwrap();

        assert_eq!(out_first, out_second);
        assert!(out_second.split_whitespace().count() <= 5 + 1);
    }

    #[test]
    fn workflow_overrides_apply_at_construction() {
        let registry = ToolRegistry::new(descriptors());
        let overrides = json!({ "max_length": 200 }).as_object().cloned().unwrap();
        let handle = registry.get("summarizer", Some(&overrides)).unwrap();
        assert_eq!(handle.name(), "summarizer");
    }

    #[test]
    fn catalog_preserves_document_order() {
        let registry = ToolRegistry::new(descriptors());
        let names: Vec<_> = registry
            .catalog()
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect();
        assert_eq!(names, ["summarizer", "text_to_markdown", "web_search"]);
    }
}
