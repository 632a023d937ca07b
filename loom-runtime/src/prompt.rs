//! Minimal prompt templates with `{{variable}}` substitution.

use std::collections::HashMap;
use std::fmt;

/// A prompt template with simple `{{variable}}` placeholders.
///
/// Unset variables render as the empty string; workflows that need hard
/// failures on missing values should validate before rendering.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    template: String,
    variables: HashMap<String, String>,
}

impl PromptTemplate {
    /// Creates a new template with the supplied text.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            variables: HashMap::new(),
        }
    }

    /// Sets a default value for a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Renders the template with the stored variables.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with(&HashMap::new())
    }

    /// Renders the template; runtime variables override stored defaults.
    #[must_use]
    pub fn render_with(&self, runtime_vars: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for name in extract_variable_refs(&self.template) {
            let value = runtime_vars
                .get(&name)
                .or_else(|| self.variables.get(&name))
                .map_or("", String::as_str);
            let placeholder = format!("{{{{{name}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn extract_variable_refs(template: &str) -> Vec<String> {
    let mut vars = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        let name = rest[open + 2..open + 2 + close].trim();
        if !name.is_empty() && !vars.iter().any(|existing| existing == name) {
            vars.push(name.to_owned());
        }
        rest = &rest[open + 2 + close + 2..];
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_stored_variables() {
        let template = PromptTemplate::new("Hello {{name}}!").with_variable("name", "World");
        assert_eq!(template.render(), "Hello World!");
    }

    #[test]
    fn runtime_variables_override_defaults() {
        let template = PromptTemplate::new("Hello {{name}}!").with_variable("name", "World");
        let mut runtime = HashMap::new();
        runtime.insert("name".to_owned(), "Alice".to_owned());
        assert_eq!(template.render_with(&runtime), "Hello Alice!");
    }

    #[test]
    fn unset_variables_render_empty() {
        let template = PromptTemplate::new("A{{missing}}B");
        assert_eq!(template.render(), "AB");
    }

    #[test]
    fn extracts_distinct_variable_refs() {
        let vars = extract_variable_refs("{{a}} {{b}} {{a}}");
        assert_eq!(vars, ["a", "b"]);
    }
}
