//! Display labels for definitions

use std::path::Path;

/// Where a definition was found, as reported by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSite {
    pub name: String,
    /// Zero-based line of the definition name
    pub line: usize,
    /// Zero-based column of the definition name, in characters
    pub column: usize,
    /// Names of enclosing functions, outermost first
    pub enclosing: Vec<String>,
}

/// Builds the human-readable context shown next to a search result.
///
/// Top-level definitions are labelled with their file name; nested ones
/// append the enclosing function chain: `graphics.R > outer > inner`.
#[derive(Debug, Clone)]
pub struct ContextResolver {
    separator: &'static str,
}

impl Default for ContextResolver {
    fn default() -> Self {
        Self { separator: " > " }
    }
}

impl ContextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, path: &Path, site: &DefinitionSite) -> String {
        let file_label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut parts: Vec<&str> = Vec::with_capacity(site.enclosing.len() + 1);
        if !file_label.is_empty() {
            parts.push(&file_label);
        }
        parts.extend(site.enclosing.iter().map(String::as_str));

        parts.join(self.separator)
    }
}
