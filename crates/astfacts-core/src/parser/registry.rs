//! Front-end registry for resolving languages by name or file extension.

use std::collections::HashMap;
use std::sync::Arc;

use super::csharp::CSharpFrontEnd;
use super::php::PhpFrontEnd;
use super::traits::FrontEnd;
use super::typescript::TypeScriptFrontEnd;
use crate::config::Config;
use crate::error::FactError;

/// Registry of language front ends.
///
/// Maps namespaces, aliases and file extensions to their front ends.
/// Automatically registers all built-in front ends on creation.
pub struct FrontEndRegistry {
    /// Registration order, for listing.
    front_ends: Vec<Arc<dyn FrontEnd>>,
    /// Namespace and alias to front end mapping.
    names: HashMap<String, Arc<dyn FrontEnd>>,
    /// Extension to front end mapping.
    extensions: HashMap<String, Arc<dyn FrontEnd>>,
    /// Configured per-namespace extension lists.
    overrides: HashMap<String, Vec<String>>,
}

impl FrontEndRegistry {
    /// Create a new registry with all built-in front ends.
    pub fn new() -> Self {
        let mut registry = Self {
            front_ends: Vec::new(),
            names: HashMap::new(),
            extensions: HashMap::new(),
            overrides: HashMap::new(),
        };

        registry.register(Arc::new(CSharpFrontEnd::new()));
        registry.register(Arc::new(PhpFrontEnd::new()));
        registry.register(Arc::new(TypeScriptFrontEnd::new()));

        registry
    }

    /// Registry honouring the `[languages]` extension overrides of `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for (namespace, extensions) in &config.languages {
            registry.override_extensions(namespace, extensions.clone());
        }
        registry
    }

    /// Register a front end under its namespace, aliases and extensions.
    pub fn register(&mut self, front_end: Arc<dyn FrontEnd>) {
        self.names
            .insert(front_end.namespace().to_string(), Arc::clone(&front_end));
        for alias in front_end.aliases() {
            self.names
                .insert(alias.to_lowercase(), Arc::clone(&front_end));
        }
        for ext in front_end.supported_extensions() {
            self.extensions
                .insert(ext.to_lowercase(), Arc::clone(&front_end));
        }
        self.front_ends.push(front_end);
    }

    /// Replace the extensions handled by a namespace.
    ///
    /// Unknown namespaces are ignored.
    pub fn override_extensions(&mut self, namespace: &str, extensions: Vec<String>) {
        let Some(front_end) = self.names.get(namespace).cloned() else {
            return;
        };
        self.extensions
            .retain(|_, existing| existing.namespace() != front_end.namespace());

        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        for ext in &extensions {
            self.extensions.insert(ext.clone(), Arc::clone(&front_end));
        }
        self.overrides
            .insert(front_end.namespace().to_string(), extensions);
    }

    /// Front end by namespace or alias, case-insensitively.
    pub fn front_end(&self, name: &str) -> Result<Arc<dyn FrontEnd>, FactError> {
        self.names
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| FactError::UnknownLanguage(name.to_string()))
    }

    /// Get a front end for the given file extension.
    pub fn front_end_for_extension(&self, extension: &str) -> Option<Arc<dyn FrontEnd>> {
        self.extensions.get(&extension.to_lowercase()).cloned()
    }

    /// Get a front end for the given file path.
    pub fn front_end_for_path(&self, path: &str) -> Option<Arc<dyn FrontEnd>> {
        std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.front_end_for_extension(ext))
    }

    /// Extensions a namespace handles, overrides included.
    pub fn extensions_for(&self, namespace: &str) -> Vec<String> {
        match self.overrides.get(namespace) {
            Some(extensions) => extensions.clone(),
            None => self
                .names
                .get(namespace)
                .map(|f| f.supported_extensions().iter().map(|e| e.to_string()).collect())
                .unwrap_or_default(),
        }
    }

    /// List all registered front ends as `(namespace, language, extensions)`.
    pub fn list(&self) -> Vec<(&'static str, &'static str, Vec<String>)> {
        self.front_ends
            .iter()
            .map(|f| (f.namespace(), f.language_name(), self.extensions_for(f.namespace())))
            .collect()
    }
}

impl Default for FrontEndRegistry {
    fn default() -> Self {
        Self::new()
    }
}
