//! Engine construction options.

use flowdeck_common::{Config, ModuleDescriptor, Plugins, SchemaExtension};

/// Options captured at engine construction.
///
/// Kept introspectable so plugin-acceptance policies can be verified
/// against the constructed instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolkitOptions {
    pub modules: Vec<ModuleDescriptor>,
    pub extensions: Vec<SchemaExtension>,
    pub config: Config,
}

impl ToolkitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward host-supplied plugin modules and schema extensions.
    pub fn with_plugins(mut self, plugins: &Plugins) -> Self {
        self.modules.extend(plugins.modules.iter().cloned());
        self.extensions.extend(plugins.extensions.iter().cloned());
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// True when any plugin-contributed module or extension is present.
    pub fn has_injected_modules(&self) -> bool {
        !self.modules.is_empty() || !self.extensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_carry_no_modules() {
        assert!(!ToolkitOptions::new().has_injected_modules());
    }

    #[test]
    fn test_with_plugins_forwards_modules_and_extensions() {
        let plugins = Plugins {
            modules: vec![ModuleDescriptor::new("minimap")],
            extensions: vec![SchemaExtension::new("ex", "http://example.com")],
        };
        let options = ToolkitOptions::new().with_plugins(&plugins);

        assert!(options.has_injected_modules());
        assert_eq!(options.modules.len(), 1);
        assert_eq!(options.extensions.len(), 1);
    }
}
