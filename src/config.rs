//! Configuration (§6's knobs).
//!
//! A plain struct with builder-style `&mut self -> &mut Self` setters,
//! holding the two settings §6 names. `import_paths` is never read by
//! anything in this crate — it exists so a caller has one place to
//! configure both the external import resolver and the validation core
//! together.

/// Validation-time configuration.
///
/// ```
/// use proto3_descriptor_core::Config;
///
/// let mut config = Config::new();
/// config.generate_source_info(false).import_path("protos/");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) generate_source_info: bool,
    pub(crate) import_paths: Vec<String>,
}

impl Config {
    /// Creates a new configuration with default options: source info
    /// generation on, no import search paths.
    pub fn new() -> Config {
        Config::default()
    }

    /// Enables or disables `SourceCodeInfo` generation on the descriptor
    /// builder's output (§4.9.6). Defaults to `true`.
    pub fn generate_source_info(&mut self, enabled: bool) -> &mut Self {
        self.generate_source_info = enabled;
        self
    }

    /// Adds a single search path an external import resolver should
    /// consult when locating a file named in an `import` statement. This
    /// crate never reads the filesystem itself; the path is only carried
    /// here so a caller can configure resolver and core together.
    pub fn import_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.import_paths.push(path.into());
        self
    }

    /// Replaces the full list of import search paths.
    pub fn import_paths<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.import_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config { generate_source_info: true, import_paths: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_generate_source_info() {
        let config = Config::new();
        assert!(config.generate_source_info);
        assert!(config.import_paths.is_empty());
    }

    #[test]
    fn builder_setters_chain() {
        let mut config = Config::new();
        config.generate_source_info(false).import_path("a").import_path("b");
        assert!(!config.generate_source_info);
        assert_eq!(config.import_paths, vec!["a".to_string(), "b".to_string()]);
    }
}
