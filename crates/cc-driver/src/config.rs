//! Runtime configuration shared by all four binaries: node-buffer
//! capacity, diagnostic caps, and the interpreter's resource limits. Loaded
//! from an optional TOML file and falling back to defaults that match each
//! component's own `Default` impl, so an absent `--config` behaves
//! identically to never having heard of the file.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VmLimits {
    pub temp_capacity: usize,
    pub var_capacity: usize,
    pub heap_size: usize,
    pub max_call_depth: usize,
    pub max_steps: u64,
}

impl Default for VmLimits {
    fn default() -> Self {
        let defaults = cc_tac::VmConfig::default();
        Self {
            temp_capacity: defaults.temp_capacity,
            var_capacity: defaults.var_capacity,
            heap_size: defaults.heap_size,
            max_call_depth: defaults.max_call_depth,
            max_steps: defaults.max_steps,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub hb_capacity: usize,
    pub max_errors: usize,
    pub max_warnings: usize,
    pub vm: VmLimits,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let errors = cc_diag::ErrorConfig::default();
        Self {
            hb_capacity: 64,
            max_errors: errors.max_errors,
            max_warnings: errors.max_warnings,
            vm: VmLimits::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load from `path` if given, otherwise the defaults above. A present
    /// path that fails to read or parse is an error; an absent one never is.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn vm_config(&self) -> cc_tac::VmConfig {
        cc_tac::VmConfig {
            temp_capacity: self.vm.temp_capacity,
            var_capacity: self.vm.var_capacity,
            heap_size: self.vm.heap_size,
            max_call_depth: self.vm.max_call_depth,
            max_steps: self.vm.max_steps,
        }
    }

    pub fn error_config(&self) -> cc_diag::ErrorConfig {
        cc_diag::ErrorConfig {
            max_errors: self.max_errors,
            max_warnings: self.max_warnings,
            output_stream: Box::new(std::io::stderr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_path_yields_defaults() {
        let config = RuntimeConfig::load(None).unwrap();
        assert_eq!(config.hb_capacity, 64);
        assert_eq!(config.vm.max_steps, 1_000_000);
    }

    #[test]
    fn partial_toml_fills_the_rest_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cc.toml");
        std::fs::write(&path, "hb_capacity = 512\n[vm]\nmax_steps = 10\n").unwrap();
        let config = RuntimeConfig::load(Some(&path)).unwrap();
        assert_eq!(config.hb_capacity, 512);
        assert_eq!(config.vm.max_steps, 10);
        assert_eq!(config.vm.temp_capacity, 256);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(RuntimeConfig::load(Some(&path)).is_err());
    }
}
