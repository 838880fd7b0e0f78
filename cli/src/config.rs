//! Configuration file loader with multi-source merging

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings the CLI feeds into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Directories appended to the interpreter's module search path.
    pub script_paths: Vec<PathBuf>,
    /// Nested table levels to materialize before cutting off.
    pub max_depth: u32,
    /// Escalate stack-size checks to hard errors.
    pub strict: bool,
    /// Keep function-valued table entries as opaque handles.
    pub include_functions: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            script_paths: Vec::new(),
            max_depth: 8,
            strict: true,
            include_functions: false,
        }
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `LUALINK_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./lualink.toml` or `./.lualink.toml`
    /// 4. Global: `~/.config/lualink/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        for filename in &["lualink.toml", ".lualink.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("LUALINK_"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lualink").join("config.toml"))
    }
}
