use anyhow::Result;
use config::{Config as ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};

/// Build settings, resolved from defaults and `DOCSMITH_*` environment
/// variables. There are no CLI flags; the environment is the whole surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Input root, relative to the invocation directory. Must contain an
    /// `md/` subdirectory and may contain `assets/`.
    pub docs_in: String,
    /// Output root, relative to the invocation directory.
    pub docs_out: String,
    /// Promote asset-pipeline failures from logged to fatal.
    pub strict_assets: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_in: "docs".to_string(),
            docs_out: "docs_out".to_string(),
            strict_assets: false,
        }
    }
}

impl BuildConfig {
    /// Load configuration with cascading precedence:
    /// 1. Environment variables (DOCSMITH_*)
    /// 2. Defaults
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        builder = builder.add_source(config::Config::try_from(&BuildConfig::default())?);

        // 2. Override with environment variables with DOCSMITH_ prefix
        builder = builder.add_source(Environment::with_prefix("DOCSMITH").prefix_separator("_"));

        let config = builder.build()?;
        let build_config: BuildConfig = config.try_deserialize()?;

        Ok(build_config)
    }
}
