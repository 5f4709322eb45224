use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use mdsite_core::SiteConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "mdsite.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone)]
pub struct MdsiteConfig {
    /// Site configuration handed to mdsite-core
    pub site: SiteConfig,
    /// `[serve]` table, only used by the serve command
    pub serve: ServeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServeConfig {
    /// Host for dev server
    pub host: String,
    /// Port for dev server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

#[derive(Serialize)]
struct Defaults {
    #[serde(flatten)]
    site: SiteConfig,
    serve: ServeConfig,
}

impl MdsiteConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (MDSITE_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .unwrap_or(None)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Defaults {
            site: SiteConfig::default(),
            serve: ServeConfig::default(),
        };
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            tracing::debug!("Reading configuration from {}", config_file);
            builder = builder.add_source(File::new(&config_file, FileFormat::Toml));
        }

        // 3. Add environment variables with MDSITE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("MDSITE")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = HashMap::new();

        let string_args = [
            ("input", "input_dir"),
            ("output", "output_dir"),
            ("nav", "navigation"),
            ("theme", "theme_dir"),
            ("host", "serve.host"),
        ];
        // Only override with CLI args that are actually defined for this command
        for (arg, key) in string_args {
            if let Some(value) = args.try_get_one::<String>(arg).unwrap_or(None) {
                cli_overrides.insert(key.to_string(), value.clone());
            }
        }
        if let Some(port) = args.try_get_one::<u16>("port").unwrap_or(None) {
            cli_overrides.insert("serve.port".to_string(), port.to_string());
        }
        if args.try_get_one::<bool>("open").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("serve.open".to_string(), "true".to_string());
        }
        if args.try_get_one::<bool>("no-clean").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("clean".to_string(), "false".to_string());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(ConfigBuilder::try_from(&cli_overrides)?);
        }

        // Build and deserialize
        let config = builder.build()?;
        let serve: ServeConfig = config.get("serve")?;
        let site: SiteConfig = config.try_deserialize()?;

        Ok(Self { site, serve })
    }
}
