//! Configuration management for the Verilog format language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional `config.toml` file
//! - Settings pushed or pulled from the editor (`verilog-format.*`)

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration section owned by this server in the editor's settings
pub const SETTINGS_SECTION: &str = "verilog-format";

/// Command-line arguments for the Verilog format language server
#[derive(Debug, Parser)]
#[command(name = "verilog-format-ls")]
#[command(about = "Language server that formats Verilog through verilog-format")]
#[command(version)]
pub struct Args {
    /// Path to the verilog-format executable
    #[arg(long, help = "verilog-format executable (default: looked up on PATH)")]
    pub formatter_path: Option<PathBuf>,

    /// Global settings file passed to the formatter
    #[arg(long, help = "Global .properties settings file for verilog-format")]
    pub settings: Option<PathBuf>,

    /// Directory for staged temporary files
    #[arg(long, help = "Directory for temporary files (default: system temp dir)")]
    pub temp_dir: Option<PathBuf>,

    /// Configuration file to load instead of the user default
    #[arg(long, help = "Path to a config.toml file")]
    pub config: Option<PathBuf>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Formatter options as seen by a single format request.
///
/// Each field is optional: an unset executable means "look it up on PATH",
/// an unset settings path means "let the formatter use its defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormatterSettings {
    #[serde(default, deserialize_with = "non_empty_path")]
    pub path: Option<PathBuf>,
    #[serde(default, deserialize_with = "non_empty_path")]
    pub settings: Option<PathBuf>,
}

impl FormatterSettings {
    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: &FormatterSettings) -> FormatterSettings {
        FormatterSettings {
            path: self.path.or_else(|| fallback.path.clone()),
            settings: self.settings.or_else(|| fallback.settings.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_none() && self.settings.is_none()
    }

    /// Read editor settings in any of the shapes clients send them.
    ///
    /// Accepts the nested form `{"verilog-format": {"path": ..}}`, the dotted
    /// form `{"verilog-format.path": ..}`, and the bare section
    /// `{"path": .., "settings": ..}` returned by `workspace/configuration`.
    pub fn from_client_value(value: &Value) -> FormatterSettings {
        let Some(object) = value.as_object() else {
            return FormatterSettings::default();
        };

        if let Some(section) = object.get(SETTINGS_SECTION) {
            return Self::from_section(section);
        }

        let dotted = FormatterSettings {
            path: object
                .get(&format!("{SETTINGS_SECTION}.path"))
                .and_then(json_path),
            settings: object
                .get(&format!("{SETTINGS_SECTION}.settings"))
                .and_then(json_path),
        };
        if !dotted.is_empty() {
            return dotted;
        }

        Self::from_section(value)
    }

    fn from_section(section: &Value) -> FormatterSettings {
        match serde_json::from_value::<FormatterSettings>(section.clone()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed {} settings: {}", SETTINGS_SECTION, e);
                FormatterSettings::default()
            }
        }
    }
}

fn json_path(value: &Value) -> Option<PathBuf> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn non_empty_path<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(PathBuf::from))
}

/// On-disk configuration file layout
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub formatter: FormatterSettings,
    pub temp_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Combined configuration from all server-side sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Formatter defaults from CLI and config file; editor settings win over these
    pub formatter: FormatterSettings,
    /// Where staged files are created
    pub temp_dir: Option<PathBuf>,
    /// Config file that was loaded, if any
    pub config_file: Option<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        // An explicit --config must exist; the user default is optional
        let (file, config_file) = match args.config {
            Some(path) => (ConfigFile::load(&path)?, Some(path)),
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => (ConfigFile::load(&path)?, Some(path)),
                None => (ConfigFile::default(), None),
            },
        };

        let cli = FormatterSettings {
            path: args.formatter_path,
            settings: args.settings,
        };

        Ok(Config {
            formatter: cli.or(&file.formatter),
            temp_dir: args.temp_dir.or(file.temp_dir),
            config_file,
            log_level: args.log_level,
        })
    }

    /// Settings for one request: editor values first, then server defaults
    pub fn effective_settings(&self, client: FormatterSettings) -> FormatterSettings {
        client.or(&self.formatter)
    }
}

/// `<config dir>/verilog-format-ls/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("verilog-format-ls").join("config.toml"))
}
