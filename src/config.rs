//! Tool configuration for restyle.
//!
//! Configuration lives in an optional `.restyle.yaml` at the repository root.
//! Every field has a default so the file may be absent entirely; a present
//! but malformed file is an environment error (exit code 2).

use crate::error::{RestyleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name, relative to the repository root.
pub const CONFIG_FILE_NAME: &str = ".restyle.yaml";

/// Tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sentinel phrase identifying the style-switch commit on the target
    /// branch.
    #[serde(default = "default_style_switch_subject")]
    pub style_switch_subject: String,

    /// Formatter command line (parsed with shell quoting rules). The style
    /// configuration file and the file list are appended per invocation.
    #[serde(default = "default_format_command")]
    pub format_command: String,

    /// Style configuration file, relative to the repository root.
    #[serde(default = "default_format_config")]
    pub format_config: String,

    /// Exact version string the formatter must report.
    #[serde(default = "default_format_version")]
    pub format_version: String,

    /// When set, the target branch is resolved against the remote whose URL
    /// contains this fragment; when unset, the target branch is used as
    /// given.
    #[serde(default)]
    pub upstream_url: Option<String>,

    /// Extensions (without the dot) that make a path a source candidate.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Test-suite directory whose files are source candidates despite their
    /// extension.
    #[serde(default = "default_test_suite_dir")]
    pub test_suite_dir: String,

    /// Extension of source candidates inside the test-suite directory.
    #[serde(default = "default_test_suite_extension")]
    pub test_suite_extension: String,

    /// Data-file directory whose files are source candidates despite their
    /// extension.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Extension of source candidates inside the data-file directory.
    #[serde(default = "default_data_extension")]
    pub data_extension: String,

    /// First path segment of the vendored third-party tree; everything under
    /// it is exempt from restyling.
    #[serde(default = "default_vendored_dir")]
    pub vendored_dir: String,

    /// Exact paths known to be machine-generated at the style epoch.
    #[serde(default = "default_generated_paths")]
    pub generated_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            style_switch_subject: default_style_switch_subject(),
            format_command: default_format_command(),
            format_config: default_format_config(),
            format_version: default_format_version(),
            upstream_url: None,
            source_extensions: default_source_extensions(),
            test_suite_dir: default_test_suite_dir(),
            test_suite_extension: default_test_suite_extension(),
            data_dir: default_data_dir(),
            data_extension: default_data_extension(),
            vendored_dir: default_vendored_dir(),
            generated_paths: default_generated_paths(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RestyleError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            RestyleError::Config(format!("failed to parse '{}': {}", path.display(), e))
        })
    }

    /// Load the configuration from the repository root, falling back to
    /// defaults when no config file exists.
    pub fn load_or_default<P: AsRef<Path>>(repo_root: P) -> Result<Self> {
        let path = repo_root.as_ref().join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_style_switch_subject() -> String {
    "Switch to the new code style".to_string()
}

fn default_format_command() -> String {
    "uncrustify --replace --no-backup".to_string()
}

fn default_format_config() -> String {
    ".uncrustify.cfg".to_string()
}

fn default_format_version() -> String {
    "Uncrustify-0.78.1".to_string()
}

fn default_source_extensions() -> Vec<String> {
    ["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_test_suite_dir() -> String {
    "tests".to_string()
}

fn default_test_suite_extension() -> String {
    "inc".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_data_extension() -> String {
    "def".to_string()
}

fn default_vendored_dir() -> String {
    "third_party".to_string()
}

fn default_generated_paths() -> Vec<String> {
    // Generator outputs checked in at the style epoch; reformatting them
    // would be clobbered by the next regeneration.
    [
        "src/parser/parser.cpp",
        "src/parser/parser.hpp",
        "src/scanner/scanner.cpp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
