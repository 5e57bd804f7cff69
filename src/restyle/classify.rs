//! Path classification for the restyle engine.
//!
//! Classification is pure and order-independent: every path maps to exactly
//! one disposition, derived from path shape alone. The rules are compiled
//! once from the configuration and reused for the whole run.

use crate::config::Config;
use crate::error::{RestyleError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// What may be done to a path during restyling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDisposition {
    /// A source file the formatter should touch.
    Styleable,
    /// Lives under the vendored third-party tree; never reformatted.
    ExemptThirdParty,
    /// Machine-generated at the style epoch; reformatting would be clobbered
    /// by the next regeneration.
    ExemptGenerated,
    /// Not a source file at all.
    NotSource,
}

impl fmt::Display for FileDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileDisposition::Styleable => "styleable",
            FileDisposition::ExemptThirdParty => "exempt:3rdparty",
            FileDisposition::ExemptGenerated => "exempt:generated",
            FileDisposition::NotSource => "not-source",
        };
        f.write_str(label)
    }
}

/// Compiled classification rules.
#[derive(Debug)]
pub struct Classifier {
    extensions: BTreeSet<String>,
    location_rules: GlobSet,
    vendored_dir: String,
    generated: BTreeSet<String>,
}

impl Classifier {
    /// Compile the classification rules from the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let rules = [
            (&config.test_suite_dir, &config.test_suite_extension),
            (&config.data_dir, &config.data_extension),
        ];
        for (dir, ext) in rules {
            // Both forms so files directly inside the directory match too.
            for pattern in [format!("{dir}/*.{ext}"), format!("{dir}/**/*.{ext}")] {
                let glob = Glob::new(&pattern).map_err(|e| {
                    RestyleError::Config(format!("invalid location rule '{}': {}", pattern, e))
                })?;
                builder.add(glob);
            }
        }
        let location_rules = builder.build().map_err(|e| {
            RestyleError::Config(format!("failed to compile location rules: {}", e))
        })?;

        Ok(Self {
            extensions: config.source_extensions.iter().cloned().collect(),
            location_rules,
            vendored_dir: config.vendored_dir.clone(),
            generated: config.generated_paths.iter().cloned().collect(),
        })
    }

    /// Classify a repository-relative path (forward slashes).
    pub fn classify(&self, path: &str) -> FileDisposition {
        // The vendored tree is exempt wholesale, regardless of extension.
        if path.split('/').next() == Some(self.vendored_dir.as_str()) {
            return FileDisposition::ExemptThirdParty;
        }

        let by_extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(ext));
        if !by_extension && !self.location_rules.is_match(path) {
            return FileDisposition::NotSource;
        }

        if self.generated.contains(path) {
            return FileDisposition::ExemptGenerated;
        }

        FileDisposition::Styleable
    }
}
