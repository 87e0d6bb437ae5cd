use crate::utils::config::FileConfig;
use std::path::PathBuf;

/// Arguments for the check command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    /// PDF document to check
    pub pdf: PathBuf,

    /// Test file the snapshots belong to; snapshots live beside it
    pub test_path: PathBuf,

    /// Fully-qualified test name
    pub test_name: String,

    /// Accept differences as the new baseline
    pub update: bool,

    /// Rendering scale (None = default)
    pub scale: Option<f64>,

    /// Page failure threshold (None = default)
    pub threshold: Option<f64>,

    /// Remote match service (None = render locally)
    pub server_url: Option<String>,

    /// Path to the pdftoppm binary (None = POPPLER_BIN or PATH)
    pub poppler_bin: Option<String>,

    /// Optional JSON report output
    pub report: Option<PathBuf>,

    /// Print a colored summary to stdout
    pub print_summary: bool,
}

impl CheckArgs {
    /// Fill unset options from a configuration file; flags win
    pub fn apply_config(&mut self, config: &FileConfig) {
        if self.scale.is_none() {
            self.scale = config.scale;
        }
        if self.threshold.is_none() {
            self.threshold = config.failure_threshold;
        }
        if self.server_url.is_none() {
            self.server_url = config.server_url.clone();
        }
        if self.poppler_bin.is_none() {
            self.poppler_bin = config.poppler_bin.clone();
        }
    }
}

/// Arguments for the compare command
#[derive(Debug, Clone)]
pub struct CompareArgs {
    /// Accepted reference PNG
    pub reference: PathBuf,

    /// Newly rendered PNG
    pub received: PathBuf,

    /// Page failure threshold
    pub threshold: f64,

    /// Where to write the composite when the pages differ
    pub output: Option<PathBuf>,
}

/// Arguments for the match command
#[derive(Debug, Clone)]
pub struct MatchArgs {
    /// JSON request file
    pub request: PathBuf,

    /// JSON response file (None = stdout)
    pub output: Option<PathBuf>,

    /// Path to the pdftoppm binary (None = POPPLER_BIN or PATH)
    pub poppler_bin: Option<String>,
}
