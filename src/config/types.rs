use mediaprobe_core::ToolPaths;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Locations of the external tools. Leaving the section out keeps the
    /// conventional `/usr/bin` paths; listing it with some entries missing
    /// sends those tools to `PATH` lookup.
    #[serde(default)]
    pub tools: ToolPaths,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Pretty-print JSON unless `--compact` is given on the command line.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}
