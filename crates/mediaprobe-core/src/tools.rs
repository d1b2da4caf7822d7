//! External tool configuration and lookup.
//!
//! [`ToolPaths`] holds the configured location of every external tool the
//! probes shell out to. A [`ToolRegistry`] wraps one `ToolPaths` and resolves
//! tools on demand: a configured path is used when it points at an executable
//! file, otherwise the tool is searched for on `PATH`. Resolved paths are
//! cached for the lifetime of the registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An external tool used by one of the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// `file`, the MIME classifier.
    File,
    /// `ffprobe`, the media inspection tool.
    Ffprobe,
    /// ImageMagick `identify`.
    Identify,
    /// Poppler `pdfinfo`.
    Pdfinfo,
}

impl Tool {
    /// Every tool the normalizer may invoke.
    pub const ALL: [Tool; 4] = [Tool::File, Tool::Ffprobe, Tool::Identify, Tool::Pdfinfo];

    /// Executable name, as searched for on `PATH`.
    pub fn name(self) -> &'static str {
        match self {
            Tool::File => "file",
            Tool::Ffprobe => "ffprobe",
            Tool::Identify => "identify",
            Tool::Pdfinfo => "pdfinfo",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configured tool locations.
///
/// Any entry may be left empty, in which case the tool is looked up on
/// `PATH`. A configured path that does not point at an executable also
/// falls back to `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub identify_path: Option<PathBuf>,

    #[serde(default)]
    pub pdfinfo_path: Option<PathBuf>,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            file_path: Some(PathBuf::from("/usr/bin/file")),
            ffprobe_path: Some(PathBuf::from("/usr/bin/ffprobe")),
            identify_path: Some(PathBuf::from("/usr/bin/identify")),
            pdfinfo_path: Some(PathBuf::from("/usr/bin/pdfinfo")),
        }
    }
}

impl ToolPaths {
    /// Configuration with no explicit paths; every tool comes from `PATH`.
    pub fn from_path_env() -> Self {
        Self {
            file_path: None,
            ffprobe_path: None,
            identify_path: None,
            pdfinfo_path: None,
        }
    }

    /// The configured path for `tool`, if any.
    pub fn get(&self, tool: Tool) -> Option<&Path> {
        match tool {
            Tool::File => self.file_path.as_deref(),
            Tool::Ffprobe => self.ffprobe_path.as_deref(),
            Tool::Identify => self.identify_path.as_deref(),
            Tool::Pdfinfo => self.pdfinfo_path.as_deref(),
        }
    }

    /// Set the configured path for `tool`.
    pub fn set(&mut self, tool: Tool, path: impl Into<PathBuf>) {
        let slot = match tool {
            Tool::File => &mut self.file_path,
            Tool::Ffprobe => &mut self.ffprobe_path,
            Tool::Identify => &mut self.identify_path,
            Tool::Pdfinfo => &mut self.pdfinfo_path,
        };
        *slot = Some(path.into());
    }
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Resolves and caches tool locations for one normalizer.
#[derive(Debug)]
pub struct ToolRegistry {
    paths: ToolPaths,
    resolved: RefCell<HashMap<Tool, PathBuf>>,
}

impl ToolRegistry {
    /// Create a registry over the given configuration. Nothing is resolved
    /// until a tool is first requested.
    pub fn new(paths: ToolPaths) -> Self {
        Self {
            paths,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// Return the executable path for `tool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if the configured path is not an
    /// executable and the tool is not on `PATH`.
    pub fn resolve(&self, tool: Tool) -> Result<PathBuf> {
        if let Some(path) = self.resolved.borrow().get(&tool) {
            return Ok(path.clone());
        }

        let path = match self.paths.get(tool) {
            Some(p) if is_executable(p) => p.to_path_buf(),
            configured => {
                if let Some(p) = configured {
                    tracing::debug!(
                        "Configured {} path {:?} is not executable, searching PATH",
                        tool,
                        p
                    );
                }
                which::which(tool.name()).map_err(|_| Error::tool_not_found(tool.name()))?
            }
        };

        tracing::debug!("Resolved {} to {:?}", tool, path);
        self.resolved.borrow_mut().insert(tool, path.clone());
        Ok(path)
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        Tool::ALL
            .iter()
            .map(|&tool| {
                let path = self.resolve(tool).ok();
                ToolInfo {
                    name: tool.name().to_string(),
                    available: path.is_some(),
                    path,
                }
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(ToolPaths::default())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
