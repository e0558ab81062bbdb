//! Export targets and their fixed per-platform naming.

use std::fmt;
use std::str::FromStr;

/// A platform the project is exported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformTarget {
    /// Windows desktop
    Windows,
    /// macOS desktop
    MacOs,
    /// Linux desktop (x86_64)
    Linux,
}

impl PlatformTarget {
    /// All targets in canonical export order
    pub const ALL: [PlatformTarget; 3] = [
        PlatformTarget::Windows,
        PlatformTarget::MacOs,
        PlatformTarget::Linux,
    ];

    /// Name of the export preset in the project's `export_presets.cfg`
    pub fn export_profile(self) -> &'static str {
        match self {
            PlatformTarget::Windows => "Windows",
            PlatformTarget::MacOs => "macOS",
            PlatformTarget::Linux => "Linux",
        }
    }

    /// Short code used for the output directory and archive suffix
    pub fn code(self) -> &'static str {
        match self {
            PlatformTarget::Windows => "win",
            PlatformTarget::MacOs => "macos",
            PlatformTarget::Linux => "linux",
        }
    }

    /// File extension of the exported binary
    pub fn extension(self) -> &'static str {
        match self {
            PlatformTarget::Windows => "exe",
            PlatformTarget::MacOs => "app",
            PlatformTarget::Linux => "x86_64",
        }
    }

    /// Rendered upload script that uploads this platform's depot
    pub fn upload_script(self) -> &'static str {
        match self {
            PlatformTarget::Windows => "upload_win.vdf",
            PlatformTarget::MacOs => "upload_macos.vdf",
            PlatformTarget::Linux => "upload_linux.vdf",
        }
    }

    /// Parse a comma separated platform list.
    ///
    /// The result is de-duplicated and sorted into canonical order, so the
    /// upload plan never depends on how the list was written.
    pub fn parse_list(input: &str) -> Result<Vec<PlatformTarget>, String> {
        let mut platforms = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<PlatformTarget>, String>>()?;
        platforms.sort();
        platforms.dedup();
        Ok(platforms)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_profile())
    }
}

impl FromStr for PlatformTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "windows" => Ok(PlatformTarget::Windows),
            "macos" | "mac" | "osx" => Ok(PlatformTarget::MacOs),
            "linux" => Ok(PlatformTarget::Linux),
            other => Err(format!(
                "unknown platform '{other}' (expected windows, macos or linux)"
            )),
        }
    }
}
