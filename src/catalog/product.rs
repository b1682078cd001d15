//! Installed product versions and their product lines

use std::sync::LazyLock;

use regex::Regex;

/// Fixed (major, minor) -> product line table
const PRODUCT_LINES: &[((u32, u32), &str)] = &[
    ((15, 0), "2013"),
    ((15, 1), "2016"),
    ((15, 2), "2019"),
];

/// "15.1.2507.6" or "15.1"
static DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?(?:\.(\d+))?$").expect("valid dotted version regex")
});

/// "Version 15.1 (Build 2507.6)"
static ADMIN_DISPLAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Version\s+(\d+)\.(\d+)(?:\s*\(Build\s+(\d+)\.(\d+)\))?$")
        .expect("valid admin display version regex")
});

/// Version of an installed Exchange server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl ProductVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    /// Parse either dotted form or the AdminDisplayVersion form
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let caps = DOTTED
            .captures(value)
            .or_else(|| ADMIN_DISPLAY.captures(value))?;

        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        Some(Self {
            major: number(1)?,
            minor: number(2)?,
            build: number(3),
            revision: number(4),
        })
    }

    /// Product line label for this version, if it is a known Exchange release
    pub fn product_line(&self) -> Option<&'static str> {
        product_line_for(self.major, self.minor)
    }
}

impl std::fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{}", revision)?;
        }
        Ok(())
    }
}

/// Map a major/minor pair to its product line label
pub fn product_line_for(major: u32, minor: u32) -> Option<&'static str> {
    PRODUCT_LINES
        .iter()
        .find(|(pair, _)| *pair == (major, minor))
        .map(|(_, line)| *line)
}
