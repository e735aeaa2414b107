//! Runtime mode: baked index or live filesystem

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where embedding requests are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The tree index compiled into the program
    #[default]
    Baked,
    /// The real filesystem, next to the call site's source file
    Live,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Baked => write!(f, "baked"),
            Mode::Live => write!(f, "live"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baked" => Ok(Mode::Baked),
            "live" => Ok(Mode::Live),
            other => Err(format!("unknown mode {:?}, expected \"baked\" or \"live\"", other)),
        }
    }
}
