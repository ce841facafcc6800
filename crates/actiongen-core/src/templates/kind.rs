//! Template kinds supported by actiongen.
//!
//! # Examples
//!
//! ```
//! use actiongen_core::templates::TemplateKind;
//! use std::str::FromStr;
//!
//! let kind = TemplateKind::from_str("csharp").unwrap();
//! assert_eq!(kind, TemplateKind::CSharp);
//! assert_eq!(kind.to_string(), "csharp");
//! assert_eq!(TemplateKind::default(), TemplateKind::CSharp);
//! ```
//!
//! `CSharp` ships embedded in the library; `Custom` is always loaded from a
//! template directory (see [`TemplateDir`](super::TemplateDir)).

use std::fmt;
use std::str::FromStr;

/// Supported template kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateKind {
    /// C# with Newtonsoft.Json messages
    #[default]
    CSharp,
    /// Custom template directory
    Custom,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" => Ok(TemplateKind::CSharp),
            "custom" => Ok(TemplateKind::Custom),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::Custom => "custom",
        }
    }

    /// Whether the library carries this kind's templates itself
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::CSharp)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
