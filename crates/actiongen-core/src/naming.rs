//! Identifier casing for generated code.
//!
//! Schema names are snake_case. Type, member and enum names are emitted in
//! [`NamingConvention::Pascal`], factory parameters in
//! [`NamingConvention::Camel`]. Callers always pass the convention explicitly.

use std::fmt;

/// Casing applied when turning a schema identifier into a generated one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    /// `get_file_list` -> `GetFileList`
    Pascal,
    /// `get_file_list` -> `getFileList`
    Camel,
}

impl NamingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pascal => "pascal",
            Self::Camel => "camel",
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convert an underscore-separated identifier using the given convention
///
/// Only the first letter of a segment is touched; the rest of the segment is
/// kept as written, so `http_URL` becomes `HttpURL`.
pub fn normalize(name: &str, convention: NamingConvention) -> String {
    match convention {
        NamingConvention::Pascal => name.split('_').map(capitalize).collect(),
        NamingConvention::Camel => {
            let mut segments = name.split('_');
            let first = segments.next().unwrap_or_default();
            let mut result = first.to_string();
            for segment in segments {
                result.push_str(&capitalize(segment));
            }
            result
        }
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
