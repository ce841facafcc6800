//! Field type resolution.
//!
//! Schema type names are passed through to the generated source unchanged, but
//! only after they parse as a C# type expression whose every name is known:
//! either a built-in/framework spelling from [`BUILTIN_TYPES`] or a name the
//! project registered through [`TypeRegistry::with_extra_types`].
//!
//! ```
//! use actiongen_core::type_map::TypeRegistry;
//!
//! let registry = TypeRegistry::default();
//! let ty = registry.resolve("Dictionary<string, List<Guid>>").unwrap();
//! assert_eq!(ty.as_str(), "Dictionary<string, List<Guid>>");
//! assert!(registry.resolve("Strnig").is_err());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Known type names and the number of generic arguments each takes
pub const BUILTIN_TYPES: &[(&str, usize)] = &[
    ("bool", 0),
    ("byte", 0),
    ("sbyte", 0),
    ("char", 0),
    ("decimal", 0),
    ("double", 0),
    ("float", 0),
    ("int", 0),
    ("uint", 0),
    ("long", 0),
    ("ulong", 0),
    ("short", 0),
    ("ushort", 0),
    ("nint", 0),
    ("nuint", 0),
    ("object", 0),
    ("string", 0),
    ("Guid", 0),
    ("DateTime", 0),
    ("DateTimeOffset", 0),
    ("TimeSpan", 0),
    ("Uri", 0),
    ("Version", 0),
    ("JObject", 0),
    ("JArray", 0),
    ("JToken", 0),
    ("List", 1),
    ("IList", 1),
    ("IEnumerable", 1),
    ("IReadOnlyList", 1),
    ("ICollection", 1),
    ("HashSet", 1),
    ("ISet", 1),
    ("Queue", 1),
    ("Stack", 1),
    ("Dictionary", 2),
    ("IDictionary", 2),
    ("IReadOnlyDictionary", 2),
    ("KeyValuePair", 2),
];

/// Parsed shape of a type spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named { name: String, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
    Nullable(Box<TypeExpr>),
}

impl TypeExpr {
    fn visit_names<'a>(&'a self, out: &mut Vec<(&'a str, usize)>) {
        match self {
            Self::Named { name, args } => {
                out.push((name, args.len()));
                for arg in args {
                    arg.visit_names(out);
                }
            }
            Self::Array(inner) | Self::Nullable(inner) => inner.visit_names(out),
        }
    }
}

/// A validated field type, emitted exactly as the schema spelled it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    spelling: String,
    expr: TypeExpr,
}

impl TargetType {
    pub fn as_str(&self) -> &str {
        &self.spelling
    }

    pub fn expr(&self) -> &TypeExpr {
        &self.expr
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

impl Serialize for TargetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.spelling)
    }
}

/// The set of type names a schema may reference
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    extra: BTreeSet<String>,
}

impl TypeRegistry {
    /// Registry accepting the built-ins plus the given project types
    pub fn with_extra_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: types
                .into_iter()
                .map(Into::into)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Number of generic arguments `name` takes, if it is known
    pub fn arity(&self, name: &str) -> Option<usize> {
        BUILTIN_TYPES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, arity)| *arity)
            .or_else(|| self.extra.contains(name).then_some(0))
    }

    /// Parse and validate a type spelling from the schema
    pub fn resolve(&self, spelling: &str) -> Result<TargetType> {
        let spelling = spelling.trim();
        let expr = TypeParser::new(spelling)
            .parse()
            .map_err(|msg| Error::schema(format!("invalid type `{spelling}`: {msg}")))?;

        let mut names = Vec::new();
        expr.visit_names(&mut names);
        for (name, args) in names {
            match self.arity(name) {
                None => {
                    return Err(Error::schema(format!(
                        "unknown type `{name}` in `{spelling}`"
                    )));
                }
                Some(expected) if expected != args => {
                    return Err(Error::schema(format!(
                        "type `{name}` takes {expected} generic argument(s) but `{spelling}` gives {args}"
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(TargetType {
            spelling: spelling.to_string(),
            expr,
        })
    }
}

struct TypeParser<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> TypeParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> std::result::Result<TypeExpr, String> {
        let expr = self.parse_type()?;
        self.skip_ws();
        match self.chars.next() {
            None => Ok(expr),
            Some((pos, c)) => Err(format!("unexpected `{c}` at offset {pos}")),
        }
    }

    fn parse_type(&mut self) -> std::result::Result<TypeExpr, String> {
        self.skip_ws();
        let name = self.parse_name()?;
        self.skip_ws();

        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err("expected `,` or `>` in generic arguments".to_string());
            }
        }

        let mut expr = TypeExpr::Named { name, args };
        loop {
            self.skip_ws();
            if self.eat('[') {
                self.skip_ws();
                if !self.eat(']') {
                    return Err("expected `]` after `[`".to_string());
                }
                expr = TypeExpr::Array(Box::new(expr));
            } else if self.eat('?') {
                expr = TypeExpr::Nullable(Box::new(expr));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_name(&mut self) -> std::result::Result<String, String> {
        let start = match self.chars.peek() {
            Some(&(pos, c)) if c.is_ascii_alphabetic() || c == '_' => pos,
            Some(&(pos, c)) => return Err(format!("unexpected `{c}` at offset {pos}")),
            None => return Err("expected a type name".to_string()),
        };
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                end = pos + c.len_utf8();
                self.chars.next();
            } else if c == '.' {
                self.chars.next();
                match self.chars.peek() {
                    Some(&(_, next)) if next.is_ascii_alphabetic() || next == '_' => {}
                    _ => return Err(format!("dangling `.` at offset {pos}")),
                }
            } else {
                break;
            }
        }
        Ok(self.src[start..end].to_string())
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }
}
