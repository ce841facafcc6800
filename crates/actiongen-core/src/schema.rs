//! Action schema loading and validation.
//!
//! The schema is a YAML (or JSON) document of the form:
//!
//! ```yaml
//! actions:
//!   - ping:
//!       req:
//!       resp:
//!         message: string
//!   - get_file_list:
//!       req:
//!         path: string
//!       resp:
//!         files: List<string>
//! ```
//!
//! Every entry is a single-key mapping from action name to its `req`/`resp`
//! field mappings. Declaration order is kept everywhere, since it decides the
//! order of members in the generated sources. Validation is all-or-nothing:
//! the first malformed entry fails the whole load.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value as YamlValue};
use tokio::fs;
use url::Url;

use crate::naming::{normalize, NamingConvention};
use crate::type_map::{TargetType, TypeRegistry};
use crate::{Error, Result};

/// Name of the hand-written action every generated source carries
pub const EMPTY_ACTION: &str = "Empty";

/// Members the outer class declares itself; no action may take these names
pub const RESERVED_NAMES: &[&str] = &[EMPTY_ACTION, "Serializer", "Deserialize", "IActionResponse"];

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// One field of a request or response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TargetType,
}

/// One action: a name with its request and response fields, in schema order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDefinition {
    pub name: String,
    pub request: Vec<FieldDefinition>,
    pub response: Vec<FieldDefinition>,
}

impl ActionDefinition {
    /// PascalCase name used for the nested type and the enum member
    pub fn type_name(&self) -> String {
        normalize(&self.name, NamingConvention::Pascal)
    }

    pub fn has_request(&self) -> bool {
        !self.request.is_empty()
    }
}

/// The ordered list of actions declared by a schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSchema {
    pub actions: Vec<ActionDefinition>,
}

impl ActionSchema {
    /// Load a schema from a file path or an `http(s)://` URL
    pub async fn from_file_or_url<P: AsRef<str>>(
        location: P,
        types: &TypeRegistry,
    ) -> Result<Self> {
        let location = location.as_ref();
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Self::from_url(url, types).await
            }
            _ => Self::from_file(location, types).await,
        }
    }

    /// Load a schema from a file
    pub async fn from_file<P: AsRef<Path>>(path: P, types: &TypeRegistry) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Failed to read schema at {}: {}", path.display(), e))
        })?;
        log::debug!("Parsing action schema from {}", path.display());
        Self::parse(&content, types)
    }

    /// Fetch a schema over HTTP
    pub async fn from_url(url: Url, types: &TypeRegistry) -> Result<Self> {
        log::debug!("Fetching action schema from {url}");
        let response = reqwest::get(url.clone()).await?;
        if !response.status().is_success() {
            return Err(Error::config(format!(
                "Failed to fetch schema from {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let content = response.text().await?;
        Self::parse(&content, types)
    }

    /// Parse and validate schema text
    pub fn parse(content: &str, types: &TypeRegistry) -> Result<Self> {
        let root: YamlValue = serde_yaml::from_str(content)?;
        let entries = match root.get("actions") {
            Some(YamlValue::Sequence(entries)) => entries,
            Some(YamlValue::Null) => return Ok(Self { actions: Vec::new() }),
            Some(_) => return Err(Error::schema("`actions` must be a list")),
            None => return Err(Error::schema("missing top-level `actions` list")),
        };

        let mut actions = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let action = parse_action(index, entry, types)?;
            let type_name = action.type_name();
            if RESERVED_NAMES.contains(&type_name.as_str()) {
                return Err(Error::schema(format!(
                    "action `{}` collides with the built-in `{type_name}`",
                    action.name
                )));
            }
            if !seen.insert(type_name.clone()) {
                return Err(Error::schema(format!(
                    "action `{}` is declared more than once (as `{type_name}`)",
                    action.name
                )));
            }
            actions.push(action);
        }

        Ok(Self { actions })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn parse_action(index: usize, entry: &YamlValue, types: &TypeRegistry) -> Result<ActionDefinition> {
    let mapping = entry.as_mapping().ok_or_else(|| {
        Error::schema(format!("action #{index} must be a mapping of one name to its fields"))
    })?;
    if mapping.len() != 1 {
        return Err(Error::schema(format!(
            "action #{index} must have exactly one name, found {}",
            mapping.len()
        )));
    }
    let Some((key, body)) = mapping.iter().next() else {
        return Err(Error::schema(format!("action #{index} is empty")));
    };
    let name = key
        .as_str()
        .ok_or_else(|| Error::schema(format!("action #{index} name must be a string")))?;
    check_identifier(name, || format!("action #{index}"))?;

    let (request, response) = match body {
        YamlValue::Null => (None, None),
        YamlValue::Mapping(body) => {
            for key in body.keys() {
                match key.as_str() {
                    Some("req") | Some("resp") => {}
                    _ => {
                        return Err(Error::schema(format!(
                            "action `{name}` has unknown key {}; expected `req` or `resp`",
                            describe(key)
                        )));
                    }
                }
            }
            (body.get("req"), body.get("resp"))
        }
        _ => {
            return Err(Error::schema(format!(
                "action `{name}` must map to a `req`/`resp` mapping"
            )));
        }
    };

    Ok(ActionDefinition {
        name: name.to_string(),
        request: parse_fields(name, "req", request, types)?,
        response: parse_fields(name, "resp", response, types)?,
    })
}

fn parse_fields(
    action: &str,
    section: &str,
    value: Option<&YamlValue>,
    types: &TypeRegistry,
) -> Result<Vec<FieldDefinition>> {
    let fields: &Mapping = match value {
        None | Some(YamlValue::Null) => return Ok(Vec::new()),
        Some(YamlValue::Mapping(fields)) => fields,
        Some(_) => {
            return Err(Error::schema(format!(
                "`{action}.{section}` must be a mapping of field names to types"
            )));
        }
    };

    let mut result = Vec::with_capacity(fields.len());
    let mut seen = HashSet::new();
    for (key, ty) in fields {
        let name = key.as_str().ok_or_else(|| {
            Error::schema(format!(
                "`{action}.{section}` has a non-string field name {}",
                describe(key)
            ))
        })?;
        check_identifier(name, || format!("field `{action}.{section}.{name}`"))?;
        let member = normalize(name, NamingConvention::Pascal);
        let enclosing = if section == "req" { "Request" } else { "Response" };
        if member == enclosing {
            return Err(Error::schema(format!(
                "field `{action}.{section}.{name}` has the same name as its `{enclosing}` struct"
            )));
        }
        if !seen.insert(member) {
            return Err(Error::schema(format!(
                "field `{name}` is declared more than once in `{action}.{section}`"
            )));
        }
        let spelling = ty.as_str().ok_or_else(|| {
            Error::schema(format!(
                "field `{action}.{section}.{name}` must have a type name, found {}",
                describe(ty)
            ))
        })?;
        let ty = types.resolve(spelling).map_err(|e| match e {
            Error::Schema(msg) => Error::schema(format!("field `{action}.{section}.{name}`: {msg}")),
            other => other,
        })?;
        result.push(FieldDefinition {
            name: name.to_string(),
            ty,
        });
    }
    Ok(result)
}

fn check_identifier(name: &str, what: impl FnOnce() -> String) -> Result<()> {
    if !IDENTIFIER.is_match(name) || normalize(name, NamingConvention::Pascal).is_empty() {
        return Err(Error::schema(format!(
            "{} has invalid name `{name}`",
            what()
        )));
    }
    Ok(())
}

fn describe(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => format!("`{b}`"),
        YamlValue::Number(n) => format!("`{n}`"),
        YamlValue::String(s) => format!("`{s}`"),
        YamlValue::Sequence(_) => "a list".to_string(),
        YamlValue::Mapping(_) => "a mapping".to_string(),
        YamlValue::Tagged(tagged) => format!("tagged value `{}`", tagged.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(content: &str) -> Result<ActionSchema> {
        ActionSchema::parse(content, &TypeRegistry::default())
    }

    fn field_names(fields: &[FieldDefinition]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_parse_keeps_declaration_order() -> Result<()> {
        let schema = parse(
            r#"
actions:
  - zeta:
      req:
        z_last: string
        a_first: int
        m_mid: bool
      resp:
  - alpha:
      resp:
        b: long
        a: long
"#,
        )?;
        let names: Vec<_> = schema.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(
            field_names(&schema.actions[0].request),
            vec!["z_last", "a_first", "m_mid"]
        );
        assert!(schema.actions[0].response.is_empty());
        assert!(schema.actions[1].request.is_empty());
        assert_eq!(field_names(&schema.actions[1].response), vec!["b", "a"]);
        Ok(())
    }

    #[test]
    fn test_absent_and_null_sections_are_empty() -> Result<()> {
        let schema = parse(
            r#"
actions:
  - ping:
      req: null
      resp:
        message: string
  - heartbeat:
  - shutdown: {}
"#,
        )?;
        assert_eq!(schema.len(), 3);
        assert!(!schema.actions[0].has_request());
        assert_eq!(schema.actions[0].response[0].ty.as_str(), "string");
        assert!(schema.actions[1].request.is_empty() && schema.actions[1].response.is_empty());
        assert!(schema.actions[2].request.is_empty() && schema.actions[2].response.is_empty());
        Ok(())
    }

    #[test]
    fn test_json_input_is_accepted() -> Result<()> {
        let schema = parse(
            r#"{"actions": [{"get_file": {"req": {"path": "string", "offset": "long"}, "resp": null}}]}"#,
        )?;
        assert_eq!(schema.actions[0].type_name(), "GetFile");
        assert_eq!(field_names(&schema.actions[0].request), vec!["path", "offset"]);
        Ok(())
    }

    #[test]
    fn test_empty_actions_list() -> Result<()> {
        assert!(parse("actions: []")?.is_empty());
        assert!(parse("actions:")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_entry_with_multiple_keys_is_rejected() {
        let err = parse(
            r#"
actions:
  - ping:
      resp:
    pong:
      resp:
"#,
        )
        .unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("exactly one name"));
    }

    #[test]
    fn test_shape_errors() {
        let cases = [
            ("missing_actions: []", "missing top-level"),
            ("actions: 3", "must be a list"),
            ("actions: [ping]", "must be a mapping"),
            ("actions: [{}]", "exactly one name"),
            ("actions: [{ping: [1]}]", "`req`/`resp` mapping"),
            ("actions: [{ping: {request: {a: int}}}]", "unknown key `request`"),
            ("actions: [{ping: {req: [a]}}]", "must be a mapping of field names"),
            ("actions: [{ping: {req: {a: 3}}}]", "must have a type name"),
            ("actions: [{ping: {req: {a: Nope}}}]", "unknown type `Nope`"),
            ("actions: [{get-file: {}}]", "invalid name `get-file`"),
            ("actions: [{ping: {resp: {2fast: int}}}]", "invalid name `2fast`"),
            ("actions: [{__: {}}]", "invalid name `__`"),
            ("actions: [{empty: {}}]", "built-in `Empty`"),
            ("actions: [{serializer: {}}]", "built-in `Serializer`"),
            ("actions: [{deserialize: {}}]", "built-in `Deserialize`"),
            ("actions: [{i_action_response: {}}]", "built-in `IActionResponse`"),
            ("actions: [{ping: {req: {request: int}}}]", "same name as its `Request` struct"),
            ("actions: [{ping: {resp: {response: int}}}]", "same name as its `Response` struct"),
            ("actions: [{ping: {}}, {Ping: {}}]", "more than once"),
            ("actions: [{ping: {resp: {file_name: string, FileName: string}}}]", "more than once"),
        ];
        for (content, expected) in cases {
            let err = parse(content).unwrap_err();
            assert!(err.is_schema(), "{content}: {err}");
            assert!(
                err.to_string().contains(expected),
                "{content}: expected `{expected}` in `{err}`"
            );
        }
    }

    #[test]
    fn test_extra_types_flow_into_fields() -> Result<()> {
        let registry = TypeRegistry::with_extra_types(["InstanceConfig"]);
        let schema = ActionSchema::parse(
            "actions: [{add_instance: {req: {setting: InstanceConfig}, resp: {id: Guid}}}]",
            &registry,
        )?;
        assert_eq!(schema.actions[0].request[0].ty.as_str(), "InstanceConfig");
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_or_url_reads_files() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("actions_meta.yml");
        tokio::fs::write(&path, "actions:\n  - ping:\n      resp:\n        message: string\n").await?;

        let location = path.to_string_lossy().to_string();
        let schema = ActionSchema::from_file_or_url(&location, &TypeRegistry::default()).await?;
        assert_eq!(schema.actions[0].name, "ping");

        let missing = ActionSchema::from_file(dir.path().join("nope.yml"), &TypeRegistry::default()).await;
        assert!(matches!(missing, Err(Error::Config(_))));
        Ok(())
    }

    /// Answer a single HTTP request with a fixed status and body
    async fn serve_once(status: &'static str, body: &'static str) -> std::io::Result<std::net::SocketAddr> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await?;
            socket.shutdown().await
        });
        Ok(addr)
    }

    #[tokio::test]
    async fn test_from_file_or_url_fetches_http() -> Result<()> {
        let addr = serve_once("200 OK", "actions:\n  - ping:\n      resp:\n        message: string\n").await?;
        let schema = ActionSchema::from_file_or_url(
            format!("http://{addr}/actions_meta.yml"),
            &TypeRegistry::default(),
        )
        .await?;
        assert_eq!(schema.actions[0].type_name(), "Ping");
        assert_eq!(schema.actions[0].response[0].ty.as_str(), "string");

        let addr = serve_once("404 Not Found", "").await?;
        let err = ActionSchema::from_file_or_url(format!("http://{addr}/missing.yml"), &TypeRegistry::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
        assert!(err.to_string().contains("404"), "{err}");
        Ok(())
    }
}
