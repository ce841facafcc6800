//! C#-specific action context builder.
//!
//! Every schema field is rendered three ways: as a member declaration
//! (`string Message;`), as a factory parameter (`string message`) and as an
//! object-initializer assignment (`Message = message`). The member name is
//! always Pascal and the parameter name always camel, so the two are distinct
//! and each is spelled identically everywhere it appears.

use super::ActionContextBuilder;
use crate::naming::{normalize, NamingConvention};
use crate::schema::{ActionDefinition, FieldDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// C# keywords that need an `@` prefix to be used as parameter names
const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// The three textual forms of one field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CSharpField {
    /// Field name as written in the schema
    pub name: String,
    /// Type spelling, passed through verbatim
    pub target_type: String,
    /// Pascal member name
    pub member: String,
    /// camel parameter name, `@`-escaped when it is a keyword
    pub parameter_name: String,
    /// `<type> <Member>;`
    pub declaration: String,
    /// `<type> <parameter>`
    pub parameter: String,
    /// `<Member> = <parameter>`
    pub initializer: String,
}

impl CSharpField {
    pub fn render(field: &FieldDefinition) -> Self {
        let member = normalize(&field.name, NamingConvention::Pascal);
        let mut camel = normalize(&field.name, NamingConvention::Camel);
        // `_id` and `Id` camel-case to the member name itself
        if camel == member {
            camel = lower_first(&camel);
        }
        let parameter_name = escape_keyword(camel);
        let target_type = field.ty.to_string();
        Self {
            declaration: format!("{target_type} {member};"),
            parameter: format!("{target_type} {parameter_name}"),
            initializer: format!("{member} = {parameter_name}"),
            name: field.name.clone(),
            target_type,
            member,
            parameter_name,
        }
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

fn escape_keyword(name: String) -> String {
    if RESERVED_WORDS.contains(&name.as_str()) {
        format!("@{name}")
    } else {
        name
    }
}

/// Template context for one action's nested class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CSharpActionContext {
    /// Action name as written in the schema
    pub name: String,
    /// Nested class name and enum member name
    pub type_name: String,
    /// False when the request is elided in favour of the shared empty request
    pub has_request_fields: bool,
    pub request_fields: Vec<CSharpField>,
    pub has_response_fields: bool,
    pub response_fields: Vec<CSharpField>,
    /// Parameter list of the response factory, in field order
    pub parameters: Vec<String>,
    /// Initializer list of the response factory, in field order
    pub initializers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CSharpActionContextBuilder;

impl ActionContextBuilder for CSharpActionContextBuilder {
    fn build(&self, action: &ActionDefinition) -> crate::Result<JsonValue> {
        let request_fields: Vec<_> = action.request.iter().map(CSharpField::render).collect();
        let response_fields: Vec<_> = action.response.iter().map(CSharpField::render).collect();

        let context = CSharpActionContext {
            name: action.name.clone(),
            type_name: action.type_name(),
            has_request_fields: !request_fields.is_empty(),
            has_response_fields: !response_fields.is_empty(),
            parameters: response_fields.iter().map(|f| f.parameter.clone()).collect(),
            initializers: response_fields
                .iter()
                .map(|f| f.initializer.clone())
                .collect(),
            request_fields,
            response_fields,
        };

        Ok(serde_json::to_value(&context)?)
    }
}
