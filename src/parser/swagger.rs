// src/parser/swagger.rs

use openapi::{
    MediaType, OpenAPI, Operation, Parameter, ParameterData, ParameterSchemaOrContent, PathItem,
    ReferenceOr, RequestBody, Response, Schema, SchemaKind, Type,
};
use serde_json::{Error as JsonError, Value};
use thiserror::Error;

use crate::utils::status_label;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] JsonError),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid OpenAPI document: {0}")]
    InvalidSpec(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// Flattened, render-ready view of an OpenAPI document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwaggerSpec {
    pub title: String,
    pub description: Option<String>,
    pub version: String,

    /// All paths defined in the API, in document order
    pub paths: Vec<ApiPath>,
}

/// Represents an API path with its operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiPath {
    /// The path template (e.g., "/users/{id}")
    pub path: String,

    /// The operations available on this path
    pub operations: Vec<ApiOperation>,
}

/// Represents an API operation (HTTP method + path)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiOperation {
    /// Upper-case HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: String,

    /// Detailed description of the operation, possibly spanning several lines
    pub description: Option<String>,

    /// Parameters declared by the operation itself, in declaration order
    pub parameters: Vec<ApiParameter>,

    pub request_body: Option<ApiRequestBody>,

    /// Possible responses returned by this operation
    pub responses: Vec<ApiResponse>,
}

/// Represents a parameter in an API operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiParameter {
    pub name: String,

    /// Location of the parameter (query, header, path, cookie)
    pub location: String,

    /// Declared schema type; `None` when the schema is missing or untyped
    pub schema_type: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequestBody {
    pub content: Vec<ApiMediaType>,
}

/// One entry of a `content` map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiMediaType {
    /// Media type key, e.g. "application/json"
    pub media_type: String,

    pub schema_type: Option<String>,

    /// Property name and type, only populated for object schemas
    pub properties: Vec<(String, Option<String>)>,
}

/// Represents a possible API response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code, a range such as "4XX", or "default"
    pub status_code: String,

    pub description: Option<String>,

    pub content: Vec<ApiMediaType>,
}

impl SwaggerSpec {
    /// Total number of (path, method) pairs
    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }
}

impl From<&OpenAPI> for SwaggerSpec {
    fn from(doc: &OpenAPI) -> Self {
        let paths = doc
            .paths
            .paths
            .iter()
            .filter_map(|(path, item)| {
                let item = as_item(item)?;
                Some(ApiPath {
                    path: path.clone(),
                    operations: operations(item)
                        .map(|(method, op)| convert_operation(method, op))
                        .collect(),
                })
            })
            .collect();

        SwaggerSpec {
            title: doc.info.title.clone(),
            description: doc.info.description.clone(),
            version: doc.info.version.clone(),
            paths,
        }
    }
}

/// Parse an OpenAPI document from JSON or YAML text
pub fn parse_swagger_str(content: &str) -> Result<Value> {
    if content.trim_start().starts_with('{') {
        Ok(serde_json::from_str(content)?)
    } else {
        // Going through serde_yaml::Value lets integer keys like `200:` become strings.
        let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
        Ok(serde_json::to_value(yaml)?)
    }
}

/// Check the declared version and deserialize into the typed object model
pub fn parse_openapi_value(spec: Value) -> Result<OpenAPI> {
    if !spec.is_object() {
        return Err(ParserError::InvalidSpec(
            "document root must be an object".into(),
        ));
    }

    let version = |key: &str| spec.get(key).and_then(Value::as_str).map(String::from);
    let swagger_version = version("swagger");
    let openapi_version = version("openapi");

    match (swagger_version.as_deref(), openapi_version.as_deref()) {
        (_, Some(v)) if v.starts_with("3.0") => serde_json::from_value(spec)
            .map_err(|err| ParserError::InvalidSpec(err.to_string())),
        (_, Some(v)) => Err(ParserError::UnsupportedVersion(v.to_string())),
        (Some(v), None) => Err(ParserError::UnsupportedVersion(format!("swagger {}", v))),
        (None, None) => Err(ParserError::InvalidSpec(
            "missing `openapi` version field".into(),
        )),
    }
}

/// The operations of a path item in a fixed method order
pub fn operations(item: &PathItem) -> impl Iterator<Item = (&'static str, &Operation)> {
    [
        ("GET", &item.get),
        ("PUT", &item.put),
        ("POST", &item.post),
        ("DELETE", &item.delete),
        ("OPTIONS", &item.options),
        ("HEAD", &item.head),
        ("PATCH", &item.patch),
        ("TRACE", &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
}

/// Borrow the inline value; unresolved references yield `None`
pub fn as_item<T>(value: &ReferenceOr<T>) -> Option<&T> {
    match value {
        ReferenceOr::Item(item) => Some(item),
        ReferenceOr::Reference { .. } => None,
    }
}

/// Split a parameter into its shared data and its location keyword
pub fn parameter_parts(param: &Parameter) -> (&ParameterData, &'static str) {
    match param {
        Parameter::Query { parameter_data, .. } => (parameter_data, "query"),
        Parameter::Header { parameter_data, .. } => (parameter_data, "header"),
        Parameter::Path { parameter_data, .. } => (parameter_data, "path"),
        Parameter::Cookie { parameter_data, .. } => (parameter_data, "cookie"),
    }
}

/// The declared `type` keyword of a schema, if any
pub fn schema_type(schema: &Schema) -> Option<String> {
    match &schema.schema_kind {
        SchemaKind::Type(Type::String(_)) => Some("string".to_string()),
        SchemaKind::Type(Type::Number(_)) => Some("number".to_string()),
        SchemaKind::Type(Type::Integer(_)) => Some("integer".to_string()),
        SchemaKind::Type(Type::Object(_)) => Some("object".to_string()),
        SchemaKind::Type(Type::Array(_)) => Some("array".to_string()),
        SchemaKind::Type(_) => Some("boolean".to_string()),
        SchemaKind::Any(any) => any.typ.clone(),
        _ => None,
    }
}

fn schema_properties(schema: &Schema) -> Vec<(String, Option<String>)> {
    let properties = match &schema.schema_kind {
        SchemaKind::Type(Type::Object(object)) => &object.properties,
        SchemaKind::Any(any) if any.typ.as_deref() == Some("object") => &any.properties,
        _ => return Vec::new(),
    };

    properties
        .iter()
        .map(|(name, prop)| {
            let prop_type = as_item(prop).and_then(|s| schema_type(s));
            (name.clone(), prop_type)
        })
        .collect()
}

fn convert_operation(method: &str, op: &Operation) -> ApiOperation {
    let parameters = op
        .parameters
        .iter()
        .filter_map(as_item)
        .map(convert_parameter)
        .collect();

    let request_body = op
        .request_body
        .as_ref()
        .and_then(as_item)
        .map(|body: &RequestBody| ApiRequestBody {
            content: convert_content(&body.content),
        });

    let mut responses: Vec<ApiResponse> = op
        .responses
        .responses
        .iter()
        .filter_map(|(code, resp)| Some(convert_response(status_label(code), as_item(resp)?)))
        .collect();

    if let Some(default) = op.responses.default.as_ref().and_then(as_item) {
        responses.push(convert_response("default".to_string(), default));
    }

    ApiOperation {
        method: method.to_string(),
        description: op.description.clone(),
        parameters,
        request_body,
        responses,
    }
}

fn convert_parameter(param: &Parameter) -> ApiParameter {
    let (data, location) = parameter_parts(param);

    let param_type = match &data.format {
        ParameterSchemaOrContent::Schema(schema) => as_item(schema).and_then(schema_type),
        ParameterSchemaOrContent::Content(_) => None,
    };

    ApiParameter {
        name: data.name.clone(),
        location: location.to_string(),
        schema_type: param_type,
        description: data.description.clone(),
    }
}

fn convert_response(status_code: String, resp: &Response) -> ApiResponse {
    ApiResponse {
        status_code,
        description: Some(resp.description.clone()),
        content: convert_content(&resp.content),
    }
}

fn convert_content<'a>(
    content: impl IntoIterator<Item = (&'a String, &'a MediaType)>,
) -> Vec<ApiMediaType> {
    content
        .into_iter()
        .map(|(media_type, media)| {
            let schema = media.schema.as_ref().and_then(as_item);
            ApiMediaType {
                media_type: media_type.clone(),
                schema_type: schema.and_then(schema_type),
                properties: schema
                    .filter(|s| schema_type(s).as_deref() == Some("object"))
                    .map(schema_properties)
                    .unwrap_or_default(),
            }
        })
        .collect()
}
