//! Declarative query-parameter schemas.
//!
//! Each list endpoint declares its parameters once as a slice of
//! [`QueryField`]s. The same declaration validates and coerces incoming
//! values at runtime and produces the OpenAPI parameter documentation, so the
//! two cannot drift apart.
//!
//! Leaf nodes describe a value type (string, integer, boolean, UUID, enum).
//! Wrapper nodes (`optional`, `nullable`, `default`) nest around a leaf in any
//! order; [`QuerySchema::describe`] unwraps them recursively to find the type
//! tag, enum members, whether the parameter is required, and its effective
//! default. A default nested under `optional` or `nullable` still applies.

use serde_json::{Map, Value};
use utoipa::openapi::RefOr;
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn};
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::Required;
use uuid::Uuid;

use crate::domain::{IssueCode, ValidationIssue};

/// Type tag of a leaf node, as documented in OpenAPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Integer,
    Boolean,
    Uuid,
    Enum,
}

impl TypeTag {
    const fn label(self) -> &'static str {
        match self {
            Self::String | Self::Uuid | Self::Enum => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// One node of a parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySchema {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Boolean,
    Uuid,
    Enum(&'static [&'static str]),
    Optional(Box<QuerySchema>),
    Nullable(Box<QuerySchema>),
    Default(Box<QuerySchema>, Value),
}

/// What the documentation needs to know about a parameter after all wrappers
/// have been unwrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDoc {
    pub type_tag: TypeTag,
    pub enum_members: Option<&'static [&'static str]>,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<Value>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

impl ParamDoc {
    const fn leaf(type_tag: TypeTag) -> Self {
        Self {
            type_tag,
            enum_members: None,
            required: true,
            nullable: false,
            default: None,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
        }
    }
}

impl QuerySchema {
    /// Unbounded string.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            min_len: None,
            max_len: None,
        }
    }

    /// Unbounded integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer {
            min: None,
            max: None,
        }
    }

    /// `true` or `false`.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean
    }

    /// Hyphenated UUID.
    #[must_use]
    pub const fn uuid() -> Self {
        Self::Uuid
    }

    /// One of `members`.
    #[must_use]
    pub const fn one_of(members: &'static [&'static str]) -> Self {
        Self::Enum(members)
    }

    /// Minimum length of a string leaf; ignored on other nodes.
    #[must_use]
    pub fn min_len(self, len: usize) -> Self {
        match self {
            Self::String { max_len, .. } => Self::String {
                min_len: Some(len),
                max_len,
            },
            other => other,
        }
    }

    /// Maximum length of a string leaf; ignored on other nodes.
    #[must_use]
    pub fn max_len(self, len: usize) -> Self {
        match self {
            Self::String { min_len, .. } => Self::String {
                min_len,
                max_len: Some(len),
            },
            other => other,
        }
    }

    /// Lower bound of an integer leaf; ignored on other nodes.
    #[must_use]
    pub fn min(self, bound: i64) -> Self {
        match self {
            Self::Integer { max, .. } => Self::Integer {
                min: Some(bound),
                max,
            },
            other => other,
        }
    }

    /// Upper bound of an integer leaf; ignored on other nodes.
    #[must_use]
    pub fn max(self, bound: i64) -> Self {
        match self {
            Self::Integer { min, .. } => Self::Integer {
                min,
                max: Some(bound),
            },
            other => other,
        }
    }

    /// The parameter may be omitted.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// The parameter may be an explicit `null`.
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Substitute `value` when the parameter is omitted.
    #[must_use]
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::Default(Box::new(self), value.into())
    }

    /// Unwrap every wrapper and summarise the parameter.
    #[must_use]
    pub fn describe(&self) -> ParamDoc {
        match self {
            Self::String { min_len, max_len } => ParamDoc {
                min_len: *min_len,
                max_len: *max_len,
                ..ParamDoc::leaf(TypeTag::String)
            },
            Self::Integer { min, max } => ParamDoc {
                min: *min,
                max: *max,
                ..ParamDoc::leaf(TypeTag::Integer)
            },
            Self::Boolean => ParamDoc::leaf(TypeTag::Boolean),
            Self::Uuid => ParamDoc::leaf(TypeTag::Uuid),
            Self::Enum(members) => ParamDoc {
                enum_members: Some(members),
                ..ParamDoc::leaf(TypeTag::Enum)
            },
            Self::Optional(inner) => ParamDoc {
                required: false,
                ..inner.describe()
            },
            Self::Nullable(inner) => ParamDoc {
                nullable: true,
                ..inner.describe()
            },
            Self::Default(inner, value) => ParamDoc {
                required: false,
                default: Some(value.clone()),
                ..inner.describe()
            },
        }
    }

    /// Validate and coerce one raw value. `Ok(None)` means the parameter is
    /// absent and has no default.
    ///
    /// Query strings deliver every value as text, so integer and boolean
    /// leaves also accept their textual forms.
    ///
    /// # Errors
    ///
    /// Returns a path-less [`ValidationIssue`]; callers attach the field name.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Option<Value>, ValidationIssue> {
        match self {
            Self::Default(inner, value) => inner.validate(raw.or(Some(value))),
            Self::Optional(inner) => match raw {
                None if inner.describe().default.is_some() => inner.validate(None),
                None => Ok(None),
                Some(_) => inner.validate(raw),
            },
            Self::Nullable(inner) => match raw {
                Some(Value::Null) => Ok(Some(Value::Null)),
                _ => inner.validate(raw),
            },
            leaf => leaf.validate_leaf(raw).map(Some),
        }
    }

    fn validate_leaf(&self, raw: Option<&Value>) -> Result<Value, ValidationIssue> {
        let tag = self.describe().type_tag;
        let value = match raw {
            None => return Err(ValidationIssue::new(IssueCode::Required, "Required")),
            Some(Value::Null) => return Err(invalid_type(tag, &Value::Null)),
            Some(value) => value,
        };

        match self {
            Self::String { min_len, max_len } => {
                let text = value.as_str().ok_or_else(|| invalid_type(tag, value))?;
                check_length(text, *min_len, *max_len)?;
                Ok(Value::String(text.to_owned()))
            }
            Self::Integer { min, max } => {
                let number = coerce_integer(value).ok_or_else(|| invalid_type(tag, value))?;
                check_bounds(number, *min, *max)?;
                Ok(Value::from(number))
            }
            Self::Boolean => coerce_bool(value)
                .map(Value::Bool)
                .ok_or_else(|| invalid_type(tag, value)),
            Self::Uuid => value
                .as_str()
                .and_then(|text| Uuid::parse_str(text.trim()).ok())
                .map(|uuid| Value::String(uuid.to_string()))
                .ok_or_else(|| {
                    ValidationIssue::new(IssueCode::InvalidString, "Invalid uuid")
                        .with_received(value.clone())
                }),
            Self::Enum(members) => match value.as_str() {
                Some(text) if members.contains(&text) => Ok(Value::String(text.to_owned())),
                _ => Err(ValidationIssue::new(
                    IssueCode::InvalidEnumValue,
                    format!("Invalid enum value. Expected {}", quoted(members)),
                )
                .with_received(value.clone())
                .with_options(members.iter().copied())),
            },
            Self::Optional(_) | Self::Nullable(_) | Self::Default(..) => self
                .validate(Some(value))?
                .ok_or_else(|| ValidationIssue::new(IssueCode::Required, "Required")),
        }
    }
}

fn received_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(tag: TypeTag, value: &Value) -> ValidationIssue {
    ValidationIssue::new(
        IssueCode::InvalidType,
        format!(
            "Expected {}, received {}",
            tag.label(),
            received_label(value)
        ),
    )
    .with_received(value.clone())
}

fn quoted(members: &[&str]) -> String {
    members
        .iter()
        .map(|member| format!("'{member}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn check_length(
    text: &str,
    min_len: Option<usize>,
    max_len: Option<usize>,
) -> Result<(), ValidationIssue> {
    let length = text.chars().count();
    if let Some(min) = min_len.filter(|min| length < *min) {
        return Err(ValidationIssue::new(
            IssueCode::TooSmall,
            format!("String must contain at least {min} character(s)"),
        ));
    }
    if let Some(max) = max_len.filter(|max| length > *max) {
        return Err(ValidationIssue::new(
            IssueCode::TooBig,
            format!("String must contain at most {max} character(s)"),
        ));
    }
    Ok(())
}

fn check_bounds(number: i64, min: Option<i64>, max: Option<i64>) -> Result<(), ValidationIssue> {
    if let Some(min) = min.filter(|min| number < *min) {
        return Err(ValidationIssue::new(
            IssueCode::TooSmall,
            format!("Number must be greater than or equal to {min}"),
        )
        .with_received(Value::from(number)));
    }
    if let Some(max) = max.filter(|max| number > *max) {
        return Err(ValidationIssue::new(
            IssueCode::TooBig,
            format!("Number must be less than or equal to {max}"),
        )
        .with_received(Value::from(number)));
    }
    Ok(())
}

/// Named parameter of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryField {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: QuerySchema,
}

impl QueryField {
    /// Field `name` validated by `schema`.
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, schema: QuerySchema) -> Self {
        Self {
            name,
            description,
            schema,
        }
    }
}

/// Validate `input` against `fields`.
///
/// The result holds the coerced value of every present or defaulted field.
/// Keys not named by any field are rejected.
///
/// # Errors
///
/// Returns every issue found, each addressed by its parameter name.
pub fn validate_fields(
    fields: &[QueryField],
    input: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<ValidationIssue>> {
    let mut output = Map::new();
    let mut issues = Vec::new();

    for field in fields {
        match field.schema.validate(input.get(field.name)) {
            Ok(Some(value)) => {
                output.insert(field.name.to_owned(), value);
            }
            Ok(None) => {}
            Err(issue) => issues.push(issue.at(field.name)),
        }
    }

    for key in input.keys() {
        if !fields.iter().any(|field| field.name == key) {
            issues.push(
                ValidationIssue::new(
                    IssueCode::UnrecognizedKey,
                    format!("Unrecognized key: '{key}'"),
                )
                .at(key.clone()),
            );
        }
    }

    if issues.is_empty() {
        Ok(output)
    } else {
        Err(issues)
    }
}

fn parameter_schema(doc: &ParamDoc) -> Schema {
    let schema_type = match doc.type_tag {
        TypeTag::Integer => Type::Integer,
        TypeTag::Boolean => Type::Boolean,
        TypeTag::String | TypeTag::Uuid | TypeTag::Enum => Type::String,
    };
    let mut builder = ObjectBuilder::new()
        .schema_type(schema_type)
        .minimum(doc.min)
        .maximum(doc.max)
        .min_length(doc.min_len)
        .max_length(doc.max_len)
        .default(doc.default.clone());
    if matches!(doc.type_tag, TypeTag::Uuid) {
        builder = builder.format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid)));
    }
    if let Some(members) = doc.enum_members {
        builder = builder.enum_values(Some(members.iter().copied()));
    }
    Schema::Object(builder.build())
}

/// OpenAPI query parameters documenting `fields`.
#[must_use]
pub fn openapi_parameters(fields: &[QueryField]) -> Vec<Parameter> {
    fields
        .iter()
        .map(|field| {
            let doc = field.schema.describe();
            let required = if doc.required {
                Required::True
            } else {
                Required::False
            };
            ParameterBuilder::new()
                .name(field.name)
                .parameter_in(ParameterIn::Query)
                .required(required)
                .description(Some(field.description))
                .schema(Some(RefOr::T(parameter_schema(&doc))))
                .build()
        })
        .collect()
}

/// Query parameter struct whose shape is declared by [`QueryField`]s.
///
/// Implementors deserialize from the coerced map produced by
/// [`validate_fields`], so field names must match the declared names.
pub trait QueryParams: serde::de::DeserializeOwned {
    /// Parameters accepted by the endpoint.
    fn fields() -> Vec<QueryField>;
}

/// Implement [`utoipa::IntoParams`] for a [`QueryParams`] type from its
/// declared fields.
macro_rules! document_query_params {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::utoipa::IntoParams for $ty {
                fn into_params(
                    _parameter_in_provider: impl Fn() -> Option<::utoipa::openapi::path::ParameterIn>,
                ) -> Vec<::utoipa::openapi::path::Parameter> {
                    $crate::inbound::http::query_schema::openapi_parameters(
                        &<$ty as $crate::inbound::http::query_schema::QueryParams>::fields(),
                    )
                }
            }
        )+
    };
}

pub(crate) use document_query_params;

/// Standard `page`/`limit` pair shared by every list endpoint.
#[must_use]
pub fn pagination_fields() -> [QueryField; 2] {
    [
        QueryField::new(
            "page",
            "One-based page number.",
            QuerySchema::integer()
                .min(1)
                .max(i64::from(u32::MAX))
                .with_default(1),
        ),
        QueryField::new(
            "limit",
            "Items per page.",
            QuerySchema::integer()
                .min(1)
                .max(i64::from(pagination::MAX_LIMIT))
                .with_default(i64::from(pagination::DEFAULT_LIMIT)),
        ),
    ]
}

#[cfg(test)]
#[path = "query_schema_tests.rs"]
mod tests;
