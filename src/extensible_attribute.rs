//! The `extensibleattributedef` object: its field schema and a typed
//! builder for callers that assemble module arguments in code.

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::constants::ATTRIBUTE_TYPES;
use crate::error::Result;
use crate::normalize::list_values_transform;
use crate::params::Params;
use crate::schema::{FieldKind, FieldSpec, IbSpec};
use crate::types::{AttributeType, State};

static IB_SPEC: Lazy<IbSpec> = Lazy::new(|| {
    IbSpec::new(vec![
        FieldSpec::new("comment", FieldKind::Str),
        FieldSpec::new("default_value", FieldKind::Str),
        FieldSpec::new("list_values", FieldKind::List)
            .elements(FieldKind::Dict)
            .transform(list_values_transform),
        FieldSpec::new("max", FieldKind::Str).transform(bound_transform),
        FieldSpec::new("min", FieldKind::Str).transform(bound_transform),
        FieldSpec::new("name", FieldKind::Str).required().ib_req(),
        FieldSpec::new("type", FieldKind::Str)
            .required()
            .choices(ATTRIBUTE_TYPES),
    ])
    .advisor(ignored_settings)
});

/// Field schema of `extensibleattributedef`.
pub fn ib_spec() -> &'static IbSpec {
    &IB_SPEC
}

/// WAPI stores `min`/`max` as unsigned integers. Numeric strings are sent
/// as numbers; anything else goes through untouched for WAPI to reject.
fn bound_transform(value: &Value) -> Result<Value> {
    Ok(match value.as_str().map(|s| s.trim().parse::<u64>()) {
        Some(Ok(n)) => json!(n),
        _ => value.clone(),
    })
}

/// Settings that are accepted but have no effect for the declared type.
pub fn ignored_settings(params: &Params) -> Vec<String> {
    let Some(attribute_type) = params
        .field_str("type")
        .and_then(|t| t.parse::<AttributeType>().ok())
    else {
        return Vec::new();
    };

    let mut ignored = Vec::new();
    if attribute_type != AttributeType::Enum && params.field("list_values").is_some() {
        ignored.push(format!("list_values is only used by ENUM attributes, not {}", attribute_type));
    }
    if !attribute_type.supports_bounds() {
        for bound in ["min", "max"] {
            if params.field(bound).is_some() {
                ignored.push(format!("{} is not applicable to {} attributes", bound, attribute_type));
            }
        }
    }
    ignored
}

/// Typed description of an extensible attribute definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensibleAttributeDef {
    pub name: String,
    pub attribute_type: AttributeType,
    pub comment: Option<String>,
    pub default_value: Option<String>,
    pub list_values: Vec<String>,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl ExtensibleAttributeDef {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            comment: None,
            default_value: None,
            list_values: Vec::new(),
            min: None,
            max: None,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn list_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn bounds(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Module arguments for this definition in the given state.
    ///
    /// The result carries no `provider`; callers merge one in or rely on
    /// the environment/config fallbacks.
    pub fn to_args(&self, state: State) -> Value {
        let mut args = Map::new();
        args.insert("name".into(), json!(self.name));
        args.insert("type".into(), json!(self.attribute_type.as_str()));
        args.insert("state".into(), json!(state));
        if let Some(comment) = &self.comment {
            args.insert("comment".into(), json!(comment));
        }
        if let Some(default_value) = &self.default_value {
            args.insert("default_value".into(), json!(default_value));
        }
        if !self.list_values.is_empty() {
            let values: Vec<Value> = self
                .list_values
                .iter()
                .map(|v| json!({ "value": v }))
                .collect();
            args.insert("list_values".into(), Value::Array(values));
        }
        if let Some(min) = self.min {
            args.insert("min".into(), json!(min.to_string()));
        }
        if let Some(max) = self.max {
            args.insert("max".into(), json!(max.to_string()));
        }
        Value::Object(args)
    }
}
