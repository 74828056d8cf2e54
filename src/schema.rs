//! Field schemas for WAPI objects and the module arguments built from them.
//!
//! An [`IbSpec`] lists the fields of one WAPI object type together with the
//! WAPI-side flags (`ib_req`, transforms). [`argument_spec`] drops those flags
//! and adds the framework fields (`provider`, `state`), producing the
//! [`ArgumentSpec`] that incoming arguments are validated against.

use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::constants::{STATE_ABSENT, STATE_PRESENT};
use crate::error::{ModuleError, Result};
use crate::params::Params;

/// Rewrites a field value into its WAPI form, or rejects it.
pub type Transform = fn(&Value) -> Result<Value>;

/// Reports accepted settings that have no effect for the given arguments.
pub type Advisor = fn(&Params) -> Vec<String>;

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. Integers are accepted and stringified.
    Str,
    Int,
    Bool,
    /// A list whose entries are of `FieldSpec::elements` kind
    List,
    /// A mapping, optionally constrained by `FieldSpec::suboptions`
    Dict,
}

impl FieldKind {
    fn json_types(self) -> Vec<&'static str> {
        match self {
            FieldKind::Str => vec!["string", "integer"],
            FieldKind::Int => vec!["integer"],
            FieldKind::Bool => vec!["boolean"],
            FieldKind::List => vec!["array"],
            FieldKind::Dict => vec!["object"],
        }
    }
}

/// Specification for a single field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub choices: &'static [&'static str],
    /// Element kind for `List` fields
    pub elements: Option<FieldKind>,
    /// Nested fields for `Dict` fields
    pub suboptions: Vec<FieldSpec>,
    /// Field identifies the object on the appliance (used for lookups)
    pub ib_req: bool,
    pub transform: Option<Transform>,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            choices: &[],
            elements: None,
            suboptions: Vec::new(),
            ib_req: false,
            transform: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    pub fn elements(mut self, kind: FieldKind) -> Self {
        self.elements = Some(kind);
        self
    }

    pub fn suboptions(mut self, fields: Vec<FieldSpec>) -> Self {
        self.suboptions = fields;
        self
    }

    pub fn ib_req(mut self) -> Self {
        self.ib_req = true;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    fn json_schema(&self) -> Value {
        let mut types = self.kind.json_types();
        if !self.required {
            types.push("null");
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(types));

        if !self.choices.is_empty() {
            let mut allowed: Vec<Value> = self.choices.iter().map(|c| json!(c)).collect();
            if !self.required {
                allowed.push(Value::Null);
            }
            schema.insert("enum".to_string(), Value::Array(allowed));
        }

        if self.kind == FieldKind::Int {
            schema.insert("minimum".to_string(), json!(0));
        }

        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }

        if let Some(elements) = self.elements {
            schema.insert("items".to_string(), json!({ "type": elements.json_types() }));
        }

        if !self.suboptions.is_empty() {
            let (properties, required) = properties_of(&self.suboptions);
            schema.insert("properties".to_string(), Value::Object(properties));
            schema.insert("required".to_string(), json!(required));
            schema.insert("additionalProperties".to_string(), json!(false));
        }

        Value::Object(schema)
    }
}

fn properties_of(fields: &[FieldSpec]) -> (Map<String, Value>, Vec<&'static str>) {
    let properties = fields
        .iter()
        .map(|f| (f.name.to_string(), f.json_schema()))
        .collect();
    let required = fields.iter().filter(|f| f.required).map(|f| f.name).collect();
    (properties, required)
}

/// Field schema of one WAPI object type.
#[derive(Debug, Clone)]
pub struct IbSpec {
    fields: Vec<FieldSpec>,
    advisor: Option<Advisor>,
}

impl IbSpec {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            advisor: None,
        }
    }

    pub fn advisor(mut self, advisor: Advisor) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Warnings about arguments that are accepted but ignored.
    pub fn advise(&self, params: &Params) -> Vec<String> {
        self.advisor.map(|advise| advise(params)).unwrap_or_default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Run every field transform over the values that are set.
    pub fn apply_transforms(&self, values: &mut Map<String, Value>) -> Result<()> {
        for field in &self.fields {
            let Some(transform) = field.transform else {
                continue;
            };
            if let Some(value) = values.get(field.name).filter(|v| !v.is_null()) {
                let shaped = transform(value)?;
                debug!(field = field.name, "applied field transform");
                values.insert(field.name.to_string(), shaped);
            }
        }
        Ok(())
    }

    /// Shape a WAPI request body: declared fields only, unset ones omitted.
    pub fn payload(&self, values: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|f| {
                values
                    .get(f.name)
                    .filter(|v| !v.is_null())
                    .map(|v| (f.name.to_string(), v.clone()))
            })
            .collect()
    }

    /// The subset of a payload that identifies the object.
    pub fn identity(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|f| f.ib_req)
            .filter_map(|f| payload.get(f.name).map(|v| (f.name.to_string(), v.clone())))
            .collect()
    }
}

/// Argument view of an [`IbSpec`]: the WAPI-only flags are dropped.
pub fn normalize_ib_spec(spec: &IbSpec) -> Vec<FieldSpec> {
    spec.fields
        .iter()
        .map(|f| FieldSpec {
            ib_req: false,
            transform: None,
            ..f.clone()
        })
        .collect()
}

/// Connection fields every WAPI module accepts under `provider`.
///
/// No defaults here: unset keys fall back to the environment and the config
/// file before the built-in values apply (see `Provider::resolve`).
///
/// `ssl_verify` is read as `validate_certs`. The SSL warning and connection
/// pool keys are accepted so shared playbooks validate, and have no effect.
pub fn provider_spec() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("host", FieldKind::Str),
        FieldSpec::new("username", FieldKind::Str),
        FieldSpec::new("password", FieldKind::Str),
        FieldSpec::new("validate_certs", FieldKind::Bool),
        FieldSpec::new("ssl_verify", FieldKind::Bool),
        FieldSpec::new("silent_ssl_warnings", FieldKind::Bool),
        FieldSpec::new("http_request_timeout", FieldKind::Int),
        FieldSpec::new("http_pool_connections", FieldKind::Int),
        FieldSpec::new("http_pool_maxsize", FieldKind::Int),
        FieldSpec::new("max_retries", FieldKind::Int),
        FieldSpec::new("wapi_version", FieldKind::Str),
        FieldSpec::new("max_results", FieldKind::Int),
    ]
}

/// Compose the object fields with the framework's `provider` and `state`.
pub fn argument_spec(spec: &IbSpec) -> ArgumentSpec {
    let mut fields = vec![
        FieldSpec::new("provider", FieldKind::Dict).suboptions(provider_spec()),
        FieldSpec::new("state", FieldKind::Str)
            .default(json!(STATE_PRESENT))
            .choices(&[STATE_PRESENT, STATE_ABSENT]),
    ];
    fields.extend(normalize_ib_spec(spec));
    ArgumentSpec { fields }
}

/// Complete set of arguments a module accepts.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    fields: Vec<FieldSpec>,
}

impl ArgumentSpec {
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn to_json_schema(&self) -> Value {
        let (properties, required) = properties_of(&self.fields);
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Check arguments against the schema, reporting every violation at once.
    pub fn validate(&self, args: &Value) -> Result<()> {
        let schema = self.to_json_schema();
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| ModuleError::Config(format!("invalid argument schema: {}", e)))?;

        if let Err(errors) = compiled.validate(args) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(ModuleError::validation(format!(
                "invalid module arguments: {}",
                messages.join("; ")
            )));
        }
        Ok(())
    }

    /// Fill defaults for unset fields and stringify integers given for `Str`
    /// fields, recursing into `Dict` suboptions.
    pub fn apply_defaults(&self, args: &mut Map<String, Value>) {
        fill_defaults(&self.fields, args);
    }
}

fn fill_defaults(fields: &[FieldSpec], args: &mut Map<String, Value>) {
    for field in fields {
        let unset = args.get(field.name).map_or(true, Value::is_null);
        if unset {
            if let Some(default) = &field.default {
                args.insert(field.name.to_string(), default.clone());
            }
        }

        match args.get_mut(field.name) {
            Some(value @ Value::Number(_)) if field.kind == FieldKind::Str => {
                *value = Value::String(value.to_string());
            }
            Some(Value::Object(nested)) if !field.suboptions.is_empty() => {
                fill_defaults(&field.suboptions, nested);
            }
            _ => {}
        }
    }
}
