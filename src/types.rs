use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ModuleError;

/// Desired state of the object on the appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl FromStr for State {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(State::Present),
            "absent" => Ok(State::Absent),
            other => Err(ModuleError::validation(format!(
                "value of state must be one of: present, absent, got: {}",
                other
            ))),
        }
    }
}

/// Value type of an extensible attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    Date,
    Email,
    Enum,
    Integer,
    #[default]
    String,
    Url,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Date => "DATE",
            AttributeType::Email => "EMAIL",
            AttributeType::Enum => "ENUM",
            AttributeType::Integer => "INTEGER",
            AttributeType::String => "STRING",
            AttributeType::Url => "URL",
        }
    }

    /// Whether `min`/`max` mean anything for this type
    pub fn supports_bounds(&self) -> bool {
        matches!(self, AttributeType::Integer | AttributeType::String)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DATE" => Ok(AttributeType::Date),
            "EMAIL" => Ok(AttributeType::Email),
            "ENUM" => Ok(AttributeType::Enum),
            "INTEGER" => Ok(AttributeType::Integer),
            "STRING" => Ok(AttributeType::String),
            "URL" => Ok(AttributeType::Url),
            other => Err(ModuleError::validation(format!(
                "value of type must be one of: DATE, EMAIL, ENUM, INTEGER, STRING, URL, got: {}",
                other
            ))),
        }
    }
}

/// Before/after view of a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    pub before: Value,
    pub after: Value,
}

/// Outcome of one reconciliation, returned to the caller as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,
    /// WAPI reference of the object that was touched
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<String>,
}

impl RunResult {
    pub fn unchanged(object_ref: Option<String>) -> Self {
        Self {
            changed: false,
            diff: None,
            object_ref,
        }
    }
}
