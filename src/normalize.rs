//! Parameter normalization for list-of-dict arguments.
//!
//! WAPI errors out when a struct member is sent as `null`, so every entry is
//! reduced to the keys that actually carry a value before it leaves the
//! process.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ModuleError, Result};

/// Remove every null-valued key from a mapping.
pub fn strip_nulls(entry: &Map<String, Value>) -> Map<String, Value> {
    entry
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn entry_as_object<'a>(entry: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    entry
        .as_object()
        .ok_or_else(|| ModuleError::validation(format!("each {} entry must be a mapping", what)))
}

/// Normalize DHCP-style option entries into WAPI structs of the form
/// `{name, num, value, use_option, vendor_class}`.
///
/// Null members are dropped and each entry must keep at least one of `name`
/// or `num`. Whether the two agree is left for WAPI to decide.
pub fn normalize_options(entries: &[Value]) -> Result<Vec<Map<String, Value>>> {
    let mut options = Vec::with_capacity(entries.len());
    for entry in entries {
        let opt = strip_nulls(entry_as_object(entry, "option")?);
        if !opt.contains_key("name") && !opt.contains_key("num") {
            return Err(ModuleError::validation(
                "one of `name` or `num` is required for option value",
            ));
        }
        options.push(opt);
    }
    debug!(count = options.len(), "normalized option entries");
    Ok(options)
}

/// Normalize `list_values` entries: nulls and `_`-prefixed hint keys
/// (e.g. `_struct`) are removed, order is kept.
pub fn normalize_list_values(entries: &[Value]) -> Result<Vec<Map<String, Value>>> {
    entries
        .iter()
        .map(|entry| {
            let mut value = strip_nulls(entry_as_object(entry, "list_values")?);
            value.retain(|k, _| !k.starts_with('_'));
            Ok(value)
        })
        .collect()
}

/// Field transform wrapper around [`normalize_options`].
pub fn options_transform(value: &Value) -> Result<Value> {
    let entries = as_list(value, "options")?;
    let options = normalize_options(entries)?;
    Ok(Value::Array(options.into_iter().map(Value::Object).collect()))
}

/// Field transform wrapper around [`normalize_list_values`].
pub fn list_values_transform(value: &Value) -> Result<Value> {
    let entries = as_list(value, "list_values")?;
    let values = normalize_list_values(entries)?;
    Ok(Value::Array(values.into_iter().map(Value::Object).collect()))
}

fn as_list<'a>(value: &'a Value, field: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ModuleError::validation(format!("`{}` must be a list", field)))
}
