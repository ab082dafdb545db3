//! Conversion from interpreter-native values into the generic [`Value`] model.
//!
//! Two rules do all the work here:
//!
//! 1. **Thunk chasing** — a callable is invoked with zero arguments and the
//!    result converted in its place, repeatedly, until a non-callable value
//!    appears. There is no depth limit; an infinite thunk chain is a bug in
//!    the calling script, not a condition this module detects.
//! 2. **Array/map disambiguation** — a table whose contiguous integer border
//!    is non-zero converts to a `Sequence` of exactly that many elements;
//!    any non-integer keys such a table also carries are dropped. A table
//!    with a zero border converts to a `Mapping` with stringified keys.

use crate::sandbox::error::SandboxError;
use crate::value::Value;
use mlua::{Table, Value as LuaValue};
use std::collections::BTreeMap;

/// Converts a script's top-level returned value.
///
/// After thunk chasing, the value must be a table; scalars and other types
/// are rejected with an `InvalidReturnValue` error.
pub(crate) fn script_value(value: LuaValue) -> Result<Value, SandboxError> {
    let resolved = chase(value)?;
    match resolved {
        LuaValue::Table(ref table) => table_to_value(table),
        other => Err(SandboxError::invalid_return_value(other.type_name())),
    }
}

/// Converts any interpreter value, chasing thunks first.
fn to_value(value: LuaValue) -> Result<Value, SandboxError> {
    let resolved = chase(value)?;
    match resolved {
        LuaValue::Boolean(b) => Ok(Value::Bool(b)),
        LuaValue::Integer(i) => Ok(Value::Number(i as f64)),
        LuaValue::Number(n) => Ok(Value::Number(n)),
        LuaValue::String(s) => Ok(Value::String(s.to_string_lossy().to_string())),
        LuaValue::Table(ref table) => table_to_value(table),
        _ => Ok(Value::Null),
    }
}

/// Invokes zero-argument callables until a non-callable value appears.
fn chase(mut value: LuaValue) -> Result<LuaValue, SandboxError> {
    while let LuaValue::Function(ref func) = value {
        value = func
            .call::<LuaValue>(())
            .map_err(|e| SandboxError::script(e.to_string()))?;
    }
    Ok(value)
}

/// Applies the disambiguation rule to a table.
fn table_to_value(table: &Table) -> Result<Value, SandboxError> {
    let border = table.raw_len();
    if border > 0 {
        let mut elements = Vec::with_capacity(border);
        for index in 1..=border {
            let element: LuaValue = table
                .raw_get(index)
                .map_err(|e| SandboxError::script(e.to_string()))?;
            elements.push(to_value(element)?);
        }
        Ok(Value::Sequence(elements))
    } else {
        let mut entries = BTreeMap::new();
        for pair in table.clone().pairs::<LuaValue, LuaValue>() {
            let (key, value) = pair.map_err(|e| SandboxError::script(e.to_string()))?;
            entries.insert(key_to_string(&key), to_value(value)?);
        }
        Ok(Value::Mapping(entries))
    }
}

/// Stringifies a mapping key with `tostring` semantics; integer-valued
/// numbers print without a decimal point.
fn key_to_string(key: &LuaValue) -> String {
    match key {
        LuaValue::String(s) => s.to_string_lossy().to_string(),
        LuaValue::Integer(i) => i.to_string(),
        LuaValue::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 {
                (*n as i64).to_string()
            } else {
                n.to_string()
            }
        }
        LuaValue::Boolean(b) => b.to_string(),
        other => other.type_name().to_string(),
    }
}
