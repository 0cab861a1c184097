// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key-presence accessors over loosely-typed JSON objects and argument arrays.
//
// A key that is missing or explicitly `null` reads as `None`. A key that is
// present with the wrong JSON type is an `InvalidArgument` error naming the
// key, which aborts the enclosing translation.

use serde_json::{Map, Value};

use crate::error::{MetricaError, Result};

pub(crate) type Object = Map<String, Value>;

/// Borrow `value` as a JSON object or fail with a message naming `what`.
pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| MetricaError::invalid(format!("{what} is not an object")))
}

fn present<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

pub(crate) fn opt_f64(obj: &Object, key: &str) -> Result<Option<f64>> {
    present(obj, key)
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| MetricaError::invalid(format!("field \"{key}\" is not a number")))
        })
        .transpose()
}

pub(crate) fn opt_f32(obj: &Object, key: &str) -> Result<Option<f32>> {
    Ok(opt_f64(obj, key)?.map(|v| v as f32))
}

pub(crate) fn opt_i64(obj: &Object, key: &str) -> Result<Option<i64>> {
    present(obj, key).map(|v| integral(v, key)).transpose()
}

pub(crate) fn opt_i32(obj: &Object, key: &str) -> Result<Option<i32>> {
    opt_i64(obj, key)?
        .map(|v| {
            i32::try_from(v)
                .map_err(|_| MetricaError::invalid(format!("field \"{key}\" is out of range")))
        })
        .transpose()
}

pub(crate) fn opt_bool(obj: &Object, key: &str) -> Result<Option<bool>> {
    present(obj, key)
        .map(|v| {
            v.as_bool()
                .ok_or_else(|| MetricaError::invalid(format!("field \"{key}\" is not a boolean")))
        })
        .transpose()
}

pub(crate) fn opt_str(obj: &Object, key: &str) -> Result<Option<String>> {
    present(obj, key)
        .map(|v| {
            v.as_str()
                .map(str::to_owned)
                .ok_or_else(|| MetricaError::invalid(format!("field \"{key}\" is not a string")))
        })
        .transpose()
}

pub(crate) fn req_str(obj: &Object, key: &str) -> Result<String> {
    opt_str(obj, key)?
        .ok_or_else(|| MetricaError::invalid(format!("missing required field \"{key}\"")))
}

/// Accept any JSON number with an integral value (`30` and `30.0` alike).
fn integral(v: &Value, key: &str) -> Result<i64> {
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    match v.as_f64() {
        // i64::MAX rounds up to 2^63 as f64, which does not fit.
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(MetricaError::invalid(format!(
            "field \"{key}\" is not an integer"
        ))),
    }
}

// -- Positional arguments --------------------------------------------------

fn arg<'a>(args: &'a [Value], index: usize, action: &str) -> Result<&'a Value> {
    args.get(index)
        .filter(|v| !v.is_null())
        .ok_or_else(|| MetricaError::invalid(format!("{action}: missing argument {index}")))
}

pub(crate) fn arg_str(args: &[Value], index: usize, action: &str) -> Result<String> {
    arg(args, index, action)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| MetricaError::invalid(format!("{action}: argument {index} is not a string")))
}

pub(crate) fn arg_bool(args: &[Value], index: usize, action: &str) -> Result<bool> {
    arg(args, index, action)?
        .as_bool()
        .ok_or_else(|| MetricaError::invalid(format!("{action}: argument {index} is not a boolean")))
}

pub(crate) fn arg_i32(args: &[Value], index: usize, action: &str) -> Result<i32> {
    let value = arg(args, index, action)?;
    let wide = integral(value, &index.to_string())
        .map_err(|_| MetricaError::invalid(format!("{action}: argument {index} is not an integer")))?;
    i32::try_from(wide)
        .map_err(|_| MetricaError::invalid(format!("{action}: argument {index} is out of range")))
}

pub(crate) fn arg_value<'a>(args: &'a [Value], index: usize, action: &str) -> Result<&'a Value> {
    arg(args, index, action)
}

/// Optional trailing argument: `None` when absent or `null`.
pub(crate) fn arg_opt(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !v.is_null())
}
