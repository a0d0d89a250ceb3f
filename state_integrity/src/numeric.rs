//! The validated-number helper shared by the migrator and the repairer.

use serde_json::{Map, Value};

use crate::error::{Diagnostic, Diagnostics, IntegrityError};
use crate::tree::{join, type_name};

/// Range and default of one governed numeric leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberSpec {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Round to the nearest integer and write as a JSON integer.
    pub integral: bool,
}

impl NumberSpec {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            integral: false,
        }
    }

    pub const fn integral(mut self) -> Self {
        self.integral = true;
        self
    }

    /// Coerce any JSON value into this range.
    pub fn coerce(&self, value: Option<&Value>) -> (f64, Coercion) {
        let (raw, parsed) = match value {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => (v, false),
                _ => return (self.default, Coercion::Defaulted),
            },
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => (v, true),
                _ => return (self.default, Coercion::Defaulted),
            },
            _ => return (self.default, Coercion::Defaulted),
        };

        let rounded = if self.integral { raw.round() } else { raw };
        let clamped = rounded.clamp(self.min, self.max);

        if clamped != raw {
            (clamped, Coercion::Clamped { from: raw })
        } else if parsed {
            (clamped, Coercion::Parsed)
        } else {
            (clamped, Coercion::Kept)
        }
    }
}

/// What [`NumberSpec::coerce`] had to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coercion {
    Kept,
    /// Read from a numeric string.
    Parsed,
    /// Out of range or fractional where an integer was required.
    Clamped { from: f64 },
    /// Missing or unreadable; the default was used.
    Defaulted,
}

/// JSON form of a number: integers are written without a fraction.
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

/// Coerce `map[key]` into `spec`, writing the result back only when it
/// changed. Returns the final value.
pub fn repair_number(
    map: &mut Map<String, Value>,
    key: &str,
    spec: NumberSpec,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let (value, coercion) = spec.coerce(map.get(key));
    let path = join(path, key);
    match coercion {
        Coercion::Kept if !spec.integral || map.get(key).is_some_and(is_integer) => return value,
        Coercion::Kept => diagnostics.push(Diagnostic::info(IntegrityError::range(
            path,
            format!("{} written as an integer", value),
        ))),
        Coercion::Parsed => diagnostics.push(Diagnostic::info(IntegrityError::range(
            path,
            format!("numeric string read as {}", value),
        ))),
        Coercion::Clamped { from } => diagnostics.push(Diagnostic::warning(
            IntegrityError::range(path, format!("{} clamped to {}", from, value)),
        )),
        Coercion::Defaulted => {
            let message = match map.get(key) {
                None => format!("missing, defaulted to {}", value),
                Some(other) => format!("unreadable {}, defaulted to {}", type_name(other), value),
            };
            diagnostics.push(Diagnostic::warning(IntegrityError::range(path, message)));
        }
    }
    map.insert(key.to_string(), number_value(value));
    value
}

/// Like [`repair_number`], for leaves that may be absent. Absent and null
/// leaves stay absent; unreadable ones are removed.
pub fn repair_optional_number(
    map: &mut Map<String, Value>,
    key: &str,
    spec: NumberSpec,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Option<f64> {
    let unreadable = match map.get(key) {
        None => return None,
        Some(Value::Null) => None,
        Some(value) if spec.coerce(Some(value)).1 == Coercion::Defaulted => Some(type_name(value)),
        Some(_) => return Some(repair_number(map, key, spec, path, diagnostics)),
    };

    if let Some(kind) = unreadable {
        diagnostics.push(Diagnostic::warning(IntegrityError::range(
            join(path, key),
            format!("unreadable {}, removed", kind),
        )));
    }
    map.remove(key);
    None
}
