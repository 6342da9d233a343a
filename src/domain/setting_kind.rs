// SPDX-License-Identifier: MIT OR Apache-2.0

//! Setting kinds and typed values with coercion rules.
//!
//! Every setting is fixed to one [`SettingKind`] at construction. Raw strings
//! handed to a setting are coerced into a [`TypedValue`] of that kind, and the
//! typed value's canonical rendering is what gets stored and persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind a setting is fixed to for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Free-form text.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// A finite 64-bit floating point number.
    Double,
    /// `true` or `false`.
    Boolean,
    /// One of a fixed list of variant names.
    Enum,
}

impl SettingKind {
    /// Infers the kind of a default value.
    ///
    /// Tries Boolean, then Integer, then Double; anything else is a String.
    /// Enum settings are never inferred, they are declared explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use propcfg::domain::SettingKind;
    ///
    /// assert_eq!(SettingKind::infer("TRUE"), SettingKind::Boolean);
    /// assert_eq!(SettingKind::infer("30"), SettingKind::Integer);
    /// assert_eq!(SettingKind::infer("0.75"), SettingKind::Double);
    /// assert_eq!(SettingKind::infer("localhost"), SettingKind::String);
    /// ```
    pub fn infer(default: &str) -> Self {
        TypedValue::infer(default).kind()
    }

    /// Returns `true` for the kinds that accept minimum and maximum bounds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, SettingKind::Integer | SettingKind::Double)
    }

    /// Returns `true` if values of this kind are wrapped in double quotes
    /// when persisted.
    pub fn is_quoted(&self) -> bool {
        matches!(self, SettingKind::String)
    }

    /// Coerces a raw string into a typed value of this kind.
    ///
    /// Returns `None` if the string cannot be coerced. `variants` is only
    /// consulted for [`SettingKind::Enum`].
    pub fn coerce(&self, raw: &str, variants: &[String]) -> Option<TypedValue> {
        match self {
            SettingKind::String => Some(TypedValue::String(raw.to_string())),
            SettingKind::Integer => raw.trim().parse::<i64>().ok().map(TypedValue::Integer),
            SettingKind::Double => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(TypedValue::Double),
            SettingKind::Boolean => parse_bool(raw).map(TypedValue::Boolean),
            SettingKind::Enum => {
                let wanted = raw.trim();
                variants
                    .iter()
                    .find(|v| v.eq_ignore_ascii_case(wanted))
                    .map(|v| TypedValue::Enum(v.clone()))
            }
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingKind::String => "string",
            SettingKind::Integer => "integer",
            SettingKind::Double => "double",
            SettingKind::Boolean => "boolean",
            SettingKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// Recognizes `true`/`yes`/`on`/`1` and `false`/`no`/`off`/`0`, case-insensitively.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// A value coerced to its setting's kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Free-form text.
    String(String),
    /// A signed integer.
    Integer(i64),
    /// A finite floating point number.
    Double(f64),
    /// A boolean flag.
    Boolean(bool),
    /// The declared spelling of an enum variant.
    Enum(String),
}

impl TypedValue {
    /// Interprets a default value, trying Boolean, Integer and Double before
    /// falling back to String.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return TypedValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return TypedValue::Boolean(false);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return TypedValue::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(d) if d.is_finite() => TypedValue::Double(d),
            _ => TypedValue::String(raw.to_string()),
        }
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> SettingKind {
        match self {
            TypedValue::String(_) => SettingKind::String,
            TypedValue::Integer(_) => SettingKind::Integer,
            TypedValue::Double(_) => SettingKind::Double,
            TypedValue::Boolean(_) => SettingKind::Boolean,
            TypedValue::Enum(_) => SettingKind::Enum,
        }
    }

    /// Returns the numeric value, widening integers, or `None` for other kinds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Integer(i) => Some(*i as f64),
            TypedValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Clamps a numeric value into the inclusive `[minimum, maximum]` range.
    ///
    /// The maximum is checked first. Integer values clamp to the nearest
    /// integer that still lies inside the bound. Non-numeric values are
    /// returned unchanged.
    pub fn clamp(self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        match self {
            TypedValue::Integer(i) => {
                let value = i as f64;
                match (minimum, maximum) {
                    (_, Some(max)) if value > max => TypedValue::Integer(max.floor() as i64),
                    (Some(min), _) if value < min => TypedValue::Integer(min.ceil() as i64),
                    _ => TypedValue::Integer(i),
                }
            }
            TypedValue::Double(d) => match (minimum, maximum) {
                (_, Some(max)) if d > max => TypedValue::Double(max),
                (Some(min), _) if d < min => TypedValue::Double(min),
                _ => TypedValue::Double(d),
            },
            other => other,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) | TypedValue::Enum(s) => f.write_str(s),
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Double(d) => write!(f, "{}", d),
            TypedValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}
