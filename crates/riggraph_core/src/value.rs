// SPDX-License-Identifier: MIT OR Apache-2.0
//! The settable-value union accepted by [`Plug::set`](crate::Plug::set).
//!
//! [`Value`] is a closed tagged union of everything a variadic setter
//! call may carry: scalars, a matrix, a plug reference (meaning
//! "connect that plug into me"), or a nested sequence distributed
//! across compound children / array elements.

use crate::host::AttrValue;
use crate::plug::Plug;

/// One argument of a variadic plug assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Boolean scalar
    Bool(bool),
    /// String scalar
    Str(String),
    /// Row-major 4x4 matrix
    Matrix([[f64; 4]; 4]),
    /// A plug reference; assigning it connects that plug into the target
    Plug(Plug),
    /// Nested values, distributed positionally when the target is
    /// compound or array
    Seq(Vec<Value>),
}

impl Value {
    /// The value as a number, when it is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Interpret the argument list as a row-major 4x4 matrix.
    ///
    /// Succeeds only when the arguments flatten (through `Seq` nesting)
    /// to exactly 16 numeric values. Sixteen numbers are always a
    /// matrix, never sixteen independent scalar assignments.
    pub fn matrix16(args: &[Value]) -> Option<[[f64; 4]; 4]> {
        let mut flat = Vec::with_capacity(16);
        if !flatten_numbers(args, &mut flat) || flat.len() != 16 {
            return None;
        }
        let mut m = [[0.0; 4]; 4];
        for (i, v) in flat.into_iter().enumerate() {
            m[i / 4][i % 4] = v;
        }
        Some(m)
    }

    /// Convert a sole scalar argument into its typed host payload.
    pub(crate) fn to_attr_value(&self) -> Option<AttrValue> {
        match self {
            Self::Int(i) => Some(AttrValue::Int(*i)),
            Self::Float(f) => Some(AttrValue::Float(*f)),
            Self::Bool(b) => Some(AttrValue::Bool(*b)),
            Self::Str(s) => Some(AttrValue::String(s.clone())),
            Self::Matrix(m) => Some(AttrValue::Matrix(*m)),
            Self::Plug(_) | Self::Seq(_) => None,
        }
    }
}

fn flatten_numbers(args: &[Value], out: &mut Vec<f64>) -> bool {
    for arg in args {
        match arg {
            Value::Seq(inner) => {
                if !flatten_numbers(inner, out) {
                    return false;
                }
            }
            other => match other.as_number() {
                Some(n) => out.push(n),
                None => return false,
            },
        }
    }
    true
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<[[f64; 4]; 4]> for Value {
    fn from(v: [[f64; 4]; 4]) -> Self {
        Self::Matrix(v)
    }
}

impl From<Plug> for Value {
    fn from(v: Plug) -> Self {
        Self::Plug(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Seq(v)
    }
}
