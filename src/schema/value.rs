//! Column data types and literal values
//!
//! Supported types mirror the fixed-width record layout of the log:
//! - bool, char (i8), short (i16), int (i32), long (i64), ulong (u64)
//! - float (f32), double (f64)
//! - string (fixed byte width)
//!
//! Literals are held in a widened form (`Value`) so that predicates and
//! column bounds can be compared and bucketized uniformly.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::index::BucketKey;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Bool,
    Char,
    Short,
    Int,
    Long,
    ULong,
    Float,
    Double,
    /// Fixed-width string of the given byte size
    String(usize),
}

impl DataType {
    /// Parses a type name as used in schema definitions.
    ///
    /// `size` is only consulted for strings.
    pub fn from_name(name: &str, size: Option<usize>) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bool" => Some(DataType::Bool),
            "char" => Some(DataType::Char),
            "short" => Some(DataType::Short),
            "int" => Some(DataType::Int),
            "long" => Some(DataType::Long),
            "ulong" => Some(DataType::ULong),
            "float" => Some(DataType::Float),
            "double" => Some(DataType::Double),
            "string" => size.filter(|s| *s > 0).map(DataType::String),
            _ => None,
        }
    }

    /// Returns the type name for messages and explain output
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Char => "char",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::ULong => "ulong",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::String(_) => "string",
        }
    }

    /// Width of the type in a record, in bytes
    pub fn size(&self) -> usize {
        match self {
            DataType::Bool | DataType::Char => 1,
            DataType::Short => 2,
            DataType::Int | DataType::Float => 4,
            DataType::Long | DataType::ULong | DataType::Double => 8,
            DataType::String(size) => *size,
        }
    }

    /// Returns true for integer and floating point types
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Bool | DataType::String(_))
    }

    /// Returns true for the signed and unsigned integer types
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Char | DataType::Short | DataType::Int | DataType::Long | DataType::ULong
        )
    }

    /// Returns true if values of this type can be bucketized into keys
    pub fn is_indexable(&self) -> bool {
        !matches!(self, DataType::String(_))
    }

    /// Smallest value of the type
    pub fn min_value(&self) -> Value {
        match self {
            DataType::Bool => Value::Bool(false),
            DataType::Char => Value::Int(i8::MIN as i64),
            DataType::Short => Value::Int(i16::MIN as i64),
            DataType::Int => Value::Int(i32::MIN as i64),
            DataType::Long => Value::Int(i64::MIN),
            DataType::ULong => Value::UInt(0),
            DataType::Float => Value::Float(f32::MIN as f64),
            DataType::Double => Value::Float(f64::MIN),
            DataType::String(_) => Value::Str(String::new()),
        }
    }

    /// Largest value of the type
    pub fn max_value(&self) -> Value {
        match self {
            DataType::Bool => Value::Bool(true),
            DataType::Char => Value::Int(i8::MAX as i64),
            DataType::Short => Value::Int(i16::MAX as i64),
            DataType::Int => Value::Int(i32::MAX as i64),
            DataType::Long => Value::Int(i64::MAX),
            DataType::ULong => Value::UInt(u64::MAX),
            DataType::Float => Value::Float(f32::MAX as f64),
            DataType::Double => Value::Float(f64::MAX),
            DataType::String(_) => Value::Str(String::new()),
        }
    }

    /// Returns true if a literal of this shape can be compared with the type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (DataType::Bool, Value::Bool(_)) => true,
            (DataType::String(_), Value::Str(_)) => true,
            (t, Value::Int(_) | Value::UInt(_) | Value::Float(_)) => t.is_numeric(),
            _ => false,
        }
    }

    /// Converts a JSON value into a literal of this type.
    ///
    /// Integer types are range-checked; strings must fit the declared width.
    pub fn value_from_json(&self, json: &serde_json::Value) -> Option<Value> {
        match (self, json) {
            (DataType::Bool, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
            (DataType::String(size), serde_json::Value::String(s)) => {
                (s.len() <= *size).then(|| Value::Str(s.clone()))
            }
            (DataType::ULong, serde_json::Value::Number(n)) => n.as_u64().map(Value::UInt),
            (DataType::Float | DataType::Double, serde_json::Value::Number(n)) => {
                n.as_f64().map(Value::Float)
            }
            (t, serde_json::Value::Number(n)) if t.is_numeric() => {
                let v = n.as_i64()?;
                let (min, max) = match (t.min_value(), t.max_value()) {
                    (Value::Int(min), Value::Int(max)) => (min, max),
                    _ => return None,
                };
                (min..=max).contains(&v).then_some(Value::Int(v))
            }
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String(size) => write!(f, "string({})", size),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// A literal value held by a predicate or a column bound
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    /// Any signed integer type
    Int(i64),
    /// Unsigned 64-bit integer
    UInt(u64),
    /// Any floating point type
    Float(f64),
    Str(String),
}

impl Value {
    /// Maps the value into the bucketized key domain.
    ///
    /// Numeric values land in bucket `floor(v / bucket_size)`; booleans map to
    /// 0 and 1 regardless of bucket size. Strings, non-finite floats and
    /// non-positive bucket sizes have no key.
    pub fn to_key(&self, bucket_size: f64) -> Option<BucketKey> {
        if !(bucket_size.is_finite() && bucket_size > 0.0) {
            return None;
        }

        match self {
            Value::Bool(b) => Some(BucketKey::new(*b as i128)),
            Value::Int(v) => Some(bucketize_integer(*v as i128, bucket_size)),
            Value::UInt(v) => Some(bucketize_integer(*v as i128, bucket_size)),
            Value::Float(v) if v.is_finite() => {
                Some(BucketKey::new((v / bucket_size).floor() as i128))
            }
            Value::Float(_) | Value::Str(_) => None,
        }
    }

    /// Orders two values of compatible shape.
    ///
    /// Integers compare exactly across signedness; any float involvement
    /// compares as f64. Returns `None` for incompatible shapes or NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::UInt(a), Value::UInt(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::UInt(b)) => Some((*a as i128).cmp(&(*b as i128))),
            (Value::UInt(a), Value::Int(b)) => Some((*a as i128).cmp(&(*b as i128))),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// Integral bucket sizes are divided exactly; fractional ones go through f64.
fn bucketize_integer(v: i128, bucket_size: f64) -> BucketKey {
    if bucket_size.fract() == 0.0 && bucket_size <= u64::MAX as f64 {
        BucketKey::new(v.div_euclid(bucket_size as i128))
    } else {
        BucketKey::new((v as f64 / bucket_size).floor() as i128)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}
