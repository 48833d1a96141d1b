use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

/// An in-memory tsion value tree.
///
/// Numbers carry IEEE-754 double semantics, including the three non-finite
/// sentinels; integers beyond exact `f64` range belong in [`Value::BigInt`].
/// Object keys keep their insertion order through encode and decode.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(*self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        self.as_bool().is_some()
    }

    pub fn is_number(&self) -> bool {
        matches!(*self, Value::Number(..))
    }

    pub fn is_big_int(&self) -> bool {
        matches!(*self, Value::BigInt(..))
    }

    pub fn is_str(&self) -> bool {
        self.as_str().is_some()
    }

    pub fn is_array(&self) -> bool {
        self.as_array().is_some()
    }

    pub fn is_object(&self) -> bool {
        self.as_object().is_some()
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    /// Returns the numeric value, converting a big integer when it is
    /// exactly representable as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Number(n) => Some(n),
            Value::BigInt(ref n) => n.to_f64().filter(|f| {
                BigInt::from_f64(*f).as_ref() == Some(n)
            }),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
                    Some(n as i64)
                } else {
                    None
                }
            }
            Value::BigInt(ref n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn as_big_int(&self) -> Option<&BigInt> {
        if let Value::BigInt(ref val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(ref val) = *self {
            Some(val.as_str())
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        if let Value::Array(ref array) = *self {
            Some(array)
        } else {
            None
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match *self {
            Value::Array(ref mut array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        if let Value::Object(ref map) = *self {
            Some(map)
        } else {
            None
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match *self {
            Value::Object(ref mut map) => Some(map),
            _ => None,
        }
    }
}

/// Equality with the round-trip semantics the codec guarantees: `NaN` is
/// equal to `NaN`.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Classify a signed integer: `Number` when exactly representable as `f64`,
/// `BigInt` otherwise.
pub(crate) fn int_value(v: i128) -> Value {
    let f = v as f64;
    if f.is_finite() && f as i128 == v {
        Value::Number(f)
    } else {
        Value::BigInt(BigInt::from(v))
    }
}

/// Unsigned counterpart of [`int_value`].
pub(crate) fn uint_value(v: u128) -> Value {
    let f = v as f64;
    if f.is_finite() && f as u128 == v {
        Value::Number(f)
    } else {
        Value::BigInt(BigInt::from(v))
    }
}

macro_rules! impl_from_small_int {
    ($($t:ty)*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty)*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    int_value(n as i128)
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty)*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    uint_value(n as u128)
                }
            }
        )*
    };
}

impl_from_small_int!(u8 u16 u32 i8 i16 i32 f32);
impl_from_signed!(i64 i128 isize);
impl_from_unsigned!(u64 u128 usize);

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::BigInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nan_equals_nan() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Number(f64::NAN), Value::Number(0.0));
    }

    #[test]
    fn kinds_are_distinct() {
        assert_ne!(Value::Null, Value::Bool(false));
        assert_ne!(Value::Number(0.0), Value::BigInt(BigInt::from(0)));
        assert_ne!(Value::String(String::new()), Value::Array(Vec::new()));
    }

    #[test]
    fn exact_integers_become_numbers() {
        assert_eq!(Value::from(42i64), Value::Number(42.0));
        assert_eq!(Value::from(1u64 << 53), Value::Number(9007199254740992.0));
        assert_eq!(Value::from(-1i64), Value::Number(-1.0));
    }

    #[test]
    fn inexact_integers_become_big_ints() {
        // 2^63 - 1 is not representable as f64
        let v = Value::from(i64::MAX);
        assert_eq!(v, Value::BigInt(BigInt::from(i64::MAX)));
        let v = Value::from(u64::MAX);
        assert_eq!(v, Value::BigInt(BigInt::from(u64::MAX)));
        // 2^64 itself is exactly representable
        assert_eq!(Value::from(1u128 << 64), Value::Number(18446744073709551616.0));
    }

    #[test]
    fn accessors() {
        let v = Value::from("hi");
        assert!(v.is_str());
        assert_eq!(v.as_str(), Some("hi"));
        assert_eq!(v.as_bool(), None);

        let mut v: Value = vec![Value::from(1), Value::from(2)].into();
        assert!(v.is_array());
        if let Some(arr) = v.as_array_mut() {
            arr.push(Value::Null);
        }
        assert_eq!(v.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn as_i64_bounds() {
        assert_eq!(Value::Number(3.0).as_i64(), Some(3));
        assert_eq!(Value::Number(3.5).as_i64(), None);
        assert_eq!(Value::Number(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::BigInt(BigInt::from(7)).as_i64(), Some(7));
    }

    #[test]
    fn as_f64_exact_big_int_only() {
        assert_eq!(Value::BigInt(BigInt::from(1i64 << 40)).as_f64(), Some((1i64 << 40) as f64));
        assert_eq!(Value::BigInt(BigInt::from(i64::MAX)).as_f64(), None);
    }
}
