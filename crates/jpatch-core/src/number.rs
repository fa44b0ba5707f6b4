use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number as JsonNumber;

use crate::DecodeError;

#[derive(Clone, Copy, Debug)]
enum Repr {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// A JSON number.
///
/// Integers keep their exact value; everything else is an IEEE-754 double.
/// Equality is numeric, so `1` and `1.0` compare equal.
///
/// ```
/// # use jpatch_core::Number;
/// let int = Number::from(1_i64);
/// let float = Number::new(1.0)?;
/// assert_eq!(int, float);
/// assert_eq!(Number::from(u64::MAX).to_string(), "18446744073709551615");
/// # Ok::<(), jpatch_core::DecodeError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Number(Repr);

impl Number {
    /// Creates a floating-point [`Number`] after validating finiteness.
    pub fn new(value: f64) -> Result<Self, DecodeError> {
        if value.is_finite() {
            Ok(Self(Repr::Float(value)))
        } else {
            Err(DecodeError::NotFinite { value })
        }
    }

    /// Returns the value as `f64`, possibly losing precision for large integers.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self.0 {
            Repr::Int(i) => i as f64,
            Repr::UInt(u) => u as f64,
            Repr::Float(f) => f,
        }
    }

    /// Returns the value as `i64` when it is an integer in range.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self.0 {
            Repr::Int(i) => Some(i),
            Repr::UInt(u) => i64::try_from(u).ok(),
            Repr::Float(_) => None,
        }
    }

    /// Returns the value as `u64` when it is a non-negative integer in range.
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        match self.0 {
            Repr::Int(i) => u64::try_from(i).ok(),
            Repr::UInt(u) => Some(u),
            Repr::Float(_) => None,
        }
    }

    /// Converts a `serde_json::Number`, keeping integers exact.
    pub fn from_json_number(number: &JsonNumber) -> Result<Self, DecodeError> {
        if let Some(i) = number.as_i64() {
            return Ok(Self(Repr::Int(i)));
        }
        if let Some(u) = number.as_u64() {
            return Ok(Self(Repr::UInt(u)));
        }
        match number.as_f64() {
            Some(f) => Self::new(f),
            None => Err(DecodeError::NumberOutOfRange { value: number.to_string() }),
        }
    }

    /// Converts the number into a `serde_json::Number`.
    ///
    /// Floats with no fractional part are emitted as integers when they fit,
    /// so `2.0` renders as `2`.
    #[must_use]
    pub fn to_json_number(self) -> JsonNumber {
        match self.0 {
            Repr::Int(i) => JsonNumber::from(i),
            Repr::UInt(u) => JsonNumber::from(u),
            Repr::Float(f) => {
                if f.fract() == 0.0 && !(f == 0.0 && f.is_sign_negative()) {
                    if (i64::MIN as f64) <= f && f < (i64::MAX as f64) {
                        return JsonNumber::from(f as i64);
                    }
                    if f >= 0.0 && f < (u64::MAX as f64) {
                        return JsonNumber::from(f as u64);
                    }
                }
                // Finite by construction, so from_f64 cannot fail.
                JsonNumber::from_f64(f).unwrap_or_else(|| JsonNumber::from(0))
            }
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Repr::Int(a), Repr::Int(b)) => a == b,
            (Repr::UInt(a), Repr::UInt(b)) => a == b,
            (Repr::Int(a), Repr::UInt(b)) | (Repr::UInt(b), Repr::Int(a)) => {
                u64::try_from(a).is_ok_and(|a| a == b)
            }
            (Repr::Int(i), Repr::Float(f)) | (Repr::Float(f), Repr::Int(i)) => {
                integer_equals_float(i128::from(i), f)
            }
            (Repr::UInt(u), Repr::Float(f)) | (Repr::Float(f), Repr::UInt(u)) => {
                integer_equals_float(i128::from(u), f)
            }
            (Repr::Float(a), Repr::Float(b)) => a == b,
        }
    }
}

/// Exact comparison; casting the integer to `f64` would round above 2^53.
fn integer_equals_float(int: i128, float: f64) -> bool {
    // [-2^63, 2^64) covers every i64 and u64.
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 18_446_744_073_709_551_616.0;
    if float.fract() != 0.0 || !(LOWER..UPPER).contains(&float) {
        return false;
    }
    float as i128 == int
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(Repr::Int(value))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self(Repr::UInt(value))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self(Repr::Int(i64::from(value)))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_number())
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_number().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = JsonNumber::deserialize(deserializer)?;
        Self::from_json_number(&number).map_err(serde::de::Error::custom)
    }
}
