use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Thousandths per point.
pub const SCALE: i64 = 1000;

/// Fixed-decimal score value (three fractional digits).
///
/// Deltas such as `0.1` or `-2.5` are common in admin configs; keeping them
/// as scaled integers makes every sum exact and order independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Points(i64);

impl Points {
    pub const ZERO: Points = Points(0);

    /// Saturates at the i64 bounds.
    pub const fn from_whole(n: i64) -> Self {
        Points(n.saturating_mul(SCALE))
    }

    pub const fn from_millis(millis: i64) -> Self {
        Points(millis)
    }

    /// Rounds to the nearest thousandth. Non-finite or out-of-range input is rejected.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * SCALE as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Points(scaled as i64))
    }

    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        t.parse::<f64>().ok().and_then(Self::from_f64)
    }

    pub const fn millis(self) -> i64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub const fn is_whole(self) -> bool {
        self.0 % SCALE == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn abs(self) -> Self {
        Points(self.0.saturating_abs())
    }

    /// `self * count`, saturating at the i64 bounds.
    pub fn times(self, count: u32) -> Self {
        Points(self.0.saturating_mul(count as i64))
    }
}

impl Add for Points {
    type Output = Points;
    fn add(self, rhs: Points) -> Points {
        Points(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Points {
    type Output = Points;
    fn sub(self, rhs: Points) -> Points {
        Points(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Points {
    type Output = Points;
    fn neg(self) -> Points {
        Points(self.0.saturating_neg())
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Points {
        iter.fold(Points::ZERO, |acc, p| acc + p)
    }
}

impl From<i64> for Points {
    fn from(n: i64) -> Self {
        Points::from_whole(n)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let frac = abs % SCALE as u64;
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 / SCALE)
        } else {
            serializer.serialize_f64(self.to_f64())
        }
    }
}

struct PointsVisitor;

impl<'de> Visitor<'de> for PointsVisitor {
    type Value = Points;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Points, E> {
        Ok(Points(v.saturating_mul(SCALE)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Points, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("points out of range"))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Points, E> {
        Points::from_f64(v).ok_or_else(|| E::custom(format!("invalid points value {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Points, E> {
        if v.trim().is_empty() {
            return Ok(Points::ZERO);
        }
        Points::parse(v).ok_or_else(|| E::custom(format!("invalid points value '{}'", v)))
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Points, D::Error> {
        deserializer.deserialize_any(PointsVisitor)
    }
}
