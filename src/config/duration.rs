//! Signed time intervals with a textual form such as `1h30m` or `-1.5s`.
//!
//! # Design Decisions
//! - Stored as a signed nanosecond count, so zero and negative values are
//!   representable; range checks are left to validation
//! - `Display` emits the shortest canonical string and `FromStr` accepts
//!   everything `Display` emits, so text always round-trips by value
//! - Serialized as a string in config files

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Magnitude of `i64::MIN`, the largest accumulated value a parse may reach.
const MAX_MAGNITUDE: u64 = 1 << 63;

/// Errors produced when parsing duration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    /// Empty input or a component that is not `<number><unit>`.
    #[error("invalid duration {0:?}")]
    Invalid(String),

    /// A number with no unit after it.
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// A unit outside `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    /// The value does not fit in a signed 64-bit nanosecond count.
    #[error("duration {0:?} out of range")]
    Overflow(String),
}

/// A signed time interval with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    nanos: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { nanos: 0 };

    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self {
            nanos: secs.saturating_mul(SECOND as i64),
        }
    }

    pub const fn from_mins(mins: i64) -> Self {
        Self {
            nanos: mins.saturating_mul(MINUTE as i64),
        }
    }

    pub const fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub const fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    pub const fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Converts to a `std::time::Duration`, or `None` if negative.
    pub fn to_std(&self) -> Option<std::time::Duration> {
        u64::try_from(self.nanos)
            .ok()
            .map(std::time::Duration::from_nanos)
    }
}

impl From<std::time::Duration> for Duration {
    /// Saturates at the largest representable interval.
    fn from(d: std::time::Duration) -> Self {
        Self {
            nanos: i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        }
    }
}

fn unit_scale(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Consumes leading decimal digits. `None` if the value exceeds `MAX_MAGNITUDE`.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    for b in s[..end].bytes() {
        if x > MAX_MAGNITUDE / 10 {
            return None;
        }
        x = x * 10 + u64::from(b - b'0');
        if x > MAX_MAGNITUDE {
            return None;
        }
    }
    Some((x, &s[end..]))
}

/// Consumes the digits after a decimal point, returning the value and its
/// power-of-ten scale. Digits beyond what fits are dropped.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for b in s[..end].bytes() {
        if overflow {
            continue;
        }
        if x > (MAX_MAGNITUDE - 1) / 10 {
            overflow = true;
            continue;
        }
        let y = x * 10 + u64::from(b - b'0');
        if y > MAX_MAGNITUDE {
            overflow = true;
            continue;
        }
        x = y;
        scale *= 10.0;
    }
    (x, scale, &s[end..])
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError::Invalid(input.to_string());
        let overflow = || DurationParseError::Overflow(input.to_string());

        let mut s = input;
        let mut negative = false;
        if let Some(rest) = s.strip_prefix('-') {
            negative = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest;
        }

        if s == "0" {
            return Ok(Duration::ZERO);
        }
        if s.is_empty() {
            return Err(invalid());
        }

        let mut total: u64 = 0;
        while !s.is_empty() {
            if !s.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
                return Err(invalid());
            }

            let (mut value, rest) = leading_int(s).ok_or_else(invalid)?;
            let has_int = rest.len() != s.len();
            s = rest;

            let mut frac = 0;
            let mut scale = 1.0;
            let mut has_frac = false;
            if let Some(rest) = s.strip_prefix('.') {
                let (f, sc, rest_after) = leading_fraction(rest);
                has_frac = rest_after.len() != rest.len();
                frac = f;
                scale = sc;
                s = rest_after;
            }
            if !has_int && !has_frac {
                return Err(invalid());
            }

            let unit_end = s
                .find(|c: char| c == '.' || c.is_ascii_digit())
                .unwrap_or(s.len());
            if unit_end == 0 {
                return Err(DurationParseError::MissingUnit(input.to_string()));
            }
            let unit = &s[..unit_end];
            s = &s[unit_end..];
            let unit_nanos = unit_scale(unit).ok_or_else(|| DurationParseError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

            if value > MAX_MAGNITUDE / unit_nanos {
                return Err(overflow());
            }
            value *= unit_nanos;
            if frac > 0 {
                value += (frac as f64 * (unit_nanos as f64 / scale)) as u64;
                if value > MAX_MAGNITUDE {
                    return Err(overflow());
                }
            }
            total = total.checked_add(value).ok_or_else(overflow)?;
            if total > MAX_MAGNITUDE {
                return Err(overflow());
            }
        }

        let nanos = if negative {
            0i64.checked_sub_unsigned(total).ok_or_else(overflow)?
        } else {
            i64::try_from(total).map_err(|_| overflow())?
        };
        Ok(Duration { nanos })
    }
}

/// Splits `v` into `v / 10^prec` and a `.ddd` suffix with trailing zeros
/// trimmed (empty when the remainder is zero).
fn split_fraction(v: u64, prec: u32) -> (u64, String) {
    let divisor = 10u64.pow(prec);
    let remainder = v % divisor;
    if remainder == 0 {
        return (v / divisor, String::new());
    }
    let digits = format!("{:0width$}", remainder, width = prec as usize);
    (v / divisor, format!(".{}", digits.trim_end_matches('0')))
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.nanos.unsigned_abs();
        if magnitude == 0 {
            return f.write_str("0s");
        }
        if self.nanos < 0 {
            f.write_str("-")?;
        }

        if magnitude < SECOND {
            let (prec, unit) = if magnitude < MICROSECOND {
                (0, "ns")
            } else if magnitude < MILLISECOND {
                (3, "\u{00b5}s")
            } else {
                (6, "ms")
            };
            let (whole, fraction) = split_fraction(magnitude, prec);
            return write!(f, "{whole}{fraction}{unit}");
        }

        let (secs, fraction) = split_fraction(magnitude, 9);
        let hours = secs / 3600;
        let minutes = (secs / 60) % 60;
        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write!(f, "{}{fraction}s", secs % 60)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string such as \"60s\" or \"1h30m\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DurationVisitor)
    }
}
