use std::time::Duration;
use thiserror::Error;

use crate::model::Type;

/// The reason a raw token could not be captured into an accumulator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCapture {
    /// The token does not convert to the native type.
    #[error("cannot convert '{token}' to {type_name}.")]
    InvalidConversion {
        /// The raw token.
        token: String,
        /// The type the token was converted to.
        type_name: Type,
    },
    /// A value was given to a negated (`--x`, `---key`) option.
    #[error("cannot give '{token}' to a negated option.")]
    NegatedValue {
        /// The raw token.
        token: String,
    },
}

/// The boolean accumulator.
///
/// Keeps every ingested flag in order, as well as the length of the trailing run of `true` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    values: Vec<bool>,
    run: usize,
}

impl Flags {
    pub(crate) fn push(&mut self, value: bool) {
        if value {
            self.run += 1;
        } else {
            self.run = 0;
        }

        self.values.push(value);
    }

    /// Every flag ingested, in order.
    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }

    /// The most recently ingested flag.
    pub fn last(&self) -> Option<bool> {
        self.values.last().copied()
    }

    /// How many `true` flags were ingested since the most recent `false`.
    pub fn run_count(&self) -> usize {
        self.run
    }

    /// Whether no flag has been ingested yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An append-only accumulator, one variant per [`Type`].
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    #[allow(missing_docs)]
    Bool(Flags),
    #[allow(missing_docs)]
    String(Vec<String>),
    #[allow(missing_docs)]
    Int(Vec<isize>),
    #[allow(missing_docs)]
    Int64(Vec<i64>),
    #[allow(missing_docs)]
    Uint(Vec<usize>),
    #[allow(missing_docs)]
    Uint64(Vec<u64>),
    #[allow(missing_docs)]
    Float64(Vec<f64>),
    #[allow(missing_docs)]
    Duration(Vec<Duration>),
}

impl Values {
    /// Create an empty accumulator for `ty`.
    pub fn empty(ty: Type) -> Self {
        match ty {
            Type::Bool => Values::Bool(Flags::default()),
            Type::String => Values::String(Vec::default()),
            Type::Int => Values::Int(Vec::default()),
            Type::Int64 => Values::Int64(Vec::default()),
            Type::Uint => Values::Uint(Vec::default()),
            Type::Uint64 => Values::Uint64(Vec::default()),
            Type::Float64 => Values::Float64(Vec::default()),
            Type::Duration => Values::Duration(Vec::default()),
        }
    }

    /// The [`Type`] this accumulator holds.
    pub fn ty(&self) -> Type {
        match self {
            Values::Bool(_) => Type::Bool,
            Values::String(_) => Type::String,
            Values::Int(_) => Type::Int,
            Values::Int64(_) => Type::Int64,
            Values::Uint(_) => Type::Uint,
            Values::Uint64(_) => Type::Uint64,
            Values::Float64(_) => Type::Float64,
            Values::Duration(_) => Type::Duration,
        }
    }

    /// The number of values accumulated.
    pub fn len(&self) -> usize {
        match self {
            Values::Bool(flags) => flags.as_slice().len(),
            Values::String(values) => values.len(),
            Values::Int(values) => values.len(),
            Values::Int64(values) => values.len(),
            Values::Uint(values) => values.len(),
            Values::Uint64(values) => values.len(),
            Values::Float64(values) => values.len(),
            Values::Duration(values) => values.len(),
        }
    }

    /// Whether nothing has been accumulated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert `raw` to the native type and append it.
    ///
    /// On failure, the accumulator is left untouched.
    pub fn ingest(&mut self, raw: &str) -> Result<(), InvalidCapture> {
        let type_name = self.ty();
        let invalid = || InvalidCapture::InvalidConversion {
            token: raw.to_string(),
            type_name,
        };

        match self {
            Values::Bool(flags) => flags.push(parse_bool(raw).ok_or_else(invalid)?),
            Values::String(values) => values.push(raw.to_string()),
            Values::Int(values) => values.push(
                parse_integer(raw, true)
                    .and_then(|v| isize::try_from(v).ok())
                    .ok_or_else(invalid)?,
            ),
            Values::Int64(values) => values.push(
                parse_integer(raw, true)
                    .and_then(|v| i64::try_from(v).ok())
                    .ok_or_else(invalid)?,
            ),
            Values::Uint(values) => values.push(
                parse_integer(raw, false)
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(invalid)?,
            ),
            Values::Uint64(values) => values.push(
                parse_integer(raw, false)
                    .and_then(|v| u64::try_from(v).ok())
                    .ok_or_else(invalid)?,
            ),
            Values::Float64(values) => values.push(raw.parse::<f64>().map_err(|_| invalid())?),
            Values::Duration(values) => values.push(parse_duration(raw).ok_or_else(invalid)?),
        };

        Ok(())
    }
}

/// Whether `raw` converts to `ty`, without accumulating it.
pub(crate) fn converts(ty: Type, raw: &str) -> bool {
    Values::empty(ty).ingest(raw).is_ok()
}

/// Parse the textual booleans `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_integer(raw: &str, signed: bool) -> Option<i128> {
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') if signed => (true, &raw[1..]),
        Some(b'+') if signed => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, digits) = split_radix(unsigned)?;

    // `from_str_radix` would otherwise accept a second sign.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_radix(unsigned: &str) -> Option<(u32, String)> {
    let lowered = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(digits) = lowered.strip_prefix("0x") {
        (16, digits.strip_prefix('_').unwrap_or(digits))
    } else if let Some(digits) = lowered.strip_prefix("0o") {
        (8, digits.strip_prefix('_').unwrap_or(digits))
    } else if let Some(digits) = lowered.strip_prefix("0b") {
        (2, digits.strip_prefix('_').unwrap_or(digits))
    } else if lowered.len() > 1 && lowered.starts_with('0') {
        let digits = &lowered[1..];
        (8, digits.strip_prefix('_').unwrap_or(digits))
    } else {
        (10, lowered.as_str())
    };

    // Single underscores between digits, or right after a base prefix.
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }

    Some((radix, digits.replace('_', "")))
}

const NANOS_PER_SECOND: u128 = 1_000_000_000;

fn parse_duration(raw: &str) -> Option<Duration> {
    let mut rest = raw.strip_prefix('+').unwrap_or(raw);

    if rest == "0" {
        return Some(Duration::ZERO);
    }

    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after) => split_digits(after),
            None => ("", after),
        };

        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SECOND,
            "m" => 60 * NANOS_PER_SECOND,
            "h" => 60 * 60 * NANOS_PER_SECOND,
            _ => return None,
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().ok()?
        };
        let mut nanos = whole.checked_mul(scale)?;
        let mut fraction_scale = scale;

        for digit in fraction.chars() {
            fraction_scale /= 10;
            if fraction_scale == 0 {
                break;
            }
            nanos += u128::from(digit.to_digit(10)?) * fraction_scale;
        }

        total = total.checked_add(nanos)?;
        rest = after;
    }

    let seconds = u64::try_from(total / NANOS_PER_SECOND).ok()?;
    Some(Duration::new(seconds, (total % NANOS_PER_SECOND) as u32))
}

fn split_digits(value: &str) -> (&str, &str) {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value.split_at(end)
}
