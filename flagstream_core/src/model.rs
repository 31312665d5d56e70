use std::convert::TryFrom;
use std::str::FromStr;

use crate::api::{InvalidDefinition, OptionKey, ParseError};

/// The native type of an option's values.
///
/// Every [`Definition`](crate::Definition) declares exactly one `Type`, which decides how raw tokens are converted before being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// `true`/`false` flags, also counted in runs.
    #[default]
    Bool,
    /// Raw text, never fails to convert.
    String,
    /// Platform width signed integer (`isize`).
    Int,
    /// `i64`.
    Int64,
    /// Platform width unsigned integer (`usize`).
    Uint,
    /// `u64`.
    Uint64,
    /// `f64`.
    Float64,
    /// [`std::time::Duration`], written as `1h30m`, `5s`, `250ms`, etc.
    Duration,
}

impl Type {
    pub(crate) const ALL: [Type; 8] = [
        Type::Bool,
        Type::String,
        Type::Int,
        Type::Int64,
        Type::Uint,
        Type::Uint64,
        Type::Float64,
        Type::Duration,
    ];

    /// The lowercase name of this type, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Type::Bool => "bool",
            Type::String => "string",
            Type::Int => "int",
            Type::Int64 => "int64",
            Type::Uint => "uint",
            Type::Uint64 => "uint64",
            Type::Float64 => "float64",
            Type::Duration => "duration",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u32> for Type {
    type Error = ParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Type::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ParseError::InvalidDefinition {
                key: OptionKey::Long(value.to_string()),
                reason: InvalidDefinition::UnknownType(value.to_string()),
            })
    }
}

impl FromStr for Type {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Type::ALL
            .iter()
            .find(|ty| ty.name() == lowered)
            .copied()
            .ok_or_else(|| ParseError::InvalidDefinition {
                key: OptionKey::Long(s.to_string()),
                reason: InvalidDefinition::UnknownType(s.to_string()),
            })
    }
}
