use thiserror::Error;

use crate::api::InvalidCapture;
use crate::model::Type;

/// The key an error refers to, along with the form it was given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionKey {
    /// A single character key (`-x`).
    Short(char),
    /// A multi character key (`--xyz`).
    Long(String),
    /// An environment variable name.
    Env(String),
}

impl OptionKey {
    /// Classify a registry key by its character count.
    pub fn of(key: &str) -> Self {
        let mut chars = key.chars();

        match (chars.next(), chars.next()) {
            (Some(single), None) => OptionKey::Short(single),
            _ => OptionKey::Long(key.to_string()),
        }
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKey::Short(key) => write!(f, "short option '{key}'"),
            OptionKey::Long(key) => write!(f, "long option '{key}'"),
            OptionKey::Env(key) => write!(f, "environment variable '{key}'"),
        }
    }
}

/// Why a registry failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidDefinition {
    /// The type is not one of [`Type`].
    UnknownType(String),
    /// Keys may not start with a decimal digit, so that `-5` always remains a positional.
    LeadingDigit,
    /// Keys may not start with `-` or contain `=`.
    Unreachable,
    /// Two keys fold to the same text, but refer to different definitions.
    Conflict,
    /// The key does not translate to an environment variable name.
    EnvKey,
}

impl std::fmt::Display for InvalidDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidDefinition::UnknownType(ty) => write!(f, "type '{ty}' does not exist"),
            InvalidDefinition::LeadingDigit => write!(f, "key can't start with a digit"),
            InvalidDefinition::Unreachable => {
                write!(f, "key can't start with '-' or contain '='")
            }
            InvalidDefinition::Conflict => {
                write!(f, "key conflicts with a differently defined key")
            }
            InvalidDefinition::EnvKey => write!(
                f,
                "key must contain only underscores, letters and/or digits"
            ),
        }
    }
}

/// The errors produced while normalizing a registry, parsing tokens, or ingesting environment values.
///
/// Parsing stops at the first error.
/// Definitions ingested before the error keep their values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The key matches no definition.
    #[error("{key}: option has no definition.")]
    OptionHasNoDefinition {
        /// The unmatched key.
        key: OptionKey,
    },

    /// The value does not convert to the definition's type.
    #[error("{key}: incompatible value: {source}")]
    IncompatibleValue {
        /// The key the value was given to.
        key: OptionKey,
        /// The underlying conversion failure.
        source: InvalidCapture,
    },

    /// A boolean was given to an also-bool option already locked to a value.
    #[error("{key}: cannot accept a bool after {ty} values.")]
    BoolAfterValue {
        /// The key the boolean was given to.
        key: OptionKey,
        /// The type the option is locked to.
        ty: Type,
    },

    /// The registry failed validation.
    #[error("{key}: invalid definition: {reason}.")]
    InvalidDefinition {
        /// The offending key.
        key: OptionKey,
        /// Why it is invalid.
        reason: InvalidDefinition,
    },
}

impl ParseError {
    /// Whether this is an [`ParseError::IncompatibleValue`], or its special case [`ParseError::BoolAfterValue`].
    pub fn is_incompatible_value(&self) -> bool {
        matches!(
            self,
            ParseError::IncompatibleValue { .. } | ParseError::BoolAfterValue { .. }
        )
    }

    /// The key this error refers to.
    pub fn key(&self) -> &OptionKey {
        match self {
            ParseError::OptionHasNoDefinition { key }
            | ParseError::IncompatibleValue { key, .. }
            | ParseError::BoolAfterValue { key, .. }
            | ParseError::InvalidDefinition { key, .. } => key,
        }
    }
}
