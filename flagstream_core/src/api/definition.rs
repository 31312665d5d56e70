use std::time::Duration;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::capture::{converts, parse_bool};
use crate::api::{Flags, InvalidCapture, OptionKey, ParseError, Values};
use crate::model::Type;

/// The also-bool progression of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Lock {
    /// Nothing ingested.
    #[default]
    Unset,
    /// One or more booleans ingested, but no typed value.
    BoolRun,
    /// A typed value was ingested; booleans are no longer accepted.
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ingestion {
    Flag,
    Value,
}

impl Lock {
    fn transition(self, ingestion: Ingestion) -> Option<Lock> {
        match (self, ingestion) {
            (Lock::Unset | Lock::BoolRun, Ingestion::Flag) => Some(Lock::BoolRun),
            (Lock::Unset | Lock::BoolRun | Lock::Locked, Ingestion::Value) => Some(Lock::Locked),
            (Lock::Locked, Ingestion::Flag) => None,
        }
    }
}

/// The declaration of an option, together with everything ingested for it.
///
/// ### Example
/// ```
/// # use flagstream_core as flagstream;
/// use flagstream::{Definition, Definitions, Type};
///
/// let mut definitions = Definitions::default();
/// definitions.insert("name", Definition::new(Type::String));
/// definitions.insert("v", Definition::new(Type::Bool));
///
/// definitions.parse(&["--name", "world", "-vvv"], &[] as &[&str]).unwrap();
///
/// assert_eq!(definitions.get("name").unwrap().string_value(), Some("world"));
/// assert_eq!(definitions.get("v").unwrap().run_count(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
    ty: Type,
    also_bool: bool,
    env_csv: bool,
    lock: Lock,
    // Booleans of non-`Bool` types; `Bool` types keep them in `values`.
    flags: Flags,
    values: Option<Values>,
}

impl Definition {
    /// Declare an option of type `ty`.
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            ..Self::default()
        }
    }

    /// Allow the option to also be used as a bare (`--key`) or negated (`---key`) boolean, until its first typed value.
    ///
    /// Has no effect on [`Type::Bool`].
    pub fn also_bool(mut self) -> Self {
        self.also_bool = true;
        self
    }

    /// Split environment values on `,`, ingesting each piece.
    pub fn env_csv(mut self) -> Self {
        self.env_csv = true;
        self
    }

    /// The declared type.
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Whether the option may also be used as a boolean.
    pub fn is_also_bool(&self) -> bool {
        self.also_bool
    }

    /// Whether environment values are split on `,`.
    pub fn is_env_csv(&self) -> bool {
        self.env_csv
    }

    /// Whether anything, boolean or typed, has been ingested.
    pub fn is_set(&self) -> bool {
        !self.flags().is_empty() || self.values.as_ref().map_or(false, |v| !v.is_empty())
    }

    /// Whether a typed value has been ingested into an also-bool option.
    pub fn is_locked(&self) -> bool {
        self.lock == Lock::Locked
    }

    /// Convert and append `raw` to this definition, as if it were given via `--key=raw`.
    pub fn ingest(&mut self, key: &OptionKey, raw: &str) -> Result<(), ParseError> {
        if self.also_bool {
            self.ingest_also_bool(key, raw)
        } else {
            self.ingest_value(key, raw)
        }
    }

    pub(crate) fn normalize(&mut self) {
        if self.ty == Type::Bool {
            self.also_bool = false;
        }
    }

    #[cfg(feature = "unit_test")]
    pub(crate) fn reset(&mut self) {
        self.lock = Lock::Unset;
        self.flags = Flags::default();
        self.values = None;
    }

    fn advance(&mut self, key: &OptionKey, ingestion: Ingestion) -> Result<(), ParseError> {
        if !self.also_bool {
            return Ok(());
        }

        match self.lock.transition(ingestion) {
            Some(lock) => {
                self.lock = lock;
                Ok(())
            }
            None => Err(ParseError::BoolAfterValue {
                key: key.clone(),
                ty: self.ty,
            }),
        }
    }

    /// Record a boolean occurrence (`-k`, `--k`, `--key`, `---key`).
    pub(crate) fn ingest_flag(&mut self, key: &OptionKey, value: bool) -> Result<(), ParseError> {
        #[cfg(feature = "tracing_debug")]
        debug!("Ingesting flag {value} into {key}.");

        if self.ty == Type::Bool {
            self.flags_mut().push(value);
            return Ok(());
        }

        self.advance(key, Ingestion::Flag)?;
        self.flags.push(value);
        Ok(())
    }

    /// Record a typed value, converting it to the native type.
    pub(crate) fn ingest_value(&mut self, key: &OptionKey, raw: &str) -> Result<(), ParseError> {
        #[cfg(feature = "tracing_debug")]
        debug!("Ingesting '{raw}' as {ty} into {key}.", ty = self.ty);

        let ty = self.ty;
        let values = self.values.get_or_insert_with(|| Values::empty(ty));
        values
            .ingest(raw)
            .map_err(|source| ParseError::IncompatibleValue {
                key: key.clone(),
                source,
            })?;

        if ty != Type::Bool {
            // Only reached on success, so a failed conversion never locks.
            self.advance(key, Ingestion::Value)?;
        }

        Ok(())
    }

    /// Record `raw` as a boolean when it reads as one, otherwise as a typed value.
    pub(crate) fn ingest_also_bool(&mut self, key: &OptionKey, raw: &str) -> Result<(), ParseError> {
        match parse_bool(raw) {
            Some(value) => self.ingest_flag(key, value),
            None => self.ingest_value(key, raw),
        }
    }

    /// Whether a look-ahead token may be taken as this also-bool option's typed value.
    pub(crate) fn accepts_lookahead(&self, raw: &str) -> bool {
        parse_bool(raw).is_none() && converts(self.ty, raw)
    }

    pub(crate) fn negated_value(key: &OptionKey, raw: &str) -> ParseError {
        ParseError::IncompatibleValue {
            key: key.clone(),
            source: InvalidCapture::NegatedValue {
                token: raw.to_string(),
            },
        }
    }

    fn flags(&self) -> &Flags {
        match &self.values {
            Some(Values::Bool(flags)) => flags,
            _ => &self.flags,
        }
    }

    fn flags_mut(&mut self) -> &mut Flags {
        if self.ty != Type::Bool {
            return &mut self.flags;
        }

        match self.values.get_or_insert_with(|| Values::Bool(Flags::default())) {
            Values::Bool(flags) => flags,
            _ => unreachable!("internal error - a Bool definition must hold Bool values"),
        }
    }

    /// The accumulated typed values.
    /// For [`Type::Bool`], these are the flags.
    pub fn values(&self) -> Option<&Values> {
        self.values.as_ref().filter(|v| !v.is_empty())
    }

    /// Every boolean ingested, in order.
    pub fn bool_sequence(&self) -> Option<&[bool]> {
        let flags = self.flags();
        if flags.is_empty() {
            None
        } else {
            Some(flags.as_slice())
        }
    }

    /// The most recently ingested boolean.
    pub fn bool_value(&self) -> Option<bool> {
        self.flags().last()
    }

    /// How many `true` were ingested in a row, since the most recent `false`.
    ///
    /// ### Example
    /// ```
    /// # use flagstream_core as flagstream;
    /// use flagstream::{Definition, Definitions, Type};
    ///
    /// let mut definitions = Definitions::default();
    /// definitions.insert("v", Definition::new(Type::Bool));
    ///
    /// definitions.parse(&["-vv", "--v", "-v"], &[] as &[&str]).unwrap();
    ///
    /// assert_eq!(definitions.get("v").unwrap().run_count(), Some(1));
    /// ```
    pub fn run_count(&self) -> Option<usize> {
        let flags = self.flags();
        if flags.is_empty() {
            None
        } else {
            Some(flags.run_count())
        }
    }
}

macro_rules! typed_accessors {
    ($variant:ident, $native:ty, $value:ident, $sequence:ident) => {
        impl Definition {
            #[doc = concat!("Every `", stringify!($native), "` ingested, in order.")]
            pub fn $sequence(&self) -> Option<&[$native]> {
                match self.values() {
                    Some(Values::$variant(values)) => Some(values.as_slice()),
                    _ => None,
                }
            }

            #[doc = concat!("The most recently ingested `", stringify!($native), "`.")]
            pub fn $value(&self) -> Option<$native> {
                self.$sequence().and_then(|values| values.last()).copied()
            }
        }
    };
}

typed_accessors!(Int, isize, int_value, int_sequence);
typed_accessors!(Int64, i64, int64_value, int64_sequence);
typed_accessors!(Uint, usize, uint_value, uint_sequence);
typed_accessors!(Uint64, u64, uint64_value, uint64_sequence);
typed_accessors!(Float64, f64, float64_value, float64_sequence);
typed_accessors!(Duration, Duration, duration_value, duration_sequence);

impl Definition {
    /// Every `String` ingested, in order.
    pub fn string_sequence(&self) -> Option<&[String]> {
        match self.values() {
            Some(Values::String(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// The most recently ingested `String`.
    pub fn string_value(&self) -> Option<&str> {
        self.string_sequence()
            .and_then(|values| values.last())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn long(key: &str) -> OptionKey {
        OptionKey::Long(key.to_string())
    }

    #[rstest]
    #[case(Lock::Unset, Ingestion::Flag, Some(Lock::BoolRun))]
    #[case(Lock::Unset, Ingestion::Value, Some(Lock::Locked))]
    #[case(Lock::BoolRun, Ingestion::Flag, Some(Lock::BoolRun))]
    #[case(Lock::BoolRun, Ingestion::Value, Some(Lock::Locked))]
    #[case(Lock::Locked, Ingestion::Value, Some(Lock::Locked))]
    #[case(Lock::Locked, Ingestion::Flag, None)]
    fn lock_transition(
        #[case] lock: Lock,
        #[case] ingestion: Ingestion,
        #[case] expected: Option<Lock>,
    ) {
        assert_eq!(lock.transition(ingestion), expected);
    }

    #[test]
    fn bool_definition() {
        let key = OptionKey::Short('t');
        let mut definition = Definition::new(Type::Bool).also_bool();
        definition.normalize();
        assert!(!definition.is_also_bool());
        assert!(!definition.is_set());
        assert_eq!(definition.bool_sequence(), None);
        assert_eq!(definition.run_count(), None);

        definition.ingest_flag(&key, true).unwrap();
        definition.ingest_flag(&key, false).unwrap();
        definition.ingest_value(&key, "true").unwrap();
        definition.ingest_value(&key, "t").unwrap();

        assert!(definition.is_set());
        assert_eq!(definition.bool_sequence(), Some(&[true, false, true, true][..]));
        assert_eq!(definition.bool_value(), Some(true));
        assert_eq!(definition.run_count(), Some(2));
        assert_eq!(definition.string_sequence(), None);
    }

    #[test]
    fn bool_definition_invalid() {
        let key = OptionKey::Short('t');
        let mut definition = Definition::new(Type::Bool);

        assert_matches!(
            definition.ingest_value(&key, "yes"),
            Err(ParseError::IncompatibleValue {
                source: InvalidCapture::InvalidConversion { .. },
                ..
            })
        );
        assert!(!definition.is_set());
    }

    #[test]
    fn typed_definition() {
        let key = long("count");
        let mut definition = Definition::new(Type::Int);

        definition.ingest_value(&key, "1").unwrap();
        definition.ingest_value(&key, "-2").unwrap();

        assert_eq!(definition.int_sequence(), Some(&[1, -2][..]));
        assert_eq!(definition.int_value(), Some(-2));
        assert_eq!(definition.int64_value(), None);
        assert_eq!(definition.string_value(), None);
        assert_eq!(definition.bool_value(), None);
        assert!(!definition.is_locked());
    }

    #[test]
    fn typed_definition_flags_kept_apart() {
        let key = OptionKey::Short('o');
        let mut definition = Definition::new(Type::String);

        definition.ingest_flag(&key, true).unwrap();
        definition.ingest_value(&key, "foo").unwrap();
        // Not also-bool, so no lock applies.
        definition.ingest_flag(&key, false).unwrap();

        assert_eq!(definition.bool_sequence(), Some(&[true, false][..]));
        assert_eq!(definition.string_sequence(), Some(&["foo".to_string()][..]));
    }

    #[test]
    fn also_bool() {
        let key = long("foo");
        let mut definition = Definition::new(Type::String).also_bool();

        definition.ingest_also_bool(&key, "false").unwrap();
        definition.ingest_flag(&key, true).unwrap();
        assert!(!definition.is_locked());
        assert_eq!(definition.string_value(), None);

        definition.ingest_also_bool(&key, "bar").unwrap();
        assert!(definition.is_locked());

        assert_eq!(definition.bool_sequence(), Some(&[false, true][..]));
        assert_eq!(definition.string_sequence(), Some(&["bar".to_string()][..]));
        assert_eq!(
            definition.ingest_flag(&key, true),
            Err(ParseError::BoolAfterValue {
                key: key.clone(),
                ty: Type::String,
            })
        );
        assert_matches!(
            definition.ingest_also_bool(&key, "true"),
            Err(ParseError::BoolAfterValue { .. })
        );

        definition.ingest_also_bool(&key, "baz").unwrap();
        assert_eq!(definition.string_value(), Some("baz"));
        assert_eq!(definition.bool_sequence(), Some(&[false, true][..]));
    }

    #[test]
    fn also_bool_failed_conversion_does_not_lock() {
        let key = long("level");
        let mut definition = Definition::new(Type::Uint).also_bool();

        assert_matches!(
            definition.ingest_also_bool(&key, "high"),
            Err(ParseError::IncompatibleValue { .. })
        );
        assert!(!definition.is_locked());
        definition.ingest_flag(&key, true).unwrap();
        assert_eq!(definition.run_count(), Some(1));
    }

    #[rstest]
    #[case(Type::String, "bar", true)]
    #[case(Type::String, "true", false)]
    #[case(Type::Int, "3", true)]
    #[case(Type::Int, "1", false)]
    #[case(Type::Int, "bar", false)]
    #[case(Type::Duration, "5s", true)]
    fn accepts_lookahead(#[case] ty: Type, #[case] raw: &str, #[case] expected: bool) {
        let definition = Definition::new(ty).also_bool();
        assert_eq!(definition.accepts_lookahead(raw), expected);
    }

    #[test]
    fn ingest_public() {
        let key = OptionKey::Env("FOO".to_string());
        let mut definition = Definition::new(Type::Float64);

        definition.ingest(&key, "1.5").unwrap();
        assert_eq!(definition.float64_value(), Some(1.5));

        let mut definition = Definition::new(Type::Float64).also_bool();
        definition.ingest(&key, "true").unwrap();
        assert_eq!(definition.bool_value(), Some(true));
        assert_eq!(definition.float64_value(), None);
    }
}
