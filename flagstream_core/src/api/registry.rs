use std::collections::HashMap;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{Definition, InvalidDefinition, OptionKey, ParseError};
use crate::constant::*;
use crate::matcher::{ChokeSet, TokenMatcher};
use crate::parser::Parsed;

/// A handle to one definition slot in the registry, shared by all of its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionId(usize);

/// The option registry.
///
/// Maps keys to definitions.
/// Single character keys are short options, and are case sensitive.
/// Multi character keys are long options, and are case insensitive.
/// Aliased keys share the same definition: anything ingested via one key is visible via all of them.
///
/// Definitions accumulate across repeated calls to [`Definitions::parse`]; nothing is reset between them.
///
/// ### Example
/// ```
/// # use flagstream_core as flagstream;
/// use flagstream::{Definition, Definitions, Type};
///
/// let mut definitions = Definitions::default();
/// definitions.insert("output", Definition::new(Type::String));
/// definitions.alias("o", "output").unwrap();
///
/// definitions.parse(&["-o", "a.txt", "--OUTPUT=b.txt"], &[] as &[&str]).unwrap();
///
/// let output = definitions.get("output").unwrap();
/// assert_eq!(output.string_sequence().unwrap(), &["a.txt", "b.txt"]);
/// assert_eq!(definitions.get("o"), definitions.get("output"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    keys: HashMap<String, DefinitionId>,
    slots: Vec<Definition>,
}

impl Definitions {
    /// Register `definition` under `key`.
    ///
    /// If `key` was already registered, it now refers to the new definition.
    /// Aliases of the old definition keep it; otherwise the old definition is dropped.
    /// Keys are validated and case folded when parsing.
    pub fn insert(&mut self, key: impl Into<String>, definition: Definition) -> DefinitionId {
        let key = key.into();

        if let Some(existing) = self.keys.get(&key).copied() {
            if self.keys.values().filter(|id| **id == existing).count() == 1 {
                self.slots[existing.0] = definition;
                return existing;
            }
        }

        let id = DefinitionId(self.slots.len());
        self.slots.push(definition);
        self.keys.insert(key, id);
        id
    }

    /// Register `name` as another key for the definition under `target`.
    ///
    /// ### Example
    /// ```
    /// # use flagstream_core as flagstream;
    /// use flagstream::{Definition, Definitions, ParseError, Type};
    ///
    /// let mut definitions = Definitions::default();
    /// definitions.insert("verbose", Definition::new(Type::Bool));
    ///
    /// definitions.alias("v", "Verbose").unwrap();
    /// assert!(matches!(
    ///     definitions.alias("q", "quiet"),
    ///     Err(ParseError::OptionHasNoDefinition { .. })
    /// ));
    /// ```
    pub fn alias(&mut self, name: impl Into<String>, target: &str) -> Result<(), ParseError> {
        let name = name.into();
        let id = self
            .id(target)
            .ok_or_else(|| ParseError::OptionHasNoDefinition {
                key: OptionKey::of(target),
            })?;

        match self.id(&name) {
            Some(existing) if existing != id => Err(ParseError::InvalidDefinition {
                key: OptionKey::of(&name),
                reason: InvalidDefinition::Conflict,
            }),
            _ => {
                self.keys.insert(name, id);
                Ok(())
            }
        }
    }

    /// Look up the definition registered under `key`, folding case for long keys.
    pub fn get(&self, key: &str) -> Option<&Definition> {
        self.id(key).map(|id| &self.slots[id.0])
    }

    /// Look up the definition registered under `key`, folding case for long keys.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Definition> {
        match self.id(key) {
            Some(id) => Some(&mut self.slots[id.0]),
            None => None,
        }
    }

    /// The definition behind a handle returned from [`Definitions::insert`].
    ///
    /// Handles are only meaningful to the registry that issued them.
    pub fn slot(&self, id: DefinitionId) -> Option<&Definition> {
        self.slots.get(id.0)
    }

    /// Every registered key, aliases included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Clear everything ingested so far.
    ///
    /// *Available using 'unit_test' crate feature only.*
    #[cfg(feature = "unit_test")]
    pub fn reset(&mut self) {
        for definition in self.slots.iter_mut() {
            definition.reset();
        }
    }

    /// Parse `tokens` into the definitions, returning the positionals and the choke remainder.
    ///
    /// The program name is expected to be stripped from `tokens` already.
    /// Any entry of `chokes` (matched case insensitively) stops the scan when found in a positional spot;
    /// the choke and every token after it are returned unparsed, for a follow-up parse.
    /// A `--` divider stops option scanning: every following token is a positional.
    ///
    /// ### Example
    /// ```
    /// # use flagstream_core as flagstream;
    /// use flagstream::{Definition, Definitions, Type};
    ///
    /// let mut global = Definitions::default();
    /// global.insert("v", Definition::new(Type::Bool));
    ///
    /// let parsed = global.parse(&["-v", "push", "-f", "origin"], &["push"]).unwrap();
    /// assert!(parsed.positionals().is_empty());
    /// assert_eq!(parsed.choke_remainder().unwrap(), &["push", "-f", "origin"]);
    ///
    /// let mut push = Definitions::default();
    /// push.insert("f", Definition::new(Type::Bool));
    ///
    /// let parsed = push.parse(&parsed.choke_remainder().unwrap()[1..], &[] as &[&str]).unwrap();
    /// assert_eq!(parsed.positionals(), &["origin"]);
    /// assert_eq!(push.get("f").unwrap().bool_value(), Some(true));
    /// ```
    pub fn parse<T, C>(&mut self, tokens: &[T], chokes: &[C]) -> Result<Parsed, ParseError>
    where
        T: AsRef<str>,
        C: AsRef<str>,
    {
        self.normalize()?;

        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let chokes = ChokeSet::new(chokes);
        TokenMatcher::new(self, &chokes).consume(&tokens)
    }

    /// Validate the registry and case fold its long keys.
    ///
    /// Runs at the start of every parse; repeated runs are no-ops.
    /// On error, the registry is left untouched.
    pub(crate) fn normalize(&mut self) -> Result<(), ParseError> {
        let mut keys: HashMap<String, DefinitionId> = HashMap::default();

        for (key, id) in self.keys.iter() {
            if key.is_empty() {
                continue;
            }

            validate_key(key)?;

            let folded = fold(key);
            if let Some(existing) = keys.insert(folded.clone(), *id) {
                if existing != *id {
                    return Err(ParseError::InvalidDefinition {
                        key: OptionKey::of(&folded),
                        reason: InvalidDefinition::Conflict,
                    });
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        debug!(
            "Normalized {before} keys into {after}.",
            before = self.keys.len(),
            after = keys.len()
        );

        self.keys = keys;

        for definition in self.slots.iter_mut() {
            definition.normalize();
        }

        Ok(())
    }

    /// Resolve `key` the way the parser does, whether or not the registry has been normalized yet.
    pub(crate) fn id(&self, key: &str) -> Option<DefinitionId> {
        if let Some(id) = self.keys.get(key) {
            return Some(*id);
        }

        let folded = fold(key);
        self.keys.get(&folded).copied().or_else(|| {
            self.keys
                .iter()
                .find(|(registered, _)| fold(registered) == folded)
                .map(|(_, id)| *id)
        })
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, DefinitionId)> {
        self.keys.iter().map(|(key, id)| (key.as_str(), *id))
    }

    // Only called with ids resolved from this registry's own keys.
    pub(crate) fn slot_mut(&mut self, id: DefinitionId) -> &mut Definition {
        &mut self.slots[id.0]
    }
}

/// Single character keys are case sensitive; anything longer is folded to lowercase.
pub(crate) fn fold(key: &str) -> String {
    if key.chars().nth(1).is_none() {
        key.to_string()
    } else {
        key.to_lowercase()
    }
}

fn validate_key(key: &str) -> Result<(), ParseError> {
    let invalid = |reason| ParseError::InvalidDefinition {
        key: OptionKey::of(key),
        reason,
    };

    if key.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid(InvalidDefinition::LeadingDigit));
    }

    if key.starts_with(DASH) || key.contains(EQUALS) {
        return Err(invalid(InvalidDefinition::Unreachable));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Type;
    use rstest::rstest;

    #[rstest]
    #[case("a", "a")]
    #[case("A", "A")]
    #[case("か", "か")]
    #[case("Foo", "foo")]
    #[case("hElLO", "hello")]
    #[case("OかE", "oかe")]
    fn fold_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(fold(key), expected);
    }

    #[test]
    fn alias_shares_definition() {
        let mut definitions = Definitions::default();
        let id = definitions.insert("one", Definition::new(Type::String));
        definitions.alias("twõか", "one").unwrap();

        let key = OptionKey::Long("twõか".to_string());
        definitions
            .get_mut("twõか")
            .unwrap()
            .ingest(&key, "two")
            .unwrap();

        assert_eq!(definitions.slot(id).unwrap().string_value(), Some("two"));
        assert_eq!(definitions.get("one").unwrap().string_value(), Some("two"));
    }

    #[test]
    fn alias_mixed_case_before_parse() {
        let mut definitions = Definitions::default();
        let id = definitions.insert("Verbose", Definition::new(Type::Bool));

        definitions.alias("v", "verbose").unwrap();
        definitions.alias("loud", "VERBOSE").unwrap();

        assert_eq!(definitions.id("v"), Some(id));
        assert_eq!(definitions.id("LOUD"), Some(id));
        assert!(definitions.get("verbose").is_some());
        assert!(definitions.get_mut("vErBoSe").is_some());
        // Short keys stay case sensitive.
        assert_eq!(definitions.id("V"), None);

        definitions.parse(&["-v", "--LOUD"], &[] as &[&str]).unwrap();
        assert_eq!(definitions.slot(id).unwrap().run_count(), Some(2));
    }

    #[test]
    fn alias_conflict_mixed_case() {
        let mut definitions = Definitions::default();
        definitions.insert("One", Definition::new(Type::String));
        definitions.insert("two", Definition::new(Type::String));

        assert_matches!(
            definitions.alias("ONE", "two"),
            Err(ParseError::InvalidDefinition {
                reason: InvalidDefinition::Conflict,
                ..
            })
        );
    }

    #[test]
    fn slot_foreign_id() {
        let mut larger = Definitions::default();
        larger.insert("a", Definition::new(Type::Bool));
        let foreign = larger.insert("b", Definition::new(Type::Bool));

        let mut definitions = Definitions::default();
        definitions.insert("a", Definition::new(Type::Bool));

        assert_eq!(definitions.slot(foreign), None);
    }

    #[test]
    fn insert_replaces() {
        let mut definitions = Definitions::default();
        let first = definitions.insert("name", Definition::new(Type::Bool));
        let second = definitions.insert("name", Definition::new(Type::String));

        assert_eq!(first, second);
        assert_eq!(definitions.get("name").unwrap().ty(), Type::String);

        definitions.alias("n", "name").unwrap();
        let third = definitions.insert("name", Definition::new(Type::Int));

        assert_ne!(second, third);
        assert_eq!(definitions.get("name").unwrap().ty(), Type::Int);
        assert_eq!(definitions.get("n").unwrap().ty(), Type::String);
    }

    #[test]
    fn alias_missing_target() {
        let mut definitions = Definitions::default();

        assert_eq!(
            definitions.alias("x", "nope"),
            Err(ParseError::OptionHasNoDefinition {
                key: OptionKey::Long("nope".to_string()),
            })
        );
        assert_eq!(
            definitions.alias("xy", "n"),
            Err(ParseError::OptionHasNoDefinition {
                key: OptionKey::Short('n'),
            })
        );
    }

    #[test]
    fn alias_conflict() {
        let mut definitions = Definitions::default();
        definitions.insert("one", Definition::new(Type::String));
        definitions.insert("two", Definition::new(Type::String));

        assert_matches!(
            definitions.alias("two", "one"),
            Err(ParseError::InvalidDefinition {
                reason: InvalidDefinition::Conflict,
                ..
            })
        );
        // Re-aliasing onto the same definition is fine.
        definitions.alias("uno", "one").unwrap();
        definitions.alias("uno", "one").unwrap();
    }

    #[test]
    fn normalize_folds_long_keys() {
        let mut definitions = Definitions::default();
        definitions.insert("hElLO", Definition::new(Type::Bool));
        definitions.insert("X", Definition::new(Type::Bool));
        definitions.insert("", Definition::new(Type::Bool));

        definitions.normalize().unwrap();
        definitions.normalize().unwrap();

        let mut keys: Vec<&str> = definitions.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["X", "hello"]);
        assert!(definitions.get("x").is_none());
        assert!(definitions.get("HELLO").is_some());
    }

    #[test]
    fn normalize_forces_also_bool_off_for_bool() {
        let mut definitions = Definitions::default();
        definitions.insert("flag", Definition::new(Type::Bool).also_bool());
        definitions.insert("name", Definition::new(Type::String).also_bool());

        definitions.normalize().unwrap();

        assert!(!definitions.get("flag").unwrap().is_also_bool());
        assert!(definitions.get("name").unwrap().is_also_bool());
    }

    #[rstest]
    #[case("5", InvalidDefinition::LeadingDigit)]
    #[case("9lives", InvalidDefinition::LeadingDigit)]
    #[case("-x", InvalidDefinition::Unreachable)]
    #[case("a=b", InvalidDefinition::Unreachable)]
    fn normalize_invalid_key(#[case] key: &str, #[case] reason: InvalidDefinition) {
        let mut definitions = Definitions::default();
        definitions.insert("Keep", Definition::new(Type::Bool));
        definitions.insert(key, Definition::new(Type::Bool));

        assert_eq!(
            definitions.normalize(),
            Err(ParseError::InvalidDefinition {
                key: OptionKey::of(key),
                reason,
            })
        );
        // Untouched on error.
        assert!(definitions.keys().any(|k| k == "Keep"));
    }

    #[test]
    fn normalize_conflict() {
        let mut definitions = Definitions::default();
        definitions.insert("hello", Definition::new(Type::Bool));
        definitions.insert("HELLO", Definition::new(Type::String));

        assert_matches!(
            definitions.normalize(),
            Err(ParseError::InvalidDefinition {
                reason: InvalidDefinition::Conflict,
                ..
            })
        );
    }

    #[test]
    fn normalize_same_definition_different_case() {
        let mut definitions = Definitions::default();
        definitions.insert("hello", Definition::new(Type::Bool));
        definitions.alias("HELLO", "hello").unwrap();

        definitions.normalize().unwrap();

        assert_eq!(definitions.keys().count(), 1);
    }
}
