#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{Definition, DefinitionId, Definitions, OptionKey, ParseError};
use crate::matcher::model::*;
use crate::model::Type;
use crate::parser::Parsed;

pub(crate) struct TokenMatcher<'d, 'c> {
    definitions: &'d mut Definitions,
    chokes: &'c ChokeSet,
}

impl<'d, 'c> TokenMatcher<'d, 'c> {
    pub(crate) fn new(definitions: &'d mut Definitions, chokes: &'c ChokeSet) -> Self {
        Self {
            definitions,
            chokes,
        }
    }

    pub(crate) fn consume(mut self, tokens: &[&str]) -> Result<Parsed, ParseError> {
        let mut positionals: Vec<String> = Vec::default();
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            let next = self.lookahead(tokens.get(index + 1).copied());

            let consumed_next = match TokenKind::classify(token) {
                TokenKind::Positional => {
                    if self.chokes.contains(token) {
                        #[cfg(feature = "tracing_debug")]
                        debug!("Choke '{token}' found at token {index}.");

                        return Ok(Parsed::choked(positionals, &tokens[index..]));
                    }

                    positionals.push(token.to_string());
                    false
                }
                TokenKind::Divider => {
                    #[cfg(feature = "tracing_debug")]
                    debug!("Divider found at token {index}.");

                    positionals.extend(tokens[index + 1..].iter().map(|t| t.to_string()));
                    return Ok(Parsed::new(positionals));
                }
                TokenKind::ShortOption => self.match_option_short(token, next)?,
                TokenKind::LongOption => self.match_option(token, next)?,
            };

            index += if consumed_next { 2 } else { 1 };
        }

        Ok(Parsed::new(positionals))
    }

    /// The following token, if it may be taken as a value.
    ///
    /// Chokes are never taken as values, nor is anything shaped like an option or divider.
    fn lookahead<'t>(&self, next: Option<&'t str>) -> Option<&'t str> {
        next.filter(|token| {
            TokenKind::classify(token) == TokenKind::Positional && !self.chokes.contains(token)
        })
    }

    /// Returns whether the `next` token was consumed.
    fn match_option_short(&mut self, token: &str, next: Option<&str>) -> Result<bool, ParseError> {
        let ShortCluster { keys, value } = ShortCluster::split(token);

        let Some(((last, last_affirmed), head)) = keys.split_last() else {
            return Err(ParseError::OptionHasNoDefinition {
                key: OptionKey::Short(crate::constant::DASH),
            });
        };

        // Every key but the final one is a flag, regardless of its type.
        for (single, affirmed) in head {
            let key = OptionKey::Short(*single);
            let id = self.resolve(&key, &single.to_string())?;
            self.definitions
                .slot_mut(id)
                .ingest_flag(&key, *affirmed)?;
        }

        let key = OptionKey::Short(*last);
        let id = self.resolve(&key, &last.to_string())?;
        self.match_value(id, &key, *last_affirmed, value, next)
    }

    /// Returns whether the `next` token was consumed.
    fn match_option(&mut self, token: &str, next: Option<&str>) -> Result<bool, ParseError> {
        let option = LongOption::split(token);

        if option.is_single() {
            // `---x` is a short option behind an extra dash pair.
            return self.match_option_short(token, next);
        }

        let key = OptionKey::Long(option.key.to_string());
        let id = self.resolve(&key, option.key)?;
        self.match_value(id, &key, option.affirmed, option.value, next)
    }

    fn resolve(&self, key: &OptionKey, name: &str) -> Result<DefinitionId, ParseError> {
        self.definitions
            .id(name)
            .ok_or_else(|| ParseError::OptionHasNoDefinition { key: key.clone() })
    }

    /// Ingest the value for the final key of an option token.
    ///
    /// Returns whether the `next` token was consumed.
    fn match_value(
        &mut self,
        id: DefinitionId,
        key: &OptionKey,
        affirmed: bool,
        value: Option<&str>,
        next: Option<&str>,
    ) -> Result<bool, ParseError> {
        let definition = self.definitions.slot_mut(id);

        if !affirmed {
            return match value {
                Some(value) => Err(Definition::negated_value(key, value)),
                None if definition.ty() == Type::Bool || definition.is_also_bool() => {
                    definition.ingest_flag(key, false).map(|_| false)
                }
                None => Err(Definition::negated_value(key, "")),
            };
        }

        match (definition.ty(), definition.is_also_bool(), value) {
            (_, _, Some(value)) if definition.ty() == Type::Bool => {
                definition.ingest_value(key, value).map(|_| false)
            }
            (Type::Bool, _, None) => definition.ingest_flag(key, true).map(|_| false),
            (_, true, Some(value)) => definition.ingest_also_bool(key, value).map(|_| false),
            (_, true, None) => match next.filter(|n| definition.accepts_lookahead(n)) {
                Some(next) => {
                    #[cfg(feature = "tracing_debug")]
                    debug!("Consuming '{next}' as the value for {key}.");

                    definition.ingest_value(key, next).map(|_| true)
                }
                None => definition.ingest_flag(key, true).map(|_| false),
            },
            (_, false, Some(value)) => definition.ingest_value(key, value).map(|_| false),
            (_, false, None) => match next {
                Some(next) => {
                    #[cfg(feature = "tracing_debug")]
                    debug!("Consuming '{next}' as the value for {key}.");

                    definition.ingest_value(key, next).map(|_| true)
                }
                None => definition.ingest_value(key, "").map(|_| false),
            },
        }
    }
}
