use std::collections::HashSet;

use crate::constant::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `foo`, `-`, `-5`, the empty string.
    Positional,
    /// `--`
    Divider,
    /// `-x`, `-xyz`, `-xyz=..`, and the negated `--x`.
    ShortOption,
    /// `--xyz`, `--xyz=..`, and the negated `---xyz`.
    LongOption,
}

impl TokenKind {
    pub(crate) fn classify(token: &str) -> Self {
        let mut chars = token.chars();

        match (chars.next(), chars.next()) {
            (Some(DASH), Some(second)) if second.is_ascii_digit() => TokenKind::Positional,
            (Some(DASH), Some(DASH)) => match token.chars().count() {
                2 => TokenKind::Divider,
                3 => TokenKind::ShortOption,
                _ => TokenKind::LongOption,
            },
            (Some(DASH), Some(_)) => TokenKind::ShortOption,
            _ => TokenKind::Positional,
        }
    }
}

pub(crate) fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once(EQUALS) {
        Some((n, v)) => (n, Some(v)),
        None => (token, None),
    }
}

/// A short option token, broken down into its keys.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ShortCluster<'t> {
    /// Each key and whether it is affirmed (`true`) or negated (`false`).
    pub keys: Vec<(char, bool)>,
    /// The `=` delimited value, which only applies to the final key.
    pub value: Option<&'t str>,
}

impl<'t> ShortCluster<'t> {
    pub(crate) fn split(token: &'t str) -> Self {
        let (body, value) = split_equals_delimiter(token);
        let mut keys = Vec::default();
        let mut dashes: usize = 0;

        for single in body.chars() {
            if single == DASH {
                dashes += 1;
                continue;
            }

            // The first dash only introduces the token.
            let extra = if keys.is_empty() {
                dashes.saturating_sub(1)
            } else {
                dashes
            };
            keys.push((single, extra % 2 == 0));
            dashes = 0;
        }

        Self { keys, value }
    }
}

/// A long option token, broken down into its key.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct LongOption<'t> {
    pub key: &'t str,
    pub affirmed: bool,
    pub value: Option<&'t str>,
}

impl<'t> LongOption<'t> {
    pub(crate) fn split(token: &'t str) -> Self {
        let (body, value) = split_equals_delimiter(token);
        let key = body.trim_start_matches(DASH);
        let dashes = body.len() - key.len();

        Self {
            key,
            affirmed: dashes % 2 == 0,
            value,
        }
    }

    pub(crate) fn is_single(&self) -> bool {
        let mut chars = self.key.chars();
        chars.next().is_some() && chars.next().is_none()
    }
}

/// The case insensitive set of chokes.
#[derive(Debug, Default)]
pub(crate) struct ChokeSet(HashSet<String>);

impl ChokeSet {
    pub(crate) fn new<C: AsRef<str>>(chokes: &[C]) -> Self {
        Self(
            chokes
                .iter()
                .map(|choke| choke.as_ref().to_lowercase())
                .collect(),
        )
    }

    pub(crate) fn contains(&self, token: &str) -> bool {
        !self.0.is_empty() && self.0.contains(&token.to_lowercase())
    }
}
