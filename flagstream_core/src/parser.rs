/// The outcome of [`Definitions::parse`](crate::Definitions::parse).
///
/// Option values are not part of this: they are ingested into the definitions themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    positionals: Vec<String>,
    choke_remainder: Option<Vec<String>>,
}

impl Parsed {
    pub(crate) fn new(positionals: Vec<String>) -> Self {
        Self {
            positionals,
            choke_remainder: None,
        }
    }

    pub(crate) fn choked(positionals: Vec<String>, remainder: &[&str]) -> Self {
        Self {
            positionals,
            choke_remainder: Some(remainder.iter().map(|token| token.to_string()).collect()),
        }
    }

    /// The non-option tokens, in order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// The matched choke followed by every token after it, if a choke was matched.
    pub fn choke_remainder(&self) -> Option<&[String]> {
        self.choke_remainder.as_deref()
    }

    /// The matched choke, as it was written.
    pub fn choke(&self) -> Option<&str> {
        self.choke_remainder
            .as_ref()
            .and_then(|remainder| remainder.first())
            .map(String::as_str)
    }

    /// Break into `(positionals, choke_remainder)`.
    pub fn into_parts(self) -> (Vec<String>, Option<Vec<String>>) {
        (self.positionals, self.choke_remainder)
    }
}
