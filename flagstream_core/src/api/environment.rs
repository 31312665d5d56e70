use std::collections::HashMap;
use std::env;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{DefinitionId, Definitions, InvalidDefinition, OptionKey, ParseError};
use crate::constant::*;

impl Definitions {
    /// Ingest the process environment into the definitions.
    ///
    /// See [`Definitions::parse_env_from`].
    pub fn parse_env(&mut self) -> Result<(), ParseError> {
        let variables = env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
        self.parse_env_from(variables)
    }

    /// Ingest `(name, value)` variables into the definitions.
    ///
    /// Each key is translated to a variable name by uppercasing it and replacing whitespace and `-` with `_`.
    /// Variable names are matched case insensitively.
    /// Definitions marked [`Definition::env_csv`](crate::Definition::env_csv) split the value on `,`, ingesting each piece.
    ///
    /// ### Example
    /// ```
    /// # use flagstream_core as flagstream;
    /// use flagstream::{Definition, Definitions, Type};
    ///
    /// let mut definitions = Definitions::default();
    /// definitions.insert("log level", Definition::new(Type::String));
    /// definitions.insert("path", Definition::new(Type::String).env_csv());
    ///
    /// definitions
    ///     .parse_env_from([("LOG_LEVEL", "debug"), ("PATH", "/bin,/usr/bin")])
    ///     .unwrap();
    ///
    /// assert_eq!(definitions.get("log level").unwrap().string_value(), Some("debug"));
    /// assert_eq!(definitions.get("path").unwrap().string_sequence().unwrap(), &["/bin", "/usr/bin"]);
    /// ```
    pub fn parse_env_from<I, K, V>(&mut self, variables: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.normalize()?;
        let names = self.env_names()?;

        for (name, value) in variables {
            let name = name.as_ref().to_uppercase();

            if let Some(id) = names.get(&name) {
                let key = OptionKey::Env(name.clone());
                let definition = self.slot_mut(*id);

                #[cfg(feature = "tracing_debug")]
                debug!("Ingesting {key} from the environment.");

                if definition.is_env_csv() {
                    for piece in value.as_ref().split(CSV_SEPARATOR) {
                        definition.ingest(&key, piece)?;
                    }
                } else {
                    definition.ingest(&key, value.as_ref())?;
                }
            }
        }

        Ok(())
    }

    fn env_names(&self) -> Result<HashMap<String, DefinitionId>, ParseError> {
        let mut names: HashMap<String, DefinitionId> = HashMap::default();

        for (key, id) in self.entries() {
            let name = env_name(key).ok_or_else(|| ParseError::InvalidDefinition {
                key: OptionKey::of(key),
                reason: InvalidDefinition::EnvKey,
            })?;

            if let Some(existing) = names.insert(name.clone(), id) {
                if existing != id {
                    return Err(ParseError::InvalidDefinition {
                        key: OptionKey::Env(name),
                        reason: InvalidDefinition::Conflict,
                    });
                }
            }
        }

        Ok(names)
    }
}

/// Translate a key into its environment variable name, if it has one.
pub(crate) fn env_name(key: &str) -> Option<String> {
    let name: String = key
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == DASH {
                ENV_SEPARATOR
            } else {
                c
            }
        })
        .collect::<String>()
        .to_uppercase();

    if name
        .chars()
        .all(|c| c == ENV_SEPARATOR || c.is_alphanumeric())
    {
        Some(name)
    } else {
        None
    }
}
