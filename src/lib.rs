//! `flagstream` is a command line token parser for Rust.
//!
//! It turns a flat sequence of tokens into typed option values plus the leftover positional arguments.
//! Unlike full featured Cli frameworks, `flagstream` does not describe a program: there is no help output, no
//! required parameters, and no command tree.
//! Instead, it prioritizes the following design concerns:
//! * *Typed accumulation*:
//! Every option declares a [`Type`], and every occurrence of the option is converted and appended to its history.
//! Nothing is overwritten; the last value, the full sequence, and (for booleans) the trailing run of `true`s are all queryable.
//! * *Familiar syntax, with negation*:
//! Short options cluster (`-abc`), long options are case insensitive (`--Verbose`), and an extra dash negates (`--v`, `---verbose`).
//! * *Sub-commands by delegation*:
//! A parse stops at the first *choke* token, handing back the rest of the tokens for a follow-up parse against another registry.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/sub_command.rs")]
//! ```
//!
//! ```console
//! $ sub_command -vv --name=world greet --loud
//! verbosity: 2
//! Hello, WORLD!
//!
//! $ sub_command -x
//! Parse error: short option 'x': option has no definition.
//! ```
//!
//! # Definitions
//! Configure `flagstream` by inserting a [`Definition`] into a [`Definitions`] registry per option key.
//! Single character keys are short options (case sensitive), longer keys are long options (case insensitive).
//! Keys may not start with a digit, so that `-5` always remains a positional.
//! [`Definitions::alias`] registers another key for an existing definition; aliases share everything ingested.
//!
//! After [`Definitions::parse`], query each definition via its accessors (ex: [`Definition::string_value`],
//! [`Definition::int_sequence`], [`Definition::run_count`]).
//! Accessors of a type other than the declared [`Type`] return `None`.
//!
//! ### Also-bool
//! A [`Definition::also_bool`] option may be used as a flag (`--color`, `---color`) until it receives its first typed value
//! (`--color=always`, `--color always`).
//! From then on, it is locked to its type: further flags fail with [`ParseError::BoolAfterValue`].
//!
//! # Cli Semantics
//! * `--` stops option parsing: every following token is a positional, verbatim.
//! * `-abc` sets flags `a` and `b`; the final key `c` may take a value.
//! For example, `-abc=123`, or `-abc 123`.
//! * A run of dashes inside a cluster negates the following key when odd: `-a-b` is `a=true b=false`.
//! * `--key=value`, or `--key value`.
//! Only the first `=` is used as a separator.
//! * A value is only taken from the following token when that token is neither option shaped nor a choke.
//! When no value can be found, the value is the empty string.
//! * Chokes are only recognized in positional spots, before any `--`.
//!
//! # Environment
//! [`Definitions::parse_env`] ingests environment variables named after each key (uppercase, with whitespace and `-`
//! replaced by `_`).
//!
//! # Features
//! * `tracing_debug`: Emit `tracing` debug events while parsing.
//! * `unit_test`: For features that help with unit testing.
pub use flagstream_core::*;
