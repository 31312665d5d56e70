//! Engine crate for `flagstream`.
//! See [documentation root](https://docs.rs/flagstream/latest/flagstream/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;

pub use api::*;
pub use model::*;
pub use parser::Parsed;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
