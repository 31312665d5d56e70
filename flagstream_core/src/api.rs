mod capture;
mod definition;
mod environment;
mod error;
mod registry;

pub use capture::*;
pub use definition::*;
pub use error::*;
pub use registry::*;
