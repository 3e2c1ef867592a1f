pub mod assertions;
pub mod browser;
pub mod carina;
pub mod config;
pub mod driver;
pub mod error;
pub mod interaction;
pub mod page_object;
pub mod scenario;
pub mod selectors;
pub mod snapshot;

pub use error::{DefinitionError, ErrorKind, HarnessError};
