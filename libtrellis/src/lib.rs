pub mod decode;
pub mod error;
pub mod learn;
pub mod structs;
pub mod util;

pub use error::{Result, TrellisError};
