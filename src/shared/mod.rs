pub mod error;
pub mod result;
pub mod security;

pub use result::{EngineResult, Result};
