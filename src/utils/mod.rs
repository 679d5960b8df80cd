//! Utility modules

pub mod diagnostics;
pub mod parsing;
pub mod validation;

pub use parsing::*;
pub use validation::*;
