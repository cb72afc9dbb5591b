pub mod comment;
pub mod common;
pub mod pizza;
pub mod validation;

pub use comment::*;
pub use common::*;
pub use pizza::*;
pub use validation::*;
