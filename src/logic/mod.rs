pub mod comment_ops;
pub mod error;
pub mod pizza_ops;

pub use comment_ops::*;
pub use error::*;
pub use pizza_ops::*;
