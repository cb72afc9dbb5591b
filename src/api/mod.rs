pub mod comment_handlers;
pub mod handlers;
pub mod routes;

pub use comment_handlers::*;
pub use handlers::*;
pub use routes::*;
