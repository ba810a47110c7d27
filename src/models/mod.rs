pub mod message;
pub mod schema;

pub use message::*;
pub use schema::*;
