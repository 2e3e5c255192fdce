pub mod builder;
pub mod fixture;
pub mod handler;
pub mod listener;

pub use builder::ServerBuilder;
pub use fixture::{FixtureServer, ServerError};
pub use handler::RequestHandler;
pub use listener::{bind_tcp, register};
