// src/lib.rs
//! Throwaway HTTP fixture for browser-automation tests.
//!
//! ```no_run
//! let mut server = fixture_server::FixtureServer::bind(8129)?;
//! server.start()?;
//! // drive a browser at server.url() ...
//! server.shutdown()?;
//! # Ok::<(), fixture_server::ServerError>(())
//! ```
pub mod config;
pub mod routes;
pub mod server;

pub use routes::{Route, RouteError};
pub use server::{FixtureServer, RequestHandler, ServerError};
