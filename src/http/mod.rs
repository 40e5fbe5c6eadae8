//! HTTP surfaces of both services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID, trace-context carriers)
//!     → server.rs   GET /weather?cep=      (pipeline service)
//!       gateway.rs  POST /weather {"cep"}  (gateway)
//!     → response.rs (fixed status/message table)
//!     → Send to client
//! ```

pub mod gateway;
pub mod request;
pub mod response;
pub mod server;

pub use gateway::GatewayServer;
pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{serve, HttpServer};
