//! API Module
//!
//! HTTP handlers and routing that let a host process drive the sizing engine.
//!
//! # Endpoints
//! - `PUT /tick`, `PUT /phase` - Host clock and load/save phase
//! - `POST /scale`, `POST /stat`, `POST /mesh` - Size queries
//! - `POST /debug` - Debug size adjustments
//! - `/assignments`, `/assignments/:id` - Size table management
//! - `/settings` - Size settings
//! - `GET /dirty`, `GET /stats`, `GET /health` - Housekeeping

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
