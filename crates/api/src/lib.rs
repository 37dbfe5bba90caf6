//! HTTP API layer for studycircle.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: reporting, ratings, karma preview, and the admin
//!   moderation panel
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token resolution, logging
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
