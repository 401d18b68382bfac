#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # craftform-client
//!
//! REST client for a service that hosts cubes, cylinders and entities.
//!
//! ## Features
//!
//! - Base address and path resolution with default headers on every request
//! - Token-bucket rate limiting shared across clones of one client
//! - Caller-owned cancellation: a cancelled [`Context`] aborts in-flight calls
//! - Status classification (`401`, `404`, structured `{title, detail}` errors)
//!
//! ## Example
//!
//! ```ignore
//! use craftform_client::{Client, ClientConfig, Context};
//! use craftform_core::{Cube, ResourceId};
//!
//! let client = Client::new(ClientConfig::from_env())?;
//! let ctx = Context::background().with_timeout(Duration::from_secs(10));
//! let cube = client.read_resource::<Cube>(&ctx, &ResourceId::from("abc")).await?;
//! println!("{}", cube.status);
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod limiter;
pub mod resources;

pub use client::Client;
pub use config::{ClientConfig, ConfigOverrides, RateLimit};
pub use context::{CancelHandle, CancelReason, Context};
pub use error::{Error, Result};
pub use limiter::RateLimiter;
