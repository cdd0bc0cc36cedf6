//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the gate. It
//! handles:
//! - Mapping a framework request to a [`RequestAdapter`]
//! - Pulling the bearer credential from header or cookie
//! - Running the gate and route allow-list in one call
//!
//! It contains no framework-specific code. An axum or actix integration
//! builds a `RequestAdapter` from its request type, calls
//! [`authenticate_request`], and turns an [`Error`](crate::Error) into a
//! response with [`Error::status_code`](crate::Error::status_code).
//!
//! # Example Flow
//!
//! ```ignore
//! let mut adapter = RequestAdapter::new(request_id);
//! adapter.set_path(req.uri().path());
//! for (name, value) in req.headers() {
//!     adapter.add_header(name.as_str(), value.to_str()?);
//! }
//!
//! let authed = authenticate_request(&gate, &access, &adapter)?;
//! let ride = rides.transition(&authed.request_id, &authed.actor, &ride_id, target)?;
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::{extract_credential, ExtractCredential};
pub use middleware::{authenticate_request, AuthenticatedRequest};
