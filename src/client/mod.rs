//! Typed API client
//!
//! The client half of the system: a durable session store, an HTTP
//! client that attaches credentials and recovers from a single 401 via a
//! shared refresh exchange, and a client-side route guard. All three
//! operate on one explicitly threaded `Arc<SessionStore>` constructed at
//! application start.

pub mod guard;
pub mod http;
pub mod session;

pub use guard::{RouteAccess, RouteGuard};
pub use http::{ApiClient, ClientConfig, ClientError, ProfileUpdate, RegisterPayload};
pub use session::{Session, SessionStore, SessionUser};
