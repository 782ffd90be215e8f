//! Client core for the LMS: session handling, the HTTP adapter, typed
//! resource clients, content reordering and the screen controllers.

pub mod assets;
pub mod auth;
mod context;
pub mod error;
pub mod pages;
pub mod reorder;
pub mod resources;
pub mod router;
pub mod session;
pub mod transport;

pub use assets::AssetResolver;
pub use auth::AuthService;
pub use context::LmsClient;
pub use error::{ClientError, ClientResult};
pub use reorder::{array_move, ContentOrderBackend, ReorderCoordinator, ReorderOutcome};
pub use router::{Navigator, Route, RouteGuard};
pub use session::{ClearReason, Session, SessionEvent, SessionStore};
pub use transport::{ApiClient, Upload};

#[cfg(test)]
#[path = "tests/mock_api.rs"]
pub(crate) mod mock_api;
