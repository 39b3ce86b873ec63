//! REST API over the mock store.
//!
//! Routes are nested under `/api/v1/`. Protected routes run through
//! Auth → Access log → Handler. The router is composable: `api_router()`
//! returns a `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{api_router, api_router_with_ctx, API_PREFIX};
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
