//! Business Services
//!
//! - `StyleService` - custom style CRUD, quota, trash, import/export, the
//!   reactive style list and domain events
//! - `sync` - the server sync seam (`SyncBackend`, `SyncOutcome`)
//!
//! Services coordinate between the store and the editor integration,
//! implementing the business rules the store itself knows nothing about.

pub mod error;
pub mod style_service;
pub mod sync;


pub use error::StyleServiceError;
pub use style_service::StyleService;
pub use sync::{merge_remote, NoopSyncBackend, SyncBackend, SyncExchange, SyncOutcome};
