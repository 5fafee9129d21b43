// Application layer - use cases and orchestration.
// The service owns the working ledger and keeps the table store in sync.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
