//! Service adapters and action dispatch for Studyflow.
//!
//! Each destination service implements the [`ServiceAdapter`] trait defined
//! in [`traits`].  The adapters shipped here run in demo mode: they report
//! what they would do with a `mock` status instead of calling the service.
//! [`ActionRunner`] routes every intent of a batch to its adapter.

pub mod calendar;
pub mod error;
pub mod google_tasks;
pub mod notion;
pub mod runner;
pub mod traits;

pub use calendar::CalendarAdapter;
pub use error::{AdapterError, Result};
pub use google_tasks::GoogleTasksAdapter;
pub use notion::NotionAdapter;
pub use runner::{ActionRunner, AdapterHealth};
pub use traits::{ActionResult, ActionStatus, HealthStatus, ServiceAdapter};
