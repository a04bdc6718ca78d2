//! Hosting runtime model
//!
//! Provides what a browser provides to a service worker: version
//! registration, lifecycle sequencing, fetch dispatch and navigation
//! preload, plus persistence of the active registration between runs.

mod registration;
pub mod state;

pub use registration::{RegisterOutcome, Registration};
pub use state::RegistrationRecord;
