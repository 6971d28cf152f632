//! Domain models for the blood-pressure tracker.

mod preview;
mod reading;
mod session;
mod summary;

pub use preview::*;
pub use reading::*;
pub use session::*;
pub use summary::*;
