//! Engine assembly layers.
//!
//! Only the minimal (sandboxed) engine lives in this core; the full
//! engine wires a dictionary-backed converter on top of the same
//! interfaces.

mod minimal;

pub use minimal::{MinimalEngine, StubUserDataManager, UserDataManager};
