pub mod states;
pub mod store;

pub use states::{next_state, SessionEvent, SessionState, TransitionOutcome};
pub use store::Session;
