//! Build sessions: the stage enum, the session state machine, and the
//! JSON-backed session store.

pub mod persistence;
pub mod session;
pub mod stage;

pub use persistence::SessionStore;
pub use session::ModelBuilderSession;
pub use stage::BuildStage;
