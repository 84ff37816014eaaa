mod state;
mod store;

pub use state::{Stage, WorkflowSession, ALL_STAGES};
pub use store::{load_session, save_session, session_path, SessionError, SESSION_FILE_NAME};
