use super::WorkflowSession;
use crate::shared::fs_atomic::atomic_write_file;
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode session {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write session {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn session_path(state_root: &Path) -> PathBuf {
    state_root.join(SESSION_FILE_NAME)
}

pub fn load_session(state_root: &Path) -> Result<Option<WorkflowSession>, SessionError> {
    let path = session_path(state_root);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    let session = serde_json::from_str(&raw).map_err(|source| SessionError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(session))
}

pub fn save_session(state_root: &Path, session: &WorkflowSession) -> Result<PathBuf, SessionError> {
    let path = session_path(state_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SessionError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let body = serde_json::to_vec_pretty(session).map_err(|source| SessionError::Encode {
        path: path.display().to_string(),
        source,
    })?;
    atomic_write_file(&path, &body).map_err(|source| SessionError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}
