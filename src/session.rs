//! Explicit session state. The original app kept the signed-in user as
//! ambient context; here it is a small document beside the store that every
//! data command reads up front and `logout` tears down.

use crate::error::CliError;
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub user: String,
    pub signed_in_at: DateTime<FixedOffset>,
}

pub fn session_path(store_path: &str) -> Result<PathBuf, CliError> {
    let dir = Path::new(store_path)
        .parent()
        .ok_or_else(|| CliError::io("Store IO error"))?;
    Ok(dir.join("session.json"))
}

pub fn current_session(store_path: &str) -> Result<Option<Session>, CliError> {
    let path = session_path(store_path)?;
    match fs::read_to_string(&path) {
        Ok(txt) => {
            let session: Session =
                serde_json::from_str(&txt).map_err(|_| CliError::io("Session corrupted"))?;
            Ok(Some(session))
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(None)
            } else {
                Err(CliError::io("Session IO error"))
            }
        }
    }
}

/// Gate for every data command.
pub fn require_session(store_path: &str) -> Result<Session, CliError> {
    current_session(store_path)?
        .ok_or_else(|| CliError::auth("Not signed in. Run `habits login <user>`."))
}

pub fn sign_in(
    store_path: &str,
    user: &str,
    signed_in_at: DateTime<FixedOffset>,
) -> Result<Session, CliError> {
    let u = user.trim();
    if u.is_empty() {
        return Err(CliError::usage("User is required"));
    }

    let path = session_path(store_path)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|_| CliError::io("Session IO error"))?;
        #[cfg(unix)]
        {
            let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
        }
    }

    let session = Session {
        user: u.to_string(),
        signed_in_at,
    };
    let data = crate::json::stable_pretty(&session)
        .map_err(|_| CliError::io("Session IO error"))?
        + "\n";
    fs::write(&path, data.as_bytes()).map_err(|_| CliError::io("Session IO error"))?;

    #[cfg(unix)]
    {
        let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
    }

    Ok(session)
}

/// Idempotent: signing out without a session is not an error.
pub fn sign_out(store_path: &str) -> Result<bool, CliError> {
    let path = session_path(store_path)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(false)
            } else {
                Err(CliError::io("Session IO error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{day_start_timestamp, parse_day};

    fn ts() -> DateTime<FixedOffset> {
        day_start_timestamp(parse_day("2026-01-31", "today").unwrap())
    }

    #[test]
    fn sign_in_then_require_then_sign_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let p = store.to_str().unwrap();

        assert!(require_session(p).is_err());

        sign_in(p, "mara", ts()).unwrap();
        let session = require_session(p).unwrap();
        assert_eq!(session.user, "mara");

        assert!(sign_out(p).unwrap());
        assert!(!sign_out(p).unwrap());
        let err = require_session(p).unwrap_err();
        assert_eq!(err.exit_code, 6);
    }

    #[test]
    fn blank_user_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let err = sign_in(store.to_str().unwrap(), "   ", ts()).unwrap_err();
        assert_eq!(err.exit_code, 2);
    }
}
