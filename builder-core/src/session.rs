//! `~/.builder/session.yaml`: the persisted sign-in.
//!
//! Written with mode `0600` on unix since it carries the auth token.
//! `BUILDER_USERNAME` + `BUILDER_AUTH_TOKEN` together take precedence over
//! the file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{builder_root, home};
use crate::error::{io_err, ConfigError};
use crate::types::Session;

pub const USERNAME_ENV: &str = "BUILDER_USERNAME";
pub const AUTH_TOKEN_ENV: &str = "BUILDER_AUTH_TOKEN";

/// `<home>/.builder/session.yaml`
pub fn session_path_at(home: &Path) -> PathBuf {
    builder_root(home).join("session.yaml")
}

pub fn load_at(home: &Path) -> Result<Option<Session>, ConfigError> {
    load_with_env_at(home, |key| std::env::var(key).ok())
}

pub fn load_with_env_at(
    home: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<Session>, ConfigError> {
    if let (Some(username), Some(token)) = (lookup(USERNAME_ENV), lookup(AUTH_TOKEN_ENV)) {
        if !username.is_empty() && !token.is_empty() {
            return Ok(Some(Session::new(username, token)));
        }
    }

    let path = session_path_at(home);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let session = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok(Some(session))
}

pub fn load() -> Result<Option<Session>, ConfigError> {
    load_at(&home()?)
}

pub fn save_at(home: &Path, session: &Session) -> Result<PathBuf, ConfigError> {
    let root = builder_root(home);
    fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    let path = session_path_at(home);
    let yaml = serde_yaml::to_string(session)?;
    write_private(&path, yaml.as_bytes())?;
    tracing::info!(username = %session.username, "session saved");
    Ok(path)
}

pub fn save(session: &Session) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, session)
}

/// Remove the persisted session. Returns whether one existed.
pub fn clear_at(home: &Path) -> Result<bool, ConfigError> {
    let path = session_path_at(home);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(&path, err)),
    }
}

pub fn clear() -> Result<bool, ConfigError> {
    clear_at(&home()?)
}

/// Write `contents` so the file is never readable by others, not even
/// briefly: a new file is created `0600`, an existing one is tightened before
/// the token is written into it.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    if path.exists() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| io_err(path, e))?;
    }
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.write_all(contents).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    fs::write(path, contents).map_err(|e| io_err(path, e))
}
