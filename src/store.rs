use crate::error::CliError;
use crate::json::stable_pretty;
use crate::model::{default_store, Store};
use serde_json::Value;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn resolve_store_path(cli_store_path: Option<&str>) -> Result<String, CliError> {
    if let Some(p) = cli_store_path.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        return Ok(p.to_string());
    }

    if let Ok(p) = std::env::var("HABITS_STORE_PATH") {
        let p = p.trim().to_string();
        if !p.is_empty() {
            return Ok(p);
        }
    }

    let base = std::env::var("XDG_DATA_HOME")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok());

    let base = match (base, home) {
        (Some(b), _) => b,
        (None, Some(h)) => Path::new(&h)
            .join(".local")
            .join("share")
            .to_string_lossy()
            .to_string(),
        (None, None) => return Err(CliError::io("Store IO error")),
    };

    Ok(Path::new(&base)
        .join("habits-cli")
        .join("store.json")
        .to_string_lossy()
        .to_string())
}

fn validate_store_shape(store: &Store) -> Result<(), CliError> {
    if store.version != 1 {
        return Err(CliError::io("Store corrupted"));
    }
    if store.meta.next_habit_number < 1 || store.meta.next_completion_number < 1 {
        return Err(CliError::io("Store corrupted"));
    }
    Ok(())
}

pub fn read_store(store_path: &str) -> Result<Store, CliError> {
    match fs::read_to_string(store_path) {
        Ok(txt) => {
            let store: Store =
                serde_json::from_str(&txt).map_err(|_| CliError::io("Store corrupted"))?;
            validate_store_shape(&store)?;
            Ok(store)
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(default_store())
            } else {
                Err(CliError::io("Store IO error"))
            }
        }
    }
}

/// Documents of a named collection. Absence is its own condition so the
/// streaks view can tell "not set up yet" apart from any real failure.
pub fn collection<'a>(store: &'a Store, name: &str) -> Result<&'a Vec<Value>, CliError> {
    store
        .collections
        .get(name)
        .ok_or_else(|| CliError::missing_collection(name))
}

/// Mutable documents of a named collection, creating it when absent.
pub fn collection_mut<'a>(store: &'a mut Store, name: &str) -> &'a mut Vec<Value> {
    store.collections.entry(name.to_string()).or_default()
}

fn ensure_parent_dir(store_path: &str) -> Result<(), CliError> {
    let dir = Path::new(store_path)
        .parent()
        .ok_or_else(|| CliError::io("Store IO error"))?;
    fs::create_dir_all(dir).map_err(|_| CliError::io("Store IO error"))?;

    #[cfg(unix)]
    {
        let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
    }

    Ok(())
}

struct WriteLock {
    path: PathBuf,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn with_write_lock<R>(
    store_path: &str,
    f: impl FnOnce() -> Result<R, CliError>,
) -> Result<R, CliError> {
    let lock_path = PathBuf::from(format!("{}.lock", store_path));

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&lock_path)
    {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                let _ = file.set_permissions(fs::Permissions::from_mode(0o600));
            }
            let _ = file.write_all(b"");
            let _guard = WriteLock { path: lock_path };
            f()
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                Err(CliError::io("Store is locked"))
            } else {
                Err(CliError::io("Store IO error"))
            }
        }
    }
}

fn write_store_inner(store_path: &str, store: &Store) -> Result<(), CliError> {
    validate_store_shape(store)?;
    ensure_parent_dir(store_path)?;

    let dir = Path::new(store_path)
        .parent()
        .ok_or_else(|| CliError::io("Store IO error"))?;

    let tmp_path = dir.join(format!(".store.json.tmp.{}", std::process::id()));
    let data = stable_pretty(store).map_err(|_| CliError::io("Store IO error"))? + "\n";

    {
        let mut f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|_| CliError::io("Store IO error"))?;

        #[cfg(unix)]
        {
            let _ = f.set_permissions(fs::Permissions::from_mode(0o600));
        }

        f.write_all(data.as_bytes())
            .map_err(|_| CliError::io("Store IO error"))?;
        let _ = f.flush();
    }

    fs::rename(&tmp_path, store_path).map_err(|_| {
        let _ = fs::remove_file(&tmp_path);
        CliError::io("Store IO error")
    })?;

    #[cfg(unix)]
    {
        let _ = fs::set_permissions(store_path, fs::Permissions::from_mode(0o600));
    }

    Ok(())
}

pub fn update_store<R>(
    store_path: &str,
    mutator: impl FnOnce(&mut Store) -> Result<R, CliError>,
) -> Result<R, CliError> {
    ensure_parent_dir(store_path)?;
    with_write_lock(store_path, || {
        let mut store = read_store(store_path)?;
        let out = mutator(&mut store)?;
        validate_store_shape(&store)?;
        write_store_inner(store_path, &store)?;
        Ok(out)
    })
}
