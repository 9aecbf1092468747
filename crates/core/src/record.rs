//! Persistence of collected records.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// A collected record: field names mapped to values, optionally grouped
/// one level deep.
pub type Record = Map<String, Value>;

#[derive(Debug)]
enum Cause {
    Encode(serde_json::Error),
    Io(io::Error),
}

/// Describes a failure to write a record to disk.
#[derive(Debug)]
pub struct PersistError {
    path: PathBuf,
    cause: Cause,
}

impl PersistError {
    /// Returns the path that could not be written.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Cause::Encode(err) => {
                write!(f, "cannot encode record for {}: {err}", self.path.display())
            }
            Cause::Io(err) => {
                write!(f, "cannot write {}: {err}", self.path.display())
            }
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Cause::Encode(err) => Some(err),
            Cause::Io(err) => Some(err),
        }
    }
}

/// Writes `value` to `path` as indented UTF-8 JSON, replacing any existing
/// file.
pub async fn save_record(path: &Path, value: &Value) -> Result<(), PersistError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|err| {
        PersistError {
            path: path.to_owned(),
            cause: Cause::Encode(err),
        }
    })?;
    json.push('\n');
    tokio::fs::write(path, json)
        .await
        .map_err(|err| PersistError {
            path: path.to_owned(),
            cause: Cause::Io(err),
        })?;
    debug!("saved record to {}", path.display());
    Ok(())
}
