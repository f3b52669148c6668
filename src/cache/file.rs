//! JSON-file cache implementation.
//!
//! One file per user under a cache directory, written atomically with the
//! write-to-temp-then-rename pattern so a crash mid-write leaves either the
//! old or the new snapshot complete, never a torn one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::types::UserId;

use super::{LocalCacheEntry, Result, TicketCache};

/// A [`TicketCache`] backed by one JSON file per user.
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    /// Creates a cache rooted at `dir`. The directory is created on first
    /// write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileCache { dir: dir.into() }
    }

    fn entry_path(&self, user: &UserId) -> PathBuf {
        // User IDs come from the backend and may contain path-hostile
        // characters; keep only a conservative subset in the file name.
        let safe: String = user
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("tickets.{safe}.json"))
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl TicketCache for JsonFileCache {
    fn load(&self, user: &UserId) -> Result<Option<LocalCacheEntry>> {
        let path = self.entry_path(user);
        match File::open(&path) {
            Ok(file) => {
                let entry = serde_json::from_reader(BufReader::new(file))?;
                Ok(Some(entry))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, entry: &LocalCacheEntry) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.entry_path(&entry.user_id);
        let tmp = Self::tmp_path(&path);
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            serde_json::to_writer(&mut file, entry)?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
