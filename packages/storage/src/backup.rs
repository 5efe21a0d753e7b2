// ABOUTME: Whole-file database backups written atomically
// ABOUTME: VACUUM INTO a temporary sibling, then rename over the destination

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::store::Store;

impl Store {
    /// Write a consistent copy of the database to `dest` and return its size in bytes.
    ///
    /// Holds the write gate for the duration, so the image reflects every
    /// write submitted before the call and none after.
    pub async fn backup_to(&self, dest: &Path) -> StorageResult<u64> {
        let _gate = self.write_gate.lock().await;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = temp_sibling(dest);
        if tmp.exists() {
            fs::remove_file(&tmp)?;
        }

        debug!("Writing database image to {}", tmp.display());
        if let Err(err) = sqlx::query("VACUUM INTO ?")
            .bind(tmp.to_string_lossy().into_owned())
            .execute(self.pool())
            .await
        {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        replace_file(&tmp, dest)?;

        let size = fs::metadata(dest)?.len();
        info!("Backup written to {} ({} bytes)", dest.display(), size);
        Ok(size)
    }
}

fn temp_sibling(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "planboard.db".to_string());
    dest.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

/// Rename `tmp` over `dest`. Where the platform refuses to replace an
/// existing file, overwrite it in place instead.
fn replace_file(tmp: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(tmp, dest) {
        Ok(()) => Ok(()),
        Err(err) if dest.exists() => {
            warn!(
                "Rename onto {} failed ({}); overwriting in place",
                dest.display(),
                err
            );
            let copied = fs::copy(tmp, dest).map(|_| ());
            let _ = fs::remove_file(tmp);
            copied
        }
        Err(err) => {
            let _ = fs::remove_file(tmp);
            Err(err)
        }
    }
}
