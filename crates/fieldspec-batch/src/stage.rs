use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use tracing::debug;

use crate::error::{HarnessError, Result};

/// Unpack a job archive into a clean `work_dir`.
///
/// Whatever was in `work_dir` before is removed. Entries whose paths would
/// land outside it are rejected.
pub fn stage(archive: &[u8], work_dir: &Path) -> Result<usize> {
    if work_dir.exists() {
        fs::remove_dir_all(work_dir)?;
    }
    fs::create_dir_all(work_dir)?;

    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut files = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| HarnessError::Archive(format!("unsafe entry path {:?}", entry.name())))?;
        let target = work_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        files += 1;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
        }
    }
    debug!(files, dir = %work_dir.display(), "unpacked archive");
    Ok(files)
}
