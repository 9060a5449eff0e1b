use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FicheError;

/// Characters removed from product names before they become file names.
pub const FORBIDDEN_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|'];

/// Upper bound on `_N` suffixes tried for one name.
const MAX_SUFFIX: u32 = 10_000;

/// Strip forbidden characters and surrounding whitespace from a product name.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extension of `filename` including the leading dot, as written
/// (`"fiche.PDF"` -> `".PDF"`), or empty.
pub fn original_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Write `content` to `<dir>/<stem><extension>`, or to the first free
/// `<stem>_<n><extension>` (n = 1, 2, ...) when the name is taken.
///
/// Each candidate is opened with `create_new`, so an existing file is never
/// overwritten even if it appears between two attempts.
pub fn create_unique(
    dir: &Path,
    stem: &str,
    extension: &str,
    content: &[u8],
) -> Result<PathBuf, FicheError> {
    for counter in 0..=MAX_SUFFIX {
        let candidate = if counter == 0 {
            format!("{stem}{extension}")
        } else {
            format!("{stem}_{counter}{extension}")
        };
        let path = dir.join(&candidate);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                if let Err(e) = file.write_all(content).and_then(|_| file.sync_all()) {
                    // Do not leave a truncated copy behind
                    drop(file);
                    let _ = std::fs::remove_file(&path);
                    return Err(FicheError::Io(e));
                }
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(FicheError::Io(e)),
        }
    }

    Err(FicheError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!(
            "no free name for '{stem}{extension}' after {MAX_SUFFIX} attempts in {}",
            dir.display()
        ),
    )))
}
