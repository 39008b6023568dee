//! Pure path algebra.

use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Join `relative` onto `base` and remove `.`/`..` components lexically.
///
/// An absolute `relative` replaces `base`, matching [`Path::join`].
pub fn resolve_path(base: &Path, relative: &Path) -> PathBuf {
    base.join(relative).clean()
}

/// Lexically normalize a path without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    path.clean()
}
