use std::ops;
use std::path::{Path, PathBuf};

use crate::errors::*;

/// Simple wrapper around `PathBuf` enforcing that the contained path is absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    pub fn from_unchecked(abs: PathBuf) -> Self {
        assert!(
            abs.is_absolute(),
            "Expected an absolute path, but got '{}'",
            abs.display()
        );
        Self(abs)
    }
}

impl ops::Deref for AbsPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for AbsPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Wrapper around `PathBuf` guaranteeing that, at creation time, the path exists and is
/// canonical. Used for the vault database file, to avoid ambiguity between several paths
/// pointing at the same file (see TMSU #168 for the kind of bug this avoids).
#[derive(Debug, Clone)]
pub struct CanonicalPath(AbsPath);

impl CanonicalPath {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self(AbsPath::from_unchecked(path.as_ref().canonicalize()?)))
    }
}

impl ops::Deref for CanonicalPath {
    type Target = AbsPath;

    fn deref(&self) -> &AbsPath {
        &self.0
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_path_requires_absolute() {
        let _ = AbsPath::from_unchecked(PathBuf::from("/tmp/vault.db"));
    }
}
