use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::*;

lazy_static! {
    // Valid chars are the union of Letter, Numeric, Punctuation, Symbol and Space Unicode
    // classes. This expression is negated to match invalid characters.
    static ref INVALID_CHARS: Regex = Regex::new(r"[^\pL\pN\pP\pS\s]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(pub u32);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one occurrence of a tag in a file's ordered forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileTagId(pub u32);

impl fmt::Display for FileTagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct File {
    pub id: FileId,
    pub path: String,
    pub inode: Option<i64>,
    pub device: Option<i64>,
}

/// One occurrence of a tag for a file, positioned at a root (`parent_id == None`) or as a
/// child of another `FileTag` belonging to the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileTag {
    pub id: FileTagId,
    pub file_id: FileId,
    pub tag_id: TagId,
    pub parent_id: Option<FileTagId>,
}

/// A directed "when tag A is attached, tag B must also be attached" edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagalongEdge {
    pub tag_id: TagId,
    pub tagalong_id: TagId,
}

#[derive(Debug, Clone)]
pub struct SavedQuery {
    pub id: u32,
    pub name: String,
    pub select_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub pattern: String,
    pub ignore_case: bool,
    pub invert_match: bool,
    pub ignore_tag_case: bool,
}

pub fn validate_tag_name(name: &str) -> Result<()> {
    let error_message = match name {
        "" => Some("cannot be empty"),
        _ => None,
    };
    if let Some(message) = error_message {
        return Err(ErrorKind::InvalidArgument(format!("tag name {}", message)).into());
    }

    if let Some(mat) = INVALID_CHARS.find(name) {
        // Unwrapping is safe: the regex always matches at least one character
        let bad_char = mat.as_str().chars().next().unwrap();
        let message = format!("tag name cannot contain U+{:04X}", bad_char as u32);
        return Err(ErrorKind::InvalidArgument(message).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag_name() {
        assert!(validate_tag_name("rock").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("genre/rock").is_ok());
        assert!(validate_tag_name("control\u{0001}har").is_err());
    }
}
