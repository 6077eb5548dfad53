//! `src/model/item.rs`
//! ============================================================
//! Canonical directory entry shared by both backends.
//!
//! Backend payloads are converted into `Item`s by the adapters in
//! `fs::normalize`; nothing downstream ever looks at a raw entry again.

use std::fmt;

use chrono::{DateTime, Utc};
use compact_str::CompactString;

use crate::model::route::PathSegments;

/// Coarse content category of a file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MimeCategory {
    Archive,
    Audio,
    Code,
    Document,
    Image,
    Text,
    Video,
    Other,
}

impl MimeCategory {
    #[must_use]
    pub fn from_extension(extension: Option<&str>) -> Self {
        let Some(extension) = extension else {
            return Self::Other;
        };

        match extension {
            "7z" | "gz" | "rar" | "tar" | "tgz" | "zip" => Self::Archive,
            "aac" | "flac" | "m4a" | "mp3" | "ogg" | "opus" | "wav" => Self::Audio,
            "c" | "css" | "elm" | "go" | "h" | "hs" | "html" | "java" | "js" | "json" | "py"
            | "rb" | "rs" | "sh" | "toml" | "ts" | "yaml" | "yml" => Self::Code,
            "doc" | "docx" | "epub" | "odt" | "pdf" | "ppt" | "pptx" | "xls" | "xlsx" => {
                Self::Document
            }
            "avif" | "bmp" | "gif" | "heic" | "ico" | "jpeg" | "jpg" | "png" | "svg" | "webp" => {
                Self::Image
            }
            "csv" | "log" | "md" | "markdown" | "rtf" | "txt" => Self::Text,
            "avi" | "m4v" | "mkv" | "mov" | "mp4" | "webm" => Self::Video,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for MimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Archive => "archive",
            Self::Audio => "audio",
            Self::Code => "code",
            Self::Document => "document",
            Self::Image => "image",
            Self::Text => "text",
            Self::Video => "video",
            Self::Other => "file",
        };

        write!(f, "{s}")
    }
}

/// Directories order before files wherever kinds are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    Directory,
    File(MimeCategory),
}

impl ItemKind {
    #[must_use]
    pub fn file_named(name: &str) -> Self {
        Self::File(MimeCategory::from_extension(extension_of(name).as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Entry name as shown to the user.
    pub name: CompactString,

    /// Location below the tree root; unique within one listing.
    pub path: PathSegments,

    pub kind: ItemKind,

    /// Byte length, when the backend reports one.
    pub size: Option<u64>,

    pub modified_at: Option<DateTime<Utc>>,

    /// Opaque backend address, passed through untouched.
    pub content_id: Option<CompactString>,
}

impl Item {
    #[inline]
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.kind, ItemKind::Directory)
    }

    /// Lower-cased extension of files; directories have none.
    #[must_use]
    pub fn extension(&self) -> Option<CompactString> {
        if self.is_directory() {
            None
        } else {
            extension_of(&self.name)
        }
    }
}

/// Lower-case extension of a file name. Dot-files without a further dot
/// (`.bashrc`) have no extension.
fn extension_of(name: &str) -> Option<CompactString> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(CompactString::new(extension.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(ItemKind::file_named("report.PDF"), ItemKind::File(MimeCategory::Document));
        assert_eq!(ItemKind::file_named("song.flac"), ItemKind::File(MimeCategory::Audio));
        assert_eq!(ItemKind::file_named("Makefile"), ItemKind::File(MimeCategory::Other));
        assert_eq!(ItemKind::file_named(".bashrc"), ItemKind::File(MimeCategory::Other));
    }

    #[test]
    fn test_directories_order_before_files() {
        assert!(ItemKind::Directory < ItemKind::File(MimeCategory::Archive));
    }

    #[test]
    fn test_extension_only_for_files() {
        let mut item = Item {
            name: CompactString::new("photos.2024"),
            path: crate::model::route::path_segments(["photos.2024"]),
            kind: ItemKind::Directory,
            size: None,
            modified_at: None,
            content_id: None,
        };
        assert_eq!(item.extension(), None);

        item.kind = ItemKind::file_named("photos.2024");
        assert_eq!(item.extension().as_deref(), Some("2024"));
    }
}
