//! ``src/fs/normalize.rs``
//!
//! # Backend entry adapters
//!
//! The two backends describe directory entries differently:
//!
//! * public trees: `{ "name", "path", "cid", "size", "type": "dir" | "file" }`
//! * the local drive: `{ "name", "path", "isFile", "size", "mtime", "cid" }`
//!   (`mtime` in milliseconds since the Unix epoch)
//!
//! `path`, when present, is the slash separated location below the tree
//! root. Without it the item is placed directly below the listed directory.
//!
//! Both are turned into the canonical [`Item`]. Entries that do not decode,
//! have no name, or repeat a path already seen in the same listing are
//! skipped with a warning instead of failing the whole listing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use crate::model::{
    item::{Item, ItemKind},
    route::{PathSegments, split_path},
};

/// Which adapter a listing goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Drive,
    PublicTree,
}

/// Converts one raw backend entry into an item living under `parent`.
pub trait EntryAdapter {
    type Raw: DeserializeOwned;

    const SOURCE: &'static str;

    fn to_item(raw: Self::Raw, parent: &[CompactString]) -> Option<Item>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicEntryType {
    Dir,
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub cid: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(rename = "type", default)]
    pub entry_type: PublicEntryType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_is_file")]
    pub is_file: bool,

    #[serde(default)]
    pub size: Option<u64>,

    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub mtime: Option<i64>,

    #[serde(default)]
    pub cid: Option<String>,
}

const fn default_is_file() -> bool {
    true
}

fn item_path(parent: &[CompactString], name: &str, explicit: Option<&str>) -> PathSegments {
    if let Some(path) = explicit.map(split_path).filter(|p| !p.is_empty()) {
        return path;
    }

    let mut path: PathSegments = parent.iter().cloned().collect();
    path.push(CompactString::new(name));
    path
}

fn kind_for(name: &str, is_directory: bool) -> ItemKind {
    if is_directory {
        ItemKind::Directory
    } else {
        ItemKind::file_named(name)
    }
}

pub struct PublicTreeAdapter;

impl EntryAdapter for PublicTreeAdapter {
    type Raw = PublicEntry;

    const SOURCE: &'static str = "public_tree";

    fn to_item(raw: PublicEntry, parent: &[CompactString]) -> Option<Item> {
        if raw.name.is_empty() {
            return None;
        }

        let is_directory = raw.entry_type == PublicEntryType::Dir;

        Some(Item {
            path: item_path(parent, &raw.name, raw.path.as_deref()),
            kind: kind_for(&raw.name, is_directory),
            size: if is_directory { None } else { raw.size },
            modified_at: None,
            content_id: raw.cid.map(CompactString::from),
            name: CompactString::from(raw.name),
        })
    }
}

pub struct LocalDriveAdapter;

impl EntryAdapter for LocalDriveAdapter {
    type Raw = LocalEntry;

    const SOURCE: &'static str = "local_drive";

    fn to_item(raw: LocalEntry, parent: &[CompactString]) -> Option<Item> {
        if raw.name.is_empty() {
            return None;
        }

        Some(Item {
            path: item_path(parent, &raw.name, raw.path.as_deref()),
            kind: kind_for(&raw.name, !raw.is_file),
            size: if raw.is_file { raw.size } else { None },
            modified_at: raw.mtime.and_then(DateTime::<Utc>::from_timestamp_millis),
            content_id: raw.cid.map(CompactString::from),
            name: CompactString::from(raw.name),
        })
    }
}

/// Runs every raw entry through adapter `A`, keeping the first item per path.
pub fn normalize_with<A: EntryAdapter>(
    raw_entries: &[Value],
    parent: &[CompactString],
) -> Vec<Item> {
    let mut seen: HashSet<PathSegments> = HashSet::with_capacity(raw_entries.len());
    let mut items: Vec<Item> = Vec::with_capacity(raw_entries.len());

    for (index, raw) in raw_entries.iter().enumerate() {
        let decoded: A::Raw = match serde_json::from_value(raw.clone()) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    marker = "ENTRY_SKIPPED",
                    operation_type = A::SOURCE,
                    index,
                    "Skipping undecodable entry: {e}"
                );
                continue;
            }
        };

        let Some(item) = A::to_item(decoded, parent) else {
            warn!(
                marker = "ENTRY_SKIPPED",
                operation_type = A::SOURCE,
                index,
                "Skipping entry without a name"
            );
            continue;
        };

        if !seen.insert(item.path.clone()) {
            warn!(
                marker = "ENTRY_DUPLICATE",
                operation_type = A::SOURCE,
                name = %item.name,
                "Dropping duplicate entry"
            );
            continue;
        }

        items.push(item);
    }

    items
}

/// Normalizes the entries of a listing produced by `source`.
pub fn normalize(
    source: EntrySource,
    raw_entries: &[Value],
    parent: &[CompactString],
) -> Vec<Item> {
    match source {
        EntrySource::Drive => normalize_with::<LocalDriveAdapter>(raw_entries, parent),
        EntrySource::PublicTree => normalize_with::<PublicTreeAdapter>(raw_entries, parent),
    }
}
