//! ``src/operators/local_backend.rs``
//! ============================================================================
//! # `LocalBackend`: a drive and public trees on the local filesystem
//!
//! Layout under the configured directories:
//!
//! * `drive.root` is the user's own drive.
//! * `drive.public_dir/<address>/` is a public tree reachable by `address`.
//! * `drive.public_dir/<name>` as a plain file is an alias whose trimmed
//!   content names another tree in `public_dir`.
//! * `drive.roots_file` keeps the last resolved roots as JSON.
//!
//! Listings answer with the same `{ pathSegments, results, error }` payload a
//! remote service would send, so the dispatcher decodes both the same way.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde_json::{Value, json};
use tokio::fs as TokioFs;
use tracing::{Span, debug, info, instrument, warn};

use crate::config::DriveConfig;
use crate::controller::traits::DriveBackend;
use crate::error::AppError;
use crate::fs::{
    normalize::EntrySource,
    utils::{is_hidden, validate_name},
};
use crate::model::route::Roots;

#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    public_dir: PathBuf,
    roots_file: PathBuf,
    show_hidden: bool,
}

impl LocalBackend {
    #[must_use]
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            root: config.root.clone(),
            public_dir: config.public_dir.clone(),
            roots_file: config.roots_file.clone(),
            show_hidden: config.show_hidden,
        }
    }

    /// Creates the drive root and the public directory if missing.
    pub async fn ensure_layout(&self) -> Result<(), AppError> {
        TokioFs::create_dir_all(&self.root).await?;
        TokioFs::create_dir_all(&self.public_dir).await?;
        debug!(
            root = %self.root.display(),
            public_dir = %self.public_dir.display(),
            "Backend layout ready"
        );
        Ok(())
    }

    /// Joins validated segments onto `base`; `..` and separators never escape it.
    fn locate(base: &Path, segments: &[CompactString]) -> Result<PathBuf, AppError> {
        let mut path = base.to_path_buf();
        for segment in segments {
            validate_name("path", segment)?;
            path.push(segment.as_str());
        }
        Ok(path)
    }

    #[instrument(
        name = "list_directory",
        level = "info",
        fields(
            path = %relative.join("/"),
            source = ?source,
            entries = tracing::field::Empty
        ),
        skip_all
    )]
    async fn list_at(
        &self,
        base: &Path,
        request: &[CompactString],
        relative: &[CompactString],
        source: EntrySource,
    ) -> Result<Value, AppError> {
        let target = Self::locate(base, relative)?;

        let metadata = match TokioFs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %target.display(), "Listed path does not exist");
                return Ok(json!({
                    "pathSegments": request,
                    "error": format!("No such file or directory: /{}", relative.join("/")),
                }));
            }
            Err(e) => return Err(e.into()),
        };

        let results = if metadata.is_dir() {
            self.read_entries(&target, relative, source).await?
        } else {
            // A file link lists just that file.
            let name = relative.last().map_or("", CompactString::as_str);
            vec![entry_json(source, name, &relative.join("/"), &metadata)]
        };

        Span::current().record("entries", results.len());

        Ok(json!({
            "pathSegments": request,
            "results": results,
        }))
    }

    async fn read_entries(
        &self,
        directory: &Path,
        relative: &[CompactString],
        source: EntrySource,
    ) -> Result<Vec<Value>, AppError> {
        let mut read_dir = TokioFs::read_dir(directory).await?;
        let mut results = Vec::new();
        let mut filtered = 0_usize;

        while let Some(entry) = read_dir.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!(path = %entry.path().display(), "Skipping entry with non UTF-8 name");
                continue;
            };

            if !self.show_hidden && is_hidden(name) {
                filtered += 1;
                continue;
            }

            match entry.metadata().await {
                Ok(metadata) => {
                    let path = relative
                        .iter()
                        .map(CompactString::as_str)
                        .chain(std::iter::once(name))
                        .collect::<Vec<_>>()
                        .join("/");
                    results.push(entry_json(source, name, &path, &metadata));
                }
                Err(e) => {
                    debug!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to read entry metadata"
                    );
                }
            }
        }

        debug!(
            path = %directory.display(),
            entries = results.len(),
            filtered,
            "Directory read"
        );
        Ok(results)
    }
}

/// One listing entry in the shape the matching adapter decodes.
fn entry_json(source: EntrySource, name: &str, path: &str, metadata: &Metadata) -> Value {
    let size = metadata.is_file().then(|| metadata.len());

    match source {
        EntrySource::Drive => json!({
            "name": name,
            "path": path,
            "isFile": !metadata.is_dir(),
            "size": size,
            "mtime": metadata
                .modified()
                .ok()
                .map(|modified| DateTime::<Utc>::from(modified).timestamp_millis()),
        }),
        EntrySource::PublicTree => json!({
            "name": name,
            "path": path,
            "type": if metadata.is_dir() { "dir" } else { "file" },
            "size": size,
        }),
    }
}

fn not_found_is_ok(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[async_trait]
impl DriveBackend for LocalBackend {
    async fn list_directory(&self, path_segments: &[CompactString]) -> Result<Value, AppError> {
        self.list_at(&self.root, path_segments, path_segments, EntrySource::Drive)
            .await
    }

    async fn list_public_directory(
        &self,
        path_segments: &[CompactString],
        root: &str,
    ) -> Result<Value, AppError> {
        validate_name("root", root)?;

        let relative = match path_segments.split_first() {
            Some((first, relative)) if first.as_str() == root => relative,
            _ => {
                return Err(AppError::backend(
                    "list_public_directory",
                    format!("request does not start at root '{root}'"),
                ));
            }
        };

        let base = self.public_dir.join(root);
        self.list_at(&base, path_segments, relative, EntrySource::PublicTree)
            .await
    }

    #[instrument(
        name = "resolve_address",
        level = "info",
        fields(address = %input.trim(), is_dns_link = tracing::field::Empty),
        skip_all
    )]
    async fn resolve_address(&self, input: &str) -> Result<Roots, AppError> {
        let address = input.trim();
        validate_name("address", address)
            .map_err(|e| AppError::unresolved(address, e.to_string()))?;

        let candidate = self.public_dir.join(address);
        let metadata = match TokioFs::metadata(&candidate).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::unresolved(address, "no such public tree"));
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            Span::current().record("is_dns_link", false);
            info!(resolved = address, "Address names a tree directly");
            return Ok(Roots {
                unresolved: address.into(),
                resolved: address.into(),
                is_dns_link: false,
            });
        }

        let alias = TokioFs::read_to_string(&candidate).await?;
        let target = alias.trim();
        validate_name("alias", target)
            .map_err(|e| AppError::unresolved(address, format!("bad alias target: {e}")))?;

        let target_is_tree = TokioFs::metadata(self.public_dir.join(target))
            .await
            .is_ok_and(|metadata| metadata.is_dir());
        if !target_is_tree {
            return Err(AppError::unresolved(
                address,
                format!("alias points at missing tree '{target}'"),
            ));
        }

        Span::current().record("is_dns_link", true);
        info!(resolved = target, "Address resolved through alias");
        Ok(Roots {
            unresolved: address.into(),
            resolved: target.into(),
            is_dns_link: true,
        })
    }

    async fn store_roots(&self, roots: &Roots) -> Result<(), AppError> {
        if let Some(parent) = self.roots_file.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(roots)?;
        TokioFs::write(&self.roots_file, bytes).await?;

        debug!(path = %self.roots_file.display(), "Roots stored");
        Ok(())
    }

    async fn remove_stored_roots(&self) -> Result<(), AppError> {
        not_found_is_ok(TokioFs::remove_file(&self.roots_file).await)?;
        debug!(path = %self.roots_file.display(), "Stored roots removed");
        Ok(())
    }

    async fn stored_roots(&self) -> Result<Option<Roots>, AppError> {
        let text = match TokioFs::read_to_string(&self.roots_file).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let roots = serde_json::from_str(&text)
            .map_err(|e| AppError::from(e).with_context("stored roots"))?;
        Ok(Some(roots))
    }

    #[instrument(
        name = "create_directory_operation",
        level = "info",
        fields(path = %path.join("/")),
        skip_all
    )]
    async fn create_directory(&self, path: &[CompactString]) -> Result<(), AppError> {
        if path.is_empty() {
            return Err(AppError::invalid_input("path", "the drive root already exists"));
        }

        let target = Self::locate(&self.root, path)?;
        TokioFs::create_dir(&target)
            .await
            .map_err(|e| AppError::operation_failed("create_directory", &target, e.to_string()))?;

        info!(path = %target.display(), "Directory created successfully");
        Ok(())
    }

    #[instrument(
        name = "rename_operation",
        level = "info",
        fields(
            source = %path.join("/"),
            new_name = %new_name,
            destination = tracing::field::Empty
        ),
        skip_all
    )]
    async fn rename(&self, path: &[CompactString], new_name: &str) -> Result<(), AppError> {
        validate_name("new_name", new_name)?;

        let source = Self::locate(&self.root, path)?;
        let Some(parent) = source.parent().filter(|_| !path.is_empty()) else {
            return Err(AppError::invalid_input("path", "the drive root cannot be renamed"));
        };
        let destination = parent.join(new_name);
        Span::current().record("destination", tracing::field::display(destination.display()));

        if TokioFs::try_exists(&destination).await? {
            return Err(AppError::operation_failed(
                "rename",
                &source,
                format!("'{new_name}' already exists"),
            ));
        }

        TokioFs::rename(&source, &destination)
            .await
            .map_err(|e| AppError::operation_failed("rename", &source, e.to_string()))?;

        info!(
            source = %source.display(),
            destination = %destination.display(),
            "Rename completed successfully"
        );
        Ok(())
    }

    #[instrument(
        name = "delete_operation",
        level = "info",
        fields(path = %path.join("/"), file_type = tracing::field::Empty),
        skip_all
    )]
    async fn remove(&self, path: &[CompactString]) -> Result<(), AppError> {
        if path.is_empty() {
            return Err(AppError::invalid_input("path", "the drive root cannot be removed"));
        }

        let target = Self::locate(&self.root, path)?;
        let metadata = TokioFs::symlink_metadata(&target)
            .await
            .map_err(|e| AppError::operation_failed("remove", &target, e.to_string()))?;

        let outcome = if metadata.is_dir() {
            Span::current().record("file_type", "directory");
            TokioFs::remove_dir_all(&target).await
        } else {
            Span::current().record("file_type", "file");
            TokioFs::remove_file(&target).await
        };
        outcome.map_err(|e| AppError::operation_failed("remove", &target, e.to_string()))?;

        info!(path = %target.display(), "Removed successfully");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
