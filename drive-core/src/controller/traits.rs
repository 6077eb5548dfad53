use async_trait::async_trait;
use compact_str::CompactString;
use serde_json::Value;

use crate::error::AppError;
use crate::model::route::Roots;

/// Storage seam the event loop runs commands against.
///
/// Listings answer with the raw `{ pathSegments, results }` payload; decoding
/// and relevance checks happen in the dispatcher.
#[async_trait]
pub trait DriveBackend: Send + Sync {
    async fn list_directory(&self, path_segments: &[CompactString]) -> Result<Value, AppError>;

    /// `path_segments` start with `root`.
    async fn list_public_directory(
        &self,
        path_segments: &[CompactString],
        root: &str,
    ) -> Result<Value, AppError>;

    async fn resolve_address(&self, input: &str) -> Result<Roots, AppError>;

    async fn store_roots(&self, roots: &Roots) -> Result<(), AppError>;

    async fn remove_stored_roots(&self) -> Result<(), AppError>;

    /// Roots stored by an earlier session.
    async fn stored_roots(&self) -> Result<Option<Roots>, AppError>;

    async fn create_directory(&self, path: &[CompactString]) -> Result<(), AppError>;

    async fn rename(&self, path: &[CompactString], new_name: &str) -> Result<(), AppError>;

    async fn remove(&self, path: &[CompactString]) -> Result<(), AppError>;

    fn name(&self) -> &'static str;
}
