//! Menu-fetch collaborator trait

use crate::error::RouterResult;
use async_trait::async_trait;

/// Source of the backend permission node list
///
/// Implementations return the raw JSON payload; array validation and node
/// normalisation happen in [`crate::MenuStore`], so every backend gets the same
/// `MalformedResponse` handling.
#[async_trait]
pub trait MenuService: Send + Sync {
    /// Fetch the permission nodes granted to the current session
    async fn fetch_menu(&self) -> RouterResult<serde_json::Value>;

    /// Get service name
    fn name(&self) -> &str;
}
