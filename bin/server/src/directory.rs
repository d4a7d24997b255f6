//! Directory lookup route.

use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, State},
};
use portico_directory::{DirectoryAttributeSet, DirectoryError, DirectorySearch, LdapUserService};
use rootcause::Report;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;

/// Looks up one user's directory attributes.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn get_user(
        &self,
        uid: &str,
    ) -> Result<Option<DirectoryAttributeSet>, Report<DirectoryError>>;
}

#[async_trait]
impl<S> UserLookup for LdapUserService<S>
where
    S: DirectorySearch + 'static,
{
    async fn get_user(
        &self,
        uid: &str,
    ) -> Result<Option<DirectoryAttributeSet>, Report<DirectoryError>> {
        LdapUserService::get_user(self, uid).await
    }
}

/// Returns the directory attributes of `uid`.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<DirectoryAttributeSet>, ApiError> {
    let directory = state
        .directory
        .as_ref()
        .ok_or(ApiError::DirectoryUnavailable)?;

    match directory.get_user(&uid).await {
        Ok(Some(set)) if !set.is_empty() => Ok(Json(set)),
        Ok(_) => Err(ApiError::UserNotFound { uid }),
        Err(report) => Err(ApiError::Directory(report.to_string())),
    }
}
