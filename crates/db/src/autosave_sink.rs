//! Autosave sink that persists workbook responses.

use async_trait::async_trait;
use empodhera_core::autosave::{Autosave, AutosaveSink};
use empodhera_core::error::CoreError;
use empodhera_core::types::DbId;
use empodhera_core::workbook;
use serde_json::Value;
use sqlx::PgPool;

use crate::repositories::WorkbookResponseRepo;

/// Why a workbook autosave did not persist.
#[derive(Debug, thiserror::Error)]
pub enum WorkbookSaveError {
    /// The value does not have the shape of the activity's widget.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validates and upserts one activity's response for one user.
#[derive(Clone)]
pub struct WorkbookResponseSink {
    pool: PgPool,
    user_id: DbId,
    module_id: i32,
    activity_id: String,
}

impl WorkbookResponseSink {
    pub fn new(pool: PgPool, user_id: DbId, module_id: i32, activity_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id,
            module_id,
            activity_id: activity_id.into(),
        }
    }

    /// Build an [`Autosave`] for this activity with the debounce delay of its
    /// widget. Fails for activities that are not in the catalog.
    pub fn into_autosave(self) -> Result<Autosave<Self>, CoreError> {
        let activity = workbook::find_activity(self.module_id, &self.activity_id)?;
        Ok(Autosave::for_widget(self, activity.kind))
    }
}

#[async_trait]
impl AutosaveSink for WorkbookResponseSink {
    type Value = Value;
    type Error = WorkbookSaveError;

    async fn save(&self, value: &Value) -> Result<(), WorkbookSaveError> {
        workbook::validate_response(self.module_id, &self.activity_id, value)?;
        WorkbookResponseRepo::upsert(
            &self.pool,
            self.user_id,
            self.module_id,
            &self.activity_id,
            value,
        )
        .await?;
        tracing::debug!(
            user_id = self.user_id,
            module_id = self.module_id,
            activity_id = %self.activity_id,
            "Workbook response autosaved",
        );
        Ok(())
    }
}
