//! Post repository for database operations.
//!
//! Implements post persistence using SeaORM. Writes run inside their own
//! transaction.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use tracing::error;
use uuid::Uuid;

use crate::entities::posts;
use snapfeed_core::post::{
    FileType, NewPost, Post, PostError, PostRepository as PostRepoTrait,
};

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostRepoTrait for PostRepository {
    async fn insert(&self, input: NewPost) -> Result<Post, PostError> {
        let txn = self.db.begin().await.map_err(persistence)?;

        let active_model = posts::ActiveModel {
            id: Set(input.id),
            caption: Set(input.caption),
            url: Set(input.url),
            file_type: Set(input.file_type.as_str().to_string()),
            file_name: Set(input.file_name),
            created_at: Set(input.created_at),
        };

        let model = active_model.insert(&txn).await.map_err(persistence)?;
        txn.commit().await.map_err(persistence)?;

        to_domain(model)
    }

    async fn list_newest_first(&self) -> Result<Vec<Post>, PostError> {
        let models = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(persistence)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, PostError> {
        let model = posts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(persistence)?;

        model.map(to_domain).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PostError> {
        let txn = self.db.begin().await.map_err(persistence)?;

        let result = posts::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(persistence)?;
        txn.commit().await.map_err(persistence)?;

        Ok(result.rows_affected > 0)
    }
}

fn persistence(err: DbErr) -> PostError {
    error!(error = %err, "Database operation failed");
    PostError::repository(err.to_string())
}

/// Convert database model to domain model.
fn to_domain(model: posts::Model) -> Result<Post, PostError> {
    let file_type = FileType::parse(&model.file_type).ok_or_else(|| {
        PostError::repository(format!(
            "post {} has unknown file_type '{}'",
            model.id, model.file_type
        ))
    })?;

    Ok(Post {
        id: model.id,
        caption: model.caption,
        url: model.url,
        file_type,
        file_name: model.file_name,
        created_at: model.created_at,
    })
}
