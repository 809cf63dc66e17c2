use crate::domain::{
    comment::{
        entity::{Comment, CommentFlag},
        errors::CommentError,
        repository::{CommentFilter, CommentOrder, CommentRepository, CommentSchema, Placement},
    },
    shared::pagination::PageWindow,
    target::entity::TargetKey,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, target_type, target_pk, parent_id, tree_id, level, path, \
     user_id, user_name, user_email, user_url, body, submitted_at, ip_address, is_public, is_removed";

pub struct SqlxCommentRepository {
    pub pool: PgPool,
}

impl SqlxCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CommentFilter) {
    qb.push(" WHERE TRUE");
    if let Some(target) = &filter.target {
        qb.push(" AND target_type = ")
            .push_bind(target.type_tag.clone())
            .push(" AND target_pk = ")
            .push_bind(target.primary_key.clone());
    }
    match filter.placement {
        Placement::Any => {}
        Placement::RootsOnly => {
            qb.push(" AND parent_id IS NULL");
        }
        Placement::RepliesOnly => {
            qb.push(" AND parent_id IS NOT NULL");
        }
    }
    if let Some(tree_ids) = &filter.tree_ids {
        qb.push(" AND tree_id = ANY(").push_bind(tree_ids.clone()).push(")");
    }
    if filter.public_only {
        qb.push(" AND is_public");
    }
    if filter.hide_removed {
        qb.push(" AND NOT is_removed");
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, order: &CommentOrder) {
    match order {
        CommentOrder::Sorted(spec) => {
            qb.push(" ORDER BY ");
            for field in &spec.fields {
                qb.push(field.field.column())
                    .push(if field.descending { " DESC, " } else { " ASC, " });
            }
            qb.push("id ASC");
        }
        CommentOrder::DepthFirst => {
            qb.push(" ORDER BY tree_id ASC, path ASC");
        }
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    fn schema(&self) -> CommentSchema {
        CommentSchema::default()
    }

    async fn ping(&self) -> Result<(), CommentError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, order))]
    async fn find(
        &self,
        filter: &CommentFilter,
        order: &CommentOrder,
        window: Option<PageWindow>,
    ) -> Result<Vec<Comment>, CommentError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM comments", COMMENT_COLUMNS));
        push_filter(&mut qb, filter);
        push_order(&mut qb, order);
        if let Some(window) = window {
            qb.push(" LIMIT ")
                .push_bind(window.limit)
                .push(" OFFSET ")
                .push_bind(window.offset);
        }
        let rows: Vec<Comment> = qb.build_query_as().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "comment query");
        Ok(rows)
    }

    async fn count(&self, filter: &CommentFilter) -> Result<i64, CommentError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)::bigint FROM comments");
        push_filter(&mut qb, filter);
        let total: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, CommentError> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_submitted_between(
        &self,
        target: &TargetKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Comment>, CommentError> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments \
             WHERE target_type = $1 AND target_pk = $2 AND submitted_at >= $3 AND submitted_at < $4 \
             ORDER BY submitted_at ASC, id ASC",
            COMMENT_COLUMNS
        ))
        .bind(&target.type_tag)
        .bind(&target.primary_key)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id))]
    async fn insert(&self, comment: &Comment) -> Result<Comment, CommentError> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {cols}",
            cols = COMMENT_COLUMNS
        ))
        .bind(comment.id)
        .bind(&comment.target_type)
        .bind(&comment.target_pk)
        .bind(comment.parent_id)
        .bind(comment.tree_id)
        .bind(comment.level)
        .bind(&comment.path)
        .bind(comment.user_id)
        .bind(&comment.user_name)
        .bind(&comment.user_email)
        .bind(&comment.user_url)
        .bind(&comment.body)
        .bind(comment.submitted_at)
        .bind(comment.ip_address)
        .bind(comment.is_public)
        .bind(comment.is_removed)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, CommentError> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET user_id = $2, user_name = $3, user_email = $4, user_url = $5, \
                    body = $6, is_public = $7, is_removed = $8 \
             WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(comment.id)
        .bind(comment.user_id)
        .bind(&comment.user_name)
        .bind(&comment.user_email)
        .bind(&comment.user_url)
        .bind(&comment.body)
        .bind(comment.is_public)
        .bind(comment.is_removed)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(CommentError::CommentNotFound(comment.id))
    }

    async fn get_or_create_flag(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        flag: &str,
    ) -> Result<(CommentFlag, bool), CommentError> {
        let inserted = sqlx::query_as::<_, CommentFlag>(
            "INSERT INTO comment_flags (id, comment_id, user_id, flag, flagged_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (comment_id, user_id, flag) DO NOTHING \
             RETURNING id, comment_id, user_id, flag, flagged_at",
        )
        .bind(Uuid::now_v7())
        .bind(comment_id)
        .bind(user_id)
        .bind(flag)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(created) = inserted {
            return Ok((created, true));
        }

        let existing = sqlx::query_as::<_, CommentFlag>(
            "SELECT id, comment_id, user_id, flag, flagged_at FROM comment_flags \
             WHERE comment_id = $1 AND user_id = $2 AND flag = $3",
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(flag)
        .fetch_one(&self.pool)
        .await?;
        Ok((existing, false))
    }
}
