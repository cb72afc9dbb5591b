use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, types::Json, PgPool, Row};

use crate::model::{Comment, CommentRefs, Id, Pizza, PizzaChanges, PizzaSize, Reply};
use crate::store::traits::{CommentStore, PizzaStore, Store};

const PIZZA_COLUMNS: &str =
    "id, pizza_name, created_by, created_at, size, toppings, comments, version";
const COMMENT_COLUMNS: &str = "id, written_by, comment_body, created_at, replies, version";

const SCHEMA: [&str; 2] = [
    r#"
CREATE TABLE IF NOT EXISTS pizzas (
    id TEXT PRIMARY KEY,
    pizza_name TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    size TEXT NOT NULL DEFAULT 'Large'
        CHECK (size IN ('Personal', 'Small', 'Medium', 'Large', 'Extra Large')),
    toppings JSONB NOT NULL DEFAULT '[]'::jsonb,
    comments JSONB NOT NULL DEFAULT '[]'::jsonb,
    version BIGINT NOT NULL DEFAULT 0
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    written_by TEXT,
    comment_body TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    replies JSONB NOT NULL DEFAULT '[]'::jsonb,
    version BIGINT NOT NULL DEFAULT 0
)
"#,
];

/// Reply as kept inside the `comments.replies` JSONB column. Timestamps are
/// stored raw; formatting is an output concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredReply {
    reply_id: Id,
    reply_body: String,
    written_by: String,
    created_at: DateTime<Utc>,
}

impl From<&Reply> for StoredReply {
    fn from(reply: &Reply) -> Self {
        Self {
            reply_id: reply.reply_id.clone(),
            reply_body: reply.reply_body.clone(),
            written_by: reply.written_by.clone(),
            created_at: reply.created_at,
        }
    }
}

impl From<StoredReply> for Reply {
    fn from(stored: StoredReply) -> Self {
        Self {
            reply_id: stored.reply_id,
            reply_body: stored.reply_body,
            written_by: stored.written_by,
            created_at: stored.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the collections if they do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create collection tables")?;
        }
        log::info!("Database schema ready");
        Ok(())
    }

    async fn fetch_pizza(
        &self,
        sql: &str,
        id: &Id,
        extra: Option<&Id>,
        context: &'static str,
    ) -> Result<Option<Pizza>> {
        let mut query = sqlx::query(sql).bind(id);
        if let Some(extra) = extra {
            query = query.bind(extra);
        }
        let row = query
            .fetch_optional(&self.pool)
            .await
            .context(context)?;
        row.as_ref().map(pizza_from_row).transpose()
    }

    async fn fetch_comment(
        &self,
        sql: &str,
        id: &Id,
        context: &'static str,
    ) -> Result<Option<Comment>> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(context)?;
        row.as_ref().map(comment_from_row).transpose()
    }
}

fn pizza_from_row(row: &PgRow) -> Result<Pizza> {
    let size: String = row.try_get("size")?;
    let size = PizzaSize::parse(&size).ok_or_else(|| anyhow!("Unknown pizza size '{}'", size))?;
    let Json(toppings): Json<Vec<String>> = row.try_get("toppings")?;
    let Json(comments): Json<Vec<Id>> = row.try_get("comments")?;

    Ok(Pizza {
        id: row.try_get("id")?,
        pizza_name: row.try_get("pizza_name")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        size,
        toppings,
        comments: CommentRefs::Reference(comments),
        version: row.try_get("version")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    let Json(replies): Json<Vec<StoredReply>> = row.try_get("replies")?;

    Ok(Comment {
        id: row.try_get("id")?,
        written_by: row.try_get("written_by")?,
        comment_body: row.try_get("comment_body")?,
        created_at: row.try_get("created_at")?,
        replies: replies.into_iter().map(Reply::from).collect(),
        version: row.try_get("version")?,
    })
}

#[async_trait::async_trait]
impl PizzaStore for PostgresStore {
    async fn list_pizzas(&self) -> Result<Vec<Pizza>> {
        let sql = format!(
            "SELECT {} FROM pizzas ORDER BY id COLLATE \"C\" DESC",
            PIZZA_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list pizzas")?;

        rows.iter().map(pizza_from_row).collect()
    }

    async fn get_pizza(&self, id: &Id) -> Result<Option<Pizza>> {
        let sql = format!("SELECT {} FROM pizzas WHERE id = $1", PIZZA_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch pizza")?;

        row.as_ref().map(pizza_from_row).transpose()
    }

    async fn insert_pizza(&self, pizza: Pizza) -> Result<Pizza> {
        let sql = format!(
            r#"
            INSERT INTO pizzas (id, pizza_name, created_by, created_at, size, toppings, comments, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PIZZA_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&pizza.id)
            .bind(&pizza.pizza_name)
            .bind(&pizza.created_by)
            .bind(pizza.created_at)
            .bind(pizza.size.as_str())
            .bind(Json(pizza.toppings.clone()))
            .bind(Json(pizza.comment_ids()))
            .bind(pizza.version)
            .fetch_one(&self.pool)
            .await
            .context("Failed to insert pizza")?;

        pizza_from_row(&row)
    }

    async fn update_pizza(&self, id: &Id, changes: PizzaChanges) -> Result<Option<Pizza>> {
        let sql = format!(
            r#"
            UPDATE pizzas SET
                pizza_name = COALESCE($2, pizza_name),
                created_by = COALESCE($3, created_by),
                size = COALESCE($4, size),
                toppings = COALESCE($5, toppings),
                version = version + 1
            WHERE id = $1
            RETURNING {}
            "#,
            PIZZA_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.pizza_name)
            .bind(changes.created_by)
            .bind(changes.size.map(|s| s.as_str()))
            .bind(changes.toppings.map(Json))
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update pizza")?;

        row.as_ref().map(pizza_from_row).transpose()
    }

    async fn delete_pizza(&self, id: &Id) -> Result<Option<Pizza>> {
        let sql = format!("DELETE FROM pizzas WHERE id = $1 RETURNING {}", PIZZA_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to delete pizza")?;

        row.as_ref().map(pizza_from_row).transpose()
    }

    async fn push_comment(&self, pizza_id: &Id, comment_id: &Id) -> Result<Option<Pizza>> {
        let sql = format!(
            r#"
            UPDATE pizzas
            SET comments = comments || jsonb_build_array($2::text), version = version + 1
            WHERE id = $1
            RETURNING {}
            "#,
            PIZZA_COLUMNS
        );
        self.fetch_pizza(&sql, pizza_id, Some(comment_id), "Failed to add comment to pizza")
            .await
    }

    async fn pull_comment(&self, pizza_id: &Id, comment_id: &Id) -> Result<Option<Pizza>> {
        let sql = format!(
            r#"
            UPDATE pizzas
            SET comments = COALESCE(
                    (SELECT jsonb_agg(elem ORDER BY ord)
                     FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(elem, ord)
                     WHERE elem <> to_jsonb($2::text)),
                    '[]'::jsonb),
                version = version + 1
            WHERE id = $1
            RETURNING {}
            "#,
            PIZZA_COLUMNS
        );
        self.fetch_pizza(&sql, pizza_id, Some(comment_id), "Failed to remove comment from pizza")
            .await
    }
}

#[async_trait::async_trait]
impl CommentStore for PostgresStore {
    async fn get_comment(&self, id: &Id) -> Result<Option<Comment>> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        self.fetch_comment(&sql, id, "Failed to fetch comment").await
    }

    async fn find_comments(&self, ids: &[Id]) -> Result<Vec<Comment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM comments WHERE id = ANY($1)", COMMENT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch comments")?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        let replies: Vec<StoredReply> = comment.replies.iter().map(StoredReply::from).collect();
        let sql = format!(
            r#"
            INSERT INTO comments (id, written_by, comment_body, created_at, replies, version)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&comment.id)
            .bind(&comment.written_by)
            .bind(&comment.comment_body)
            .bind(comment.created_at)
            .bind(Json(replies))
            .bind(comment.version)
            .fetch_one(&self.pool)
            .await
            .context("Failed to insert comment")?;

        comment_from_row(&row)
    }

    async fn push_reply(&self, comment_id: &Id, reply: Reply) -> Result<Option<Comment>> {
        let sql = format!(
            r#"
            UPDATE comments
            SET replies = replies || jsonb_build_array($2::jsonb), version = version + 1
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(comment_id)
            .bind(Json(StoredReply::from(&reply)))
            .fetch_optional(&self.pool)
            .await
            .context("Failed to add reply")?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn pull_reply(&self, comment_id: &Id, reply_id: &Id) -> Result<Option<Comment>> {
        let sql = format!(
            r#"
            UPDATE comments
            SET replies = COALESCE(
                    (SELECT jsonb_agg(elem ORDER BY ord)
                     FROM jsonb_array_elements(replies) WITH ORDINALITY AS t(elem, ord)
                     WHERE elem->>'replyId' IS DISTINCT FROM $2),
                    '[]'::jsonb),
                version = version + CASE
                    WHEN EXISTS (SELECT 1 FROM jsonb_array_elements(replies) AS r(elem)
                                 WHERE elem->>'replyId' = $2)
                    THEN 1 ELSE 0 END
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(comment_id)
            .bind(reply_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to remove reply")?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn delete_comment(&self, id: &Id) -> Result<Option<Comment>> {
        let sql = format!("DELETE FROM comments WHERE id = $1 RETURNING {}", COMMENT_COLUMNS);
        self.fetch_comment(&sql, id, "Failed to delete comment").await
    }
}

impl Store for PostgresStore {}
