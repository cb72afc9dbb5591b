use crate::model::{Comment, Id, Pizza, PizzaChanges, Reply};
use anyhow::Result;

/// Pizza collection. Every method touches exactly one document and is atomic
/// for that document. Pizzas come back with their comments as references.
#[async_trait::async_trait]
pub trait PizzaStore: Send + Sync {
    /// Every pizza, newest first.
    async fn list_pizzas(&self) -> Result<Vec<Pizza>>;
    async fn get_pizza(&self, id: &Id) -> Result<Option<Pizza>>;
    async fn insert_pizza(&self, pizza: Pizza) -> Result<Pizza>;
    /// Apply `changes` and return the updated pizza, or `None` if no pizza matched.
    async fn update_pizza(&self, id: &Id, changes: PizzaChanges) -> Result<Option<Pizza>>;
    /// Remove the pizza and return what was removed.
    async fn delete_pizza(&self, id: &Id) -> Result<Option<Pizza>>;
    /// Append `comment_id` to the pizza's comments.
    async fn push_comment(&self, pizza_id: &Id, comment_id: &Id) -> Result<Option<Pizza>>;
    /// Remove every occurrence of `comment_id` from the pizza's comments.
    async fn pull_comment(&self, pizza_id: &Id, comment_id: &Id) -> Result<Option<Pizza>>;
}

/// Comment collection, with replies embedded in their comment.
#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    async fn get_comment(&self, id: &Id) -> Result<Option<Comment>>;
    /// Comments whose ids appear in `ids`, in no particular order. Unknown ids are skipped.
    async fn find_comments(&self, ids: &[Id]) -> Result<Vec<Comment>>;
    async fn insert_comment(&self, comment: Comment) -> Result<Comment>;
    async fn push_reply(&self, comment_id: &Id, reply: Reply) -> Result<Option<Comment>>;
    /// Remove the reply with `reply_id`. Returns the comment whether or not a reply matched.
    async fn pull_reply(&self, comment_id: &Id, reply_id: &Id) -> Result<Option<Comment>>;
    async fn delete_comment(&self, id: &Id) -> Result<Option<Comment>>;
}

pub trait Store: PizzaStore + CommentStore + Send + Sync {}
