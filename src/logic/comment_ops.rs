//! Comment and reply operations.
//!
//! Linking a comment to its pizza takes two store calls with nothing tying
//! them together. When the second call finds no pizza, the first call's
//! effect stays: `add_comment` leaves the new comment behind without an
//! owner, and `remove_comment` has already deleted the comment. Both cases
//! are reported as not-found and logged, with no rollback.

use chrono::Utc;
use std::sync::Arc;

use crate::logic::error::{AccessError, AccessResult, COMMENT_NOT_FOUND, PIZZA_NOT_FOUND};
use crate::model::{Comment, Id, NewComment, NewReply, Pizza};
use crate::store::traits::Store;

pub struct CommentOperations<S> {
    store: Arc<S>,
}

impl<S: Store> CommentOperations<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get(&self, comment_id: &Id) -> AccessResult<Comment> {
        self.store
            .get_comment(comment_id)
            .await?
            .ok_or(AccessError::NotFound(COMMENT_NOT_FOUND))
    }

    /// Create a comment and link it to `pizza_id`. Returns the updated pizza.
    pub async fn add_comment(&self, pizza_id: &Id, input: NewComment) -> AccessResult<Pizza> {
        let comment = input.validate(Utc::now())?;
        let comment = self.store.insert_comment(comment).await?;

        match self.store.push_comment(pizza_id, &comment.id).await? {
            Some(pizza) => Ok(pizza),
            None => {
                log::warn!(
                    "Comment {} created but pizza {} does not exist; comment is orphaned",
                    comment.id,
                    pizza_id
                );
                Err(AccessError::NotFound(PIZZA_NOT_FOUND))
            }
        }
    }

    pub async fn add_reply(&self, comment_id: &Id, input: NewReply) -> AccessResult<Comment> {
        let reply = input.validate(Utc::now())?;
        self.store
            .push_reply(comment_id, reply)
            .await?
            .ok_or(AccessError::NotFound(COMMENT_NOT_FOUND))
    }

    /// Pull one reply. A reply id that matches nothing leaves the comment as is.
    pub async fn remove_reply(&self, comment_id: &Id, reply_id: &Id) -> AccessResult<Comment> {
        self.store
            .pull_reply(comment_id, reply_id)
            .await?
            .ok_or(AccessError::NotFound(COMMENT_NOT_FOUND))
    }

    /// Delete a comment, then unlink it from `pizza_id`. Returns the updated pizza.
    pub async fn remove_comment(&self, pizza_id: &Id, comment_id: &Id) -> AccessResult<Pizza> {
        let deleted = self
            .store
            .delete_comment(comment_id)
            .await?
            .ok_or(AccessError::NotFound(COMMENT_NOT_FOUND))?;

        match self.store.pull_comment(pizza_id, &deleted.id).await? {
            Some(pizza) => Ok(pizza),
            None => {
                log::warn!(
                    "Comment {} deleted but pizza {} does not exist",
                    deleted.id,
                    pizza_id
                );
                Err(AccessError::NotFound(PIZZA_NOT_FOUND))
            }
        }
    }
}
