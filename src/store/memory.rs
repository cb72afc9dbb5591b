use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::model::{Comment, CommentRefs, Id, Pizza, PizzaChanges, Reply};
use crate::store::traits::{CommentStore, PizzaStore, Store};

#[derive(Debug, Default)]
struct Collections {
    /// Keyed by time-ordered id, so iteration order is creation order.
    pizzas: BTreeMap<Id, Pizza>,
    comments: HashMap<Id, Comment>,
}

/// In-process store. Each operation holds the lock for its whole
/// read-modify-write, which gives the same per-document atomicity as the
/// database-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pizza_count(&self) -> usize {
        self.inner.read().pizzas.len()
    }

    pub fn comment_count(&self) -> usize {
        self.inner.read().comments.len()
    }
}

fn as_reference(mut pizza: Pizza) -> Pizza {
    if pizza.comments.is_expanded() {
        pizza.comments = CommentRefs::Reference(pizza.comment_ids());
    }
    pizza
}

fn modify_pizza<F>(pizzas: &mut BTreeMap<Id, Pizza>, id: &Id, f: F) -> Option<Pizza>
where
    F: FnOnce(&mut Vec<Id>, &mut Pizza),
{
    let pizza = pizzas.get_mut(id)?;
    let mut ids = pizza.comment_ids();
    f(&mut ids, pizza);
    pizza.comments = CommentRefs::Reference(ids);
    pizza.version += 1;
    Some(pizza.clone())
}

#[async_trait::async_trait]
impl PizzaStore for MemoryStore {
    async fn list_pizzas(&self) -> Result<Vec<Pizza>> {
        let inner = self.inner.read();
        Ok(inner.pizzas.values().rev().cloned().collect())
    }

    async fn get_pizza(&self, id: &Id) -> Result<Option<Pizza>> {
        Ok(self.inner.read().pizzas.get(id).cloned())
    }

    async fn insert_pizza(&self, pizza: Pizza) -> Result<Pizza> {
        let pizza = as_reference(pizza);
        let mut inner = self.inner.write();
        if inner.pizzas.contains_key(&pizza.id) {
            anyhow::bail!("Duplicate pizza id {}", pizza.id);
        }
        inner.pizzas.insert(pizza.id.clone(), pizza.clone());
        Ok(pizza)
    }

    async fn update_pizza(&self, id: &Id, changes: PizzaChanges) -> Result<Option<Pizza>> {
        let mut inner = self.inner.write();
        Ok(modify_pizza(&mut inner.pizzas, id, |_, pizza| {
            changes.apply_to(pizza)
        }))
    }

    async fn delete_pizza(&self, id: &Id) -> Result<Option<Pizza>> {
        Ok(self.inner.write().pizzas.remove(id))
    }

    async fn push_comment(&self, pizza_id: &Id, comment_id: &Id) -> Result<Option<Pizza>> {
        let mut inner = self.inner.write();
        Ok(modify_pizza(&mut inner.pizzas, pizza_id, |ids, _| {
            ids.push(comment_id.clone())
        }))
    }

    async fn pull_comment(&self, pizza_id: &Id, comment_id: &Id) -> Result<Option<Pizza>> {
        let mut inner = self.inner.write();
        Ok(modify_pizza(&mut inner.pizzas, pizza_id, |ids, _| {
            ids.retain(|id| id != comment_id)
        }))
    }
}

#[async_trait::async_trait]
impl CommentStore for MemoryStore {
    async fn get_comment(&self, id: &Id) -> Result<Option<Comment>> {
        Ok(self.inner.read().comments.get(id).cloned())
    }

    async fn find_comments(&self, ids: &[Id]) -> Result<Vec<Comment>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.comments.get(id).cloned())
            .collect())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        let mut inner = self.inner.write();
        if inner.comments.contains_key(&comment.id) {
            anyhow::bail!("Duplicate comment id {}", comment.id);
        }
        inner.comments.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn push_reply(&self, comment_id: &Id, reply: Reply) -> Result<Option<Comment>> {
        let mut inner = self.inner.write();
        let Some(comment) = inner.comments.get_mut(comment_id) else {
            return Ok(None);
        };
        comment.replies.push(reply);
        comment.version += 1;
        Ok(Some(comment.clone()))
    }

    async fn pull_reply(&self, comment_id: &Id, reply_id: &Id) -> Result<Option<Comment>> {
        let mut inner = self.inner.write();
        let Some(comment) = inner.comments.get_mut(comment_id) else {
            return Ok(None);
        };
        let before = comment.replies.len();
        comment.replies.retain(|r| &r.reply_id != reply_id);
        if comment.replies.len() != before {
            comment.version += 1;
        }
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: &Id) -> Result<Option<Comment>> {
        Ok(self.inner.write().comments.remove(id))
    }
}

impl Store for MemoryStore {}
