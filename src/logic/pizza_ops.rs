use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::logic::error::{AccessError, AccessResult, PIZZA_NOT_FOUND};
use crate::model::{Comment, CommentRefs, Id, NewPizza, Pizza, PizzaPatch};
use crate::store::traits::Store;

/// Pizza reads and writes against an explicit store handle.
pub struct PizzaOperations<S> {
    store: Arc<S>,
}

impl<S: Store> PizzaOperations<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every pizza with its comments populated, newest first.
    pub async fn list_all(&self) -> AccessResult<Vec<Pizza>> {
        let pizzas = self.store.list_pizzas().await?;
        let ids: Vec<Id> = pizzas.iter().flat_map(|p| p.comment_ids()).collect();
        let lookup = self.comment_lookup(&ids).await?;

        Ok(pizzas.into_iter().map(|p| p.expand(&lookup)).collect())
    }

    pub async fn get_by_id(&self, id: &Id) -> AccessResult<Pizza> {
        let pizza = self
            .store
            .get_pizza(id)
            .await?
            .ok_or(AccessError::NotFound(PIZZA_NOT_FOUND))?;
        self.populate(pizza).await
    }

    pub async fn create(&self, input: NewPizza) -> AccessResult<Pizza> {
        let pizza = input.validate(Utc::now())?;
        let mut created = self.store.insert_pizza(pizza).await?;
        // A new pizza has no comments, so the expanded form is known without a lookup.
        if created.comment_ids().is_empty() {
            created.comments = CommentRefs::Expanded(Vec::new());
        }
        log::info!("Created pizza {} ({})", created.id, created.pizza_name);
        Ok(created)
    }

    /// Partial update. Returns the pizza with comments as references.
    pub async fn update(&self, id: &Id, patch: PizzaPatch) -> AccessResult<Pizza> {
        let changes = patch.validate()?;
        if changes.is_empty() {
            return self
                .store
                .get_pizza(id)
                .await?
                .ok_or(AccessError::NotFound(PIZZA_NOT_FOUND));
        }
        self.store
            .update_pizza(id, changes)
            .await?
            .ok_or(AccessError::NotFound(PIZZA_NOT_FOUND))
    }

    /// Remove a pizza and return it. Its comments are left in place.
    pub async fn delete(&self, id: &Id) -> AccessResult<Pizza> {
        let removed = self
            .store
            .delete_pizza(id)
            .await?
            .ok_or(AccessError::NotFound(PIZZA_NOT_FOUND))?;
        if !removed.comment_ids().is_empty() {
            log::debug!(
                "Deleted pizza {} leaves {} comment(s) without an owner",
                removed.id,
                removed.comment_ids().len()
            );
        }
        Ok(removed)
    }

    async fn populate(&self, pizza: Pizza) -> AccessResult<Pizza> {
        let lookup = self.comment_lookup(&pizza.comment_ids()).await?;
        Ok(pizza.expand(&lookup))
    }

    async fn comment_lookup(&self, ids: &[Id]) -> AccessResult<HashMap<Id, Comment>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let comments = self.store.find_comments(ids).await?;
        Ok(comments.into_iter().map(|c| (c.id.clone(), c)).collect())
    }
}
