use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::comment::Comment;
use super::common::{format_timestamp, generate_id, present, Field, Id};
use super::validation::{
    one_of, required, required_text, FieldViolation, ValidationErrors, ViolationCollector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PizzaSize {
    Personal,
    Small,
    Medium,
    Large,
    #[serde(rename = "Extra Large")]
    ExtraLarge,
}

impl PizzaSize {
    pub const ALL: [PizzaSize; 5] = [
        PizzaSize::Personal,
        PizzaSize::Small,
        PizzaSize::Medium,
        PizzaSize::Large,
        PizzaSize::ExtraLarge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PizzaSize::Personal => "Personal",
            PizzaSize::Small => "Small",
            PizzaSize::Medium => "Medium",
            PizzaSize::Large => "Large",
            PizzaSize::ExtraLarge => "Extra Large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl Default for PizzaSize {
    fn default() -> Self {
        PizzaSize::Large
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pizza's comments are either bare references or the populated comment
/// documents. Only the expanded form can answer questions about replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommentRefs {
    Reference(Vec<Id>),
    Expanded(Vec<Comment>),
}

impl Default for CommentRefs {
    fn default() -> Self {
        CommentRefs::Reference(Vec::new())
    }
}

impl CommentRefs {
    pub fn ids(&self) -> Vec<Id> {
        match self {
            CommentRefs::Reference(ids) => ids.clone(),
            CommentRefs::Expanded(comments) => comments.iter().map(|c| c.id.clone()).collect(),
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, CommentRefs::Expanded(_))
    }

    /// Comments plus their replies. `None` for unexpanded references.
    pub fn total_with_replies(&self) -> Option<usize> {
        match self {
            CommentRefs::Reference(_) => None,
            CommentRefs::Expanded(comments) => {
                Some(comments.iter().map(|c| 1 + c.reply_count()).sum())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pizza {
    pub id: Id,
    pub pizza_name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub size: PizzaSize,
    pub toppings: Vec<String>,
    pub comments: CommentRefs,
    /// Store-internal revision counter, never sent to clients.
    pub version: i64,
}

impl Pizza {
    /// Total of comments and replies; only available once comments are expanded.
    pub fn comment_count(&self) -> Option<usize> {
        self.comments.total_with_replies()
    }

    pub fn comment_ids(&self) -> Vec<Id> {
        self.comments.ids()
    }

    /// Replace comment references with the matching documents from `lookup`,
    /// keeping reference order. References with no document are dropped.
    pub fn expand(self, lookup: &HashMap<Id, Comment>) -> Pizza {
        let comments = match self.comments {
            CommentRefs::Reference(ids) => CommentRefs::Expanded(
                ids.iter().filter_map(|id| lookup.get(id).cloned()).collect(),
            ),
            expanded => expanded,
        };
        Pizza { comments, ..self }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PizzaJson<'a> {
    #[serde(rename = "_id")]
    id: &'a Id,
    pizza_name: &'a str,
    created_by: &'a str,
    created_at: String,
    size: PizzaSize,
    toppings: &'a [String],
    comments: &'a CommentRefs,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_count: Option<usize>,
}

impl Serialize for Pizza {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PizzaJson {
            id: &self.id,
            pizza_name: &self.pizza_name,
            created_by: &self.created_by,
            created_at: format_timestamp(&self.created_at),
            size: self.size,
            toppings: &self.toppings,
            comments: &self.comments,
            comment_count: self.comment_count(),
        }
        .serialize(serializer)
    }
}

/// Request body for creating a pizza. `size` is kept as raw text so an
/// unknown value is reported as a validation failure. Only an absent `size`
/// takes the default; an explicit `null` is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPizza {
    pub pizza_name: Option<String>,
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub size: Field<String>,
    #[serde(default)]
    pub toppings: Vec<String>,
}

impl NewPizza {
    pub fn validate(self, now: DateTime<Utc>) -> Result<Pizza, ValidationErrors> {
        let mut collector = ViolationCollector::new("Pizza");
        let pizza_name = collector.check(required_text("pizzaName", self.pizza_name));
        let created_by = collector.check(required_text("createdBy", self.created_by));
        let size = match self.size {
            None => Some(PizzaSize::default()),
            Some(raw) => collector.check(size_rule(raw)),
        };

        match (pizza_name, created_by, size) {
            (Some(pizza_name), Some(created_by), Some(size)) if collector.is_empty() => Ok(Pizza {
                id: generate_id(),
                pizza_name,
                created_by,
                created_at: now,
                size,
                toppings: self.toppings,
                comments: CommentRefs::default(),
                version: 0,
            }),
            _ => Err(collector.into_errors()),
        }
    }
}

fn size_rule(raw: Option<String>) -> Result<PizzaSize, FieldViolation> {
    required("size", raw).and_then(|raw| one_of("size", &raw, &PizzaSize::ALL))
}

/// Request body for a partial pizza update. Absent fields are left alone;
/// a required field sent as `null` is a violation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaPatch {
    #[serde(default, deserialize_with = "present")]
    pub pizza_name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub created_by: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub size: Field<String>,
    pub toppings: Option<Vec<String>>,
}

/// A validated patch, ready to hand to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PizzaChanges {
    pub pizza_name: Option<String>,
    pub created_by: Option<String>,
    pub size: Option<PizzaSize>,
    pub toppings: Option<Vec<String>>,
}

impl PizzaChanges {
    pub fn is_empty(&self) -> bool {
        self.pizza_name.is_none()
            && self.created_by.is_none()
            && self.size.is_none()
            && self.toppings.is_none()
    }

    pub fn apply_to(&self, pizza: &mut Pizza) {
        if let Some(name) = &self.pizza_name {
            pizza.pizza_name = name.clone();
        }
        if let Some(created_by) = &self.created_by {
            pizza.created_by = created_by.clone();
        }
        if let Some(size) = self.size {
            pizza.size = size;
        }
        if let Some(toppings) = &self.toppings {
            pizza.toppings = toppings.clone();
        }
    }
}

impl PizzaPatch {
    /// Run the creation rules against every field present in the patch.
    pub fn validate(self) -> Result<PizzaChanges, ValidationErrors> {
        let mut collector = ViolationCollector::new("Pizza");
        let pizza_name = self
            .pizza_name
            .and_then(|v| collector.check(required_text("pizzaName", v)));
        let created_by = self
            .created_by
            .and_then(|v| collector.check(required_text("createdBy", v)));
        let size = self.size.and_then(|raw| collector.check(size_rule(raw)));

        if !collector.is_empty() {
            return Err(collector.into_errors());
        }

        Ok(PizzaChanges {
            pizza_name,
            created_by,
            size,
            toppings: self.toppings,
        })
    }
}
