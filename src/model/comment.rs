use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::common::{format_timestamp, generate_id, generate_sub_id, serialize_timestamp, Id};
use super::validation::{non_empty_trimmed, required_text, ValidationErrors, ViolationCollector};

/// A reply embedded in a comment. Replies have no identity outside their
/// parent comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub reply_id: Id,
    pub reply_body: String,
    pub written_by: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Id,
    pub written_by: Option<String>,
    pub comment_body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<Reply>,
    /// Store-internal revision counter, never sent to clients.
    pub version: i64,
}

impl Comment {
    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentJson<'a> {
    #[serde(rename = "_id")]
    id: &'a Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_by: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_body: Option<&'a String>,
    created_at: String,
    replies: &'a [Reply],
    reply_count: usize,
}

impl Serialize for Comment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CommentJson {
            id: &self.id,
            written_by: self.written_by.as_ref(),
            comment_body: self.comment_body.as_ref(),
            created_at: format_timestamp(&self.created_at),
            replies: &self.replies,
            reply_count: self.reply_count(),
        }
        .serialize(serializer)
    }
}

/// Request body for creating a comment. Comment content is permissive:
/// fields are trimmed when present but none are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub written_by: Option<String>,
    pub comment_body: Option<String>,
}

impl NewComment {
    pub fn validate(self, now: DateTime<Utc>) -> Result<Comment, ValidationErrors> {
        let mut collector = ViolationCollector::new("Comment");
        let written_by = self
            .written_by
            .and_then(|v| collector.check(non_empty_trimmed("writtenBy", &v)));
        let comment_body = self
            .comment_body
            .and_then(|v| collector.check(non_empty_trimmed("commentBody", &v)));

        if !collector.is_empty() {
            return Err(collector.into_errors());
        }

        Ok(Comment {
            id: generate_id(),
            written_by,
            comment_body,
            created_at: now,
            replies: Vec::new(),
            version: 0,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReply {
    pub reply_body: Option<String>,
    pub written_by: Option<String>,
}

impl NewReply {
    /// Validate and assign a fresh `replyId`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Reply, ValidationErrors> {
        let mut collector = ViolationCollector::new("Reply");
        let reply_body = collector.check(required_text("replyBody", self.reply_body));
        let written_by = collector.check(required_text("writtenBy", self.written_by));

        match (reply_body, written_by) {
            (Some(reply_body), Some(written_by)) if collector.is_empty() => Ok(Reply {
                reply_id: generate_sub_id(),
                reply_body,
                written_by,
                created_at: now,
            }),
            _ => Err(collector.into_errors()),
        }
    }
}
