use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::api::handlers::{error_response, ApiResult, AppState, JsonBody};
use crate::logic::CommentOperations;
use crate::model::{Comment, Id, NewComment, NewReply, Pizza};
use crate::store::traits::Store;

pub async fn get_comment<S: Store>(
    State(store): State<AppState<S>>,
    Path(comment_id): Path<Id>,
) -> ApiResult<Comment> {
    CommentOperations::new(store)
        .get(&comment_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn add_comment<S: Store>(
    State(store): State<AppState<S>>,
    Path(pizza_id): Path<Id>,
    JsonBody(input): JsonBody<NewComment>,
) -> ApiResult<Pizza> {
    CommentOperations::new(store)
        .add_comment(&pizza_id, input)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn remove_comment<S: Store>(
    State(store): State<AppState<S>>,
    Path((pizza_id, comment_id)): Path<(Id, Id)>,
) -> ApiResult<Pizza> {
    CommentOperations::new(store)
        .remove_comment(&pizza_id, &comment_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn add_reply<S: Store>(
    State(store): State<AppState<S>>,
    Path(comment_id): Path<Id>,
    JsonBody(input): JsonBody<NewReply>,
) -> ApiResult<Comment> {
    CommentOperations::new(store)
        .add_reply(&comment_id, input)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn remove_reply<S: Store>(
    State(store): State<AppState<S>>,
    Path((comment_id, reply_id)): Path<(Id, Id)>,
) -> ApiResult<Comment> {
    CommentOperations::new(store)
        .remove_reply(&comment_id, &reply_id)
        .await
        .map(Json)
        .map_err(error_response)
}
