use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_caller,
    modules::friend::{
        model::{FriendRequestBody, UnfriendResponse},
        schema::FriendRequestEntity,
        service::FriendService,
    },
    utils::ValidatedJson,
};

#[post("/users/{id}/friend_request")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    to_id: web::Path<Uuid>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let caller = get_caller(&req)?;
    let request =
        friend_service.send_friend_request(caller.id, to_id.into_inner(), body.0.message).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[get("/users/{id}/unfriend")]
pub async fn unfriend(
    friend_service: web::Data<FriendService>,
    friend_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<UnfriendResponse>, error::Error> {
    let caller = get_caller(&req)?;
    let removed = friend_service.unfriend(&caller, caller.id, friend_id.into_inner()).await?;

    Ok(success::Success::ok(Some(UnfriendResponse { removed }))
        .message("Friend removed successfully"))
}

#[get("/friend_requests/{id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let caller = get_caller(&req)?;
    let request = friend_service.accept_friend_request(&caller, request_id.into_inner()).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request accepted successfully"))
}

#[get("/friend_requests/{id}/decline")]
pub async fn decline_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let caller = get_caller(&req)?;
    let request = friend_service.decline_friend_request(&caller, request_id.into_inner()).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request declined successfully"))
}
