use actix_web::{delete, get, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::{get_caller, optional_caller, AuthProvider, Caller},
    modules::user::{model, service::UserService},
    utils::{Pagination, ValidatedJson, ValidatedQuery},
};

pub async fn list_users(
    user_service: web::Data<UserService>,
    page: ValidatedQuery<Pagination>,
) -> Result<success::Success<Vec<model::UserResponse>>, error::Error> {
    let users = user_service.list(&page.0).await?;
    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}

pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let caller = optional_caller(&req)?;
    let user = user_service.sign_up(caller.as_ref(), user_data.0).await?;
    Ok(success::Success::created(Some(user.into())).message("Signup successful"))
}

#[get("/users/{id}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let caller = get_caller(&req)?;
    let user = user_service.show(&caller, user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}

#[put("/users/{id}")]
pub async fn update_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
    user_data: ValidatedJson<model::UpdateUserModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let caller = get_caller(&req)?;
    let user = user_service.update(&caller, user_id.into_inner(), user_data.0).await?;
    Ok(success::Success::ok(Some(user.into())).message("User updated successfully"))
}

#[delete("/users/{id}")]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let caller = get_caller(&req)?;
    user_service.delete(&caller, user_id.into_inner()).await?;
    Ok(success::Success::ok(None).message("User deleted successfully"))
}

/// Token for an existing login. Only mounted outside production.
#[get("/fake_auth/{login}")]
pub async fn fake_auth(
    user_service: web::Data<UserService>,
    auth: web::Data<dyn AuthProvider>,
    login: web::Path<String>,
) -> Result<success::Success<model::TokenResponse>, error::Error> {
    let user = user_service.get_by_login(&login).await?;
    let token = auth.issue(&Caller { id: user.id, is_admin: user.admin })?;
    Ok(success::Success::ok(Some(model::TokenResponse { token })).message("Token issued"))
}
