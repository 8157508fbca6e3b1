use crate::modules::user::handle::*;
use actix_web::web::{self, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .route(web::get().to(list_users))
            .route(web::post().to(sign_up)),
    );
}

pub fn dev_configure(cfg: &mut ServiceConfig) {
    cfg.service(fake_auth);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_user).service(update_user).service(delete_user);
}
