use crate::modules::friend::handle::*;
use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_friend_request)
        .service(unfriend)
        .service(accept_friend_request)
        .service(decline_friend_request);
}
