use actix_web::{
    get,
    middleware::from_fn,
    web::{self, ServiceConfig},
};
use std::sync::Arc;

use crate::{
    middlewares::{authentication, AuthProvider},
    modules::{
        self,
        friend::service::FriendService,
        report::service::ReportService,
        user::service::UserService,
    },
    store::Store,
};

#[get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

/// Everything a handler may depend on, built once at startup.
#[derive(Clone)]
pub struct AppServices {
    user: web::Data<UserService>,
    friend: web::Data<FriendService>,
    report: web::Data<ReportService>,
    auth: web::Data<dyn AuthProvider>,
    dev_login: bool,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, auth: Arc<dyn AuthProvider>, dev_login: bool) -> Self {
        let report = ReportService::with_dependencies(store.clone());
        let user = UserService::with_dependencies(store.clone());
        let friend = FriendService::with_dependencies(store);

        AppServices {
            user: web::Data::new(user),
            friend: web::Data::new(friend),
            report: web::Data::new(report),
            auth: web::Data::from(auth),
            dev_login,
        }
    }

    pub fn configure(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(self.user.clone())
            .app_data(self.friend.clone())
            .app_data(self.report.clone())
            .app_data(self.auth.clone())
            .service(health_check)
            .configure(modules::user::route::public_api_configure);

        if self.dev_login {
            cfg.configure(modules::user::route::dev_configure);
        }

        cfg.service(
            web::scope("")
                .wrap(from_fn(authentication))
                .configure(modules::user::route::configure)
                .configure(modules::friend::route::configure)
                .configure(modules::report::route::configure),
        );
    }
}
