use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test, App};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middlewares::{AuthProvider, Caller, JwtAuthProvider},
    modules::user::{model::InsertUser, repository::UserRepository},
    state::AppServices,
    store::{MemoryStore, Store},
};

const SECRET: &str = "test-secret";

async fn seed_admin(store: &Arc<dyn Store>) -> Uuid {
    let mut tx = store.begin().await.unwrap();
    let id = Uuid::now_v7();
    tx.insert_user(&InsertUser { id, login: "root".into(), info: String::new(), admin: true })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    id
}

fn services(store: Arc<dyn Store>, dev_login: bool) -> AppServices {
    let auth: Arc<dyn AuthProvider> = Arc::new(JwtAuthProvider::new(SECRET, 900));
    AppServices::new(store, auth, dev_login)
}

fn bearer(id: Uuid, is_admin: bool) -> (&'static str, String) {
    let token = JwtAuthProvider::new(SECRET, 900).issue(&Caller { id, is_admin }).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

async fn json_of<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    test::read_body_json(resp).await
}

fn sign_up(login: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/users").set_json(json!({ "login": login }))
}

async fn created_id<B: MessageBody>(resp: ServiceResponse<B>) -> Uuid {
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_of(resp).await;
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

#[actix_web::test]
async fn test_alice_and_bob_become_friends_then_part() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let admin = seed_admin(&store).await;
    let services = services(store, true);
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let alice = created_id(test::call_service(&app, sign_up("alice").to_request()).await).await;
    let bob = created_id(test::call_service(&app, sign_up("bob").to_request()).await).await;

    let req = test::TestRequest::get().uri("/fake_auth/alice").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token = json_of(resp).await["data"]["token"].as_str().unwrap().to_string();
    let as_alice = ("Authorization", format!("Bearer {token}"));
    let as_bob = bearer(bob, false);

    let req = test::TestRequest::post()
        .uri(&format!("/users/{bob}/friend_request"))
        .insert_header(as_alice.clone())
        .set_json(json!({ "message": "hi bob" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let request = json_of(resp).await;
    assert_eq!(request["data"]["status"], "PENDING");
    let request_id = request["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/users/{alice}/friend_request"))
        .insert_header(as_bob.clone())
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json_of(resp).await["status"], 409);

    // Neither an admin nor the sender may answer on bob's behalf.
    for who in [bearer(admin, true), as_alice.clone()] {
        let req = test::TestRequest::get()
            .uri(&format!("/friend_requests/{request_id}/accept"))
            .insert_header(who)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/users/{bob}"))
        .insert_header(as_bob.clone())
        .to_request();
    let profile = json_of(test::call_service(&app, req).await).await;
    assert_eq!(profile["data"]["incoming_requests"][0]["status"], "PENDING");
    assert_eq!(profile["data"]["incoming_requests"][0]["from"]["login"], "alice");

    let req = test::TestRequest::get()
        .uri(&format!("/friend_requests/{request_id}/accept"))
        .insert_header(as_bob.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["data"]["status"], "ACCEPTED");

    let views = [(alice, as_alice.clone(), "bob"), (bob, as_bob.clone(), "alice")];
    for (id, header, friend) in views {
        let req = test::TestRequest::get()
            .uri(&format!("/users/{id}"))
            .insert_header(header)
            .to_request();
        let profile = json_of(test::call_service(&app, req).await).await;
        assert_eq!(profile["data"]["friends"][0]["login"], friend);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/friend_requests/{request_id}/decline"))
        .insert_header(as_bob.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{bob}/unfriend"))
        .insert_header(as_alice.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["data"]["removed"], 2);

    for (id, header) in [(alice, as_alice.clone()), (bob, as_bob.clone())] {
        let req = test::TestRequest::get()
            .uri(&format!("/users/{id}"))
            .insert_header(header)
            .to_request();
        let profile = json_of(test::call_service(&app, req).await).await;
        assert_eq!(profile["data"]["friends"], json!([]));
    }
}

#[actix_web::test]
async fn test_authentication_and_visibility() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let admin = seed_admin(&store).await;
    let services = services(store, true);
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let alice = created_id(test::call_service(&app, sign_up("alice").to_request()).await).await;
    let bob = created_id(test::call_service(&app, sign_up("bob").to_request()).await).await;

    let req = test::TestRequest::get().uri("/users?page=1&per_page=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["data"].as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::get().uri("/users?per_page=500").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri(&format!("/users/{alice}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(resp).await["status"], 401);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{alice}"))
        .insert_header(("Authorization", "Bearer nope"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri(&format!("/users/{alice}/report"))
        .insert_header(bearer(bob, false))
        .set_json(json!({ "info": "spam" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&format!("/users/{bob}/report"))
        .insert_header(bearer(bob, false))
        .set_json(json!({ "info": "me" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{alice}"))
        .insert_header(bearer(bob, false))
        .to_request();
    let profile = json_of(test::call_service(&app, req).await).await;
    assert_eq!(profile["data"]["login"], "alice");
    assert!(profile["data"].get("friends").is_none());
    assert!(profile["data"].get("reports").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/users/{alice}"))
        .insert_header(bearer(admin, true))
        .to_request();
    let profile = json_of(test::call_service(&app, req).await).await;
    assert_eq!(profile["data"]["reports"][0]["by"]["login"], "bob");

    let req = test::TestRequest::get()
        .uri("/reports")
        .insert_header(bearer(alice, false))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/reports")
        .insert_header(bearer(admin, true))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["data"].as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::put()
        .uri(&format!("/users/{alice}"))
        .insert_header(bearer(alice, false))
        .set_json(json!({ "admin": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(bearer(admin, true))
        .set_json(json!({ "login": "deputy", "admin": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_of(resp).await["data"]["admin"], true);

    let req = test::TestRequest::post().uri("/users").set_json(json!({ "login": "" })).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "login": "Alice" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{alice}"))
        .insert_header(bearer(alice, false))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{alice}"))
        .insert_header(bearer(bob, false))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_fake_auth_is_disabled_in_production() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    seed_admin(&store).await;
    let services = services(store, false);
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/fake_auth/root").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());

    let req = test::TestRequest::get().uri("/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
