// Integration tests for the HTTP API, run against in-memory stores so no
// external services are required.
// Run with: cargo test --test api_test

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use videotube::{
    api,
    config::Config,
    models::{AuthResponse, ChannelSubscribersResponse, UserResponse, VideoResponse},
    stores::Stores,
};

/// Helper function to create a test app over fresh in-memory stores.
async fn create_test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = Config::from_env().expect("Failed to load configuration");
    let stores = Stores::memory();

    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(stores))
        .configure(api::configure)
}

fn register_body(username: &str) -> Value {
    json!({
        "full_name": format!("{username} full"),
        "email": format!("{username}@example.com"),
        "username": username,
        "password": "password123",
        "avatar": format!("https://cdn.example.com/{username}.png"),
    })
}

#[actix_web::test]
async fn test_healthcheck() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::get().uri("/api/v1/healthcheck").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_register() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: UserResponse = test::read_body_json(resp).await;
    assert_eq!(body.username, "chai");
    assert_eq!(body.email, "chai@example.com");
    assert!(!body.id.is_empty());
}

#[actix_web::test]
async fn test_register_rejects_empty_fields() {
    let app = test::init_service(create_test_app().await).await;

    let mut body = register_body("chai");
    body["full_name"] = json!("   ");
    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_duplicate_is_conflict() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 409);
}

#[actix_web::test]
async fn test_login_and_current_user() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"email": "chai@example.com", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let auth: AuthResponse = test::read_body_json(resp).await;
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());

    let req = test::TestRequest::get()
        .uri("/api/v1/users/current-user")
        .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: UserResponse = test::read_body_json(resp).await;
    assert_eq!(user.username, "chai");
}

#[actix_web::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "chai", "password": "wrong"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_login_unknown_user_is_not_found() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"email": "ghost@example.com", "password": "password123"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_refresh_token_rotation() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "chai", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;

    // First refresh succeeds and rotates the stored token.
    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .set_json(json!({"refresh_token": auth.refresh_token}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Replaying the old refresh token fails.
    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .set_json(json!({"refresh_token": auth.refresh_token}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_change_password() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "chai", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/change-password")
        .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
        .set_json(json!({"old_password": "nope", "new_password": "newpass456"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/users/change-password")
        .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
        .set_json(json!({"old_password": "password123", "new_password": "newpass456"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "chai", "password": "newpass456"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_subscription_toggle_pair() {
    let app = test::init_service(create_test_app().await).await;

    for name in ["viewer", "channel"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body(name))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "viewer", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/c/channel")
        .to_request();
    let profile: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let channel_id = profile["id"].as_str().unwrap().to_string();

    // Subscribe.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/subscriptions/c/{channel_id}"))
        .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["subscribed"], json!(true));

    // Toggle back: edge removed.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/subscriptions/c/{channel_id}"))
        .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["subscribed"], json!(false));

    // Malformed channel id.
    let req = test::TestRequest::post()
        .uri("/api/v1/subscriptions/c/not-an-id")
        .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_channel_profile_counts() {
    let app = test::init_service(create_test_app().await).await;

    for name in ["alice", "bob", "channel"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body(name))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/users/c/channel")
        .to_request();
    let profile: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let channel_id = profile["id"].as_str().unwrap().to_string();

    let mut alice_token = String::new();
    for name in ["alice", "bob"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"username": name, "password": "password123"}))
            .to_request();
        let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
        if name == "alice" {
            alice_token = auth.access_token.clone();
        }
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/subscriptions/c/{channel_id}"))
            .insert_header(("Authorization", format!("Bearer {}", auth.access_token)))
            .to_request();
        test::call_service(&app, req).await;
    }

    // Viewed by a subscriber: both counts derived, is_subscribed true.
    let req = test::TestRequest::get()
        .uri("/api/v1/users/c/channel")
        .insert_header(("Authorization", format!("Bearer {alice_token}")))
        .to_request();
    let profile: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(profile["subscriber_count"], json!(2));
    assert_eq!(profile["channels_subscribed_to_count"], json!(0));
    assert_eq!(profile["is_subscribed"], json!(true));

    // Anonymous viewer: is_subscribed defaults to false.
    let req = test::TestRequest::get()
        .uri("/api/v1/users/c/channel")
        .to_request();
    let profile: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(profile["is_subscribed"], json!(false));

    // Unknown channel.
    let req = test::TestRequest::get()
        .uri("/api/v1/users/c/ghost")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_subscriber_list_mutuality() {
    let app = test::init_service(create_test_app().await).await;

    let mut ids = std::collections::HashMap::new();
    let mut tokens = std::collections::HashMap::new();
    for name in ["k", "a", "b"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body(name))
            .to_request();
        let user: UserResponse = test::read_body_json(test::call_service(&app, req).await).await;
        ids.insert(name, user.id);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"username": name, "password": "password123"}))
            .to_request();
        let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
        tokens.insert(name, auth.access_token);
    }

    // a and b subscribe to k; k subscribes back to a only.
    for (who, target) in [("a", "k"), ("b", "k"), ("k", "a")] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/subscriptions/c/{}", ids[target]))
            .insert_header(("Authorization", format!("Bearer {}", tokens[who])))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/subscriptions/c/{}/subscribers", ids["k"]))
        .to_request();
    let body: ChannelSubscribersResponse =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.subscribers_count_of_channel, 2);

    let row_a = body.subscribers.iter().find(|r| r.username == "a").unwrap();
    assert!(row_a.subscribed_to_subscriber);
    assert_eq!(row_a.subscriber_count, 1); // k follows a

    let row_b = body.subscribers.iter().find(|r| r.username == "b").unwrap();
    assert!(!row_b.subscribed_to_subscriber);
    assert_eq!(row_b.subscriber_count, 0);
}

#[actix_web::test]
async fn test_subscribed_channels_latest_video() {
    let app = test::init_service(create_test_app().await).await;

    let mut ids = std::collections::HashMap::new();
    let mut tokens = std::collections::HashMap::new();
    for name in ["s", "k1", "k2"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body(name))
            .to_request();
        let user: UserResponse = test::read_body_json(test::call_service(&app, req).await).await;
        ids.insert(name, user.id);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"username": name, "password": "password123"}))
            .to_request();
        let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
        tokens.insert(name, auth.access_token);
    }

    // k1 uploads two videos.
    let mut newer_id = String::new();
    for title in ["older", "newer"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/videos")
            .insert_header(("Authorization", format!("Bearer {}", tokens["k1"])))
            .set_json(json!({
                "title": title,
                "description": format!("{title} description"),
                "video_file": format!("https://cdn.example.com/{title}.mp4"),
                "thumbnail": format!("https://cdn.example.com/{title}.jpg"),
                "duration": 12.5,
            }))
            .to_request();
        let video: VideoResponse = test::read_body_json(test::call_service(&app, req).await).await;
        newer_id = video.id;
    }

    for target in ["k1", "k2"] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/subscriptions/c/{}", ids[target]))
            .insert_header(("Authorization", format!("Bearer {}", tokens["s"])))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/subscriptions/u/{}/channels", ids["s"]))
        .to_request();
    let rows: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let row_k1 = rows.iter().find(|r| r["username"] == "k1").unwrap();
    assert_eq!(row_k1["latest_video"]["id"].as_str().unwrap(), newer_id);
    assert_eq!(row_k1["latest_video"]["title"], json!("newer"));

    let row_k2 = rows.iter().find(|r| r["username"] == "k2").unwrap();
    assert!(row_k2.get("latest_video").is_none());
}

#[actix_web::test]
async fn test_video_publish_flow() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("creator"))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "creator", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let token = auth.access_token;

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": "my clip",
            "description": "first upload",
            "video_file": "https://cdn.example.com/clip.mp4",
            "thumbnail": "https://cdn.example.com/clip.jpg",
            "duration": 30.0,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let video: VideoResponse = test::read_body_json(resp).await;
    assert!(!video.is_published);

    // Unpublished videos are hidden from the listing...
    let req = test::TestRequest::get().uri("/api/v1/videos").to_request();
    let listed: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    // ...but still resolvable by id.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/videos/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/videos/toggle/publish/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["is_published"], json!(true));

    let req = test::TestRequest::get().uri("/api/v1/videos").to_request();
    let listed: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], json!("my clip"));
    assert_eq!(listed[0]["owner"]["username"], json!("creator"));
}

#[actix_web::test]
async fn test_video_detail_views_and_history() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("creator"))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "creator", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let token = auth.access_token;

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": "my clip",
            "description": "first upload",
            "video_file": "https://cdn.example.com/clip.mp4",
            "thumbnail": "https://cdn.example.com/clip.jpg",
            "duration": 30.0,
        }))
        .to_request();
    let video: VideoResponse = test::read_body_json(test::call_service(&app, req).await).await;

    // Every fetch counts a view; the returned value is the pre-increment read.
    for expected_views in 0..3 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/videos/{}", video.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let detail: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(detail["views"], json!(expected_views));
        assert_eq!(detail["likes_count"], json!(0));
    }

    // Watch history stays duplicate-free.
    let req = test::TestRequest::get()
        .uri("/api/v1/users/history")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let history: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"].as_str().unwrap(), video.id);
}

#[actix_web::test]
async fn test_video_mutations_are_owner_gated() {
    let app = test::init_service(create_test_app().await).await;

    let mut tokens = Vec::new();
    for name in ["creator", "intruder"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body(name))
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"username": name, "password": "password123"}))
            .to_request();
        let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
        tokens.push(auth.access_token);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .insert_header(("Authorization", format!("Bearer {}", tokens[0])))
        .set_json(json!({
            "title": "my clip",
            "description": "first upload",
            "video_file": "https://cdn.example.com/clip.mp4",
            "thumbnail": "https://cdn.example.com/clip.jpg",
            "duration": 30.0,
        }))
        .to_request();
    let video: VideoResponse = test::read_body_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/videos/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {}", tokens[1])))
        .set_json(json!({"title": "stolen", "description": "nope"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/videos/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {}", tokens[1])))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/videos/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {}", tokens[0])))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_like_toggle_and_liked_videos() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("creator"))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "creator", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let token = auth.access_token;

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": "my clip",
            "description": "first upload",
            "video_file": "https://cdn.example.com/clip.mp4",
            "thumbnail": "https://cdn.example.com/clip.jpg",
            "duration": 30.0,
        }))
        .to_request();
    let video: VideoResponse = test::read_body_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/likes/toggle/v/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["liked"], json!(true));

    let req = test::TestRequest::get()
        .uri("/api/v1/likes/videos")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let liked: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(liked.as_array().unwrap().len(), 1);

    // Toggle back.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/likes/toggle/v/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["liked"], json!(false));

    let req = test::TestRequest::get()
        .uri("/api/v1/likes/videos")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let liked: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(liked.as_array().unwrap().len(), 0);

    // Liking a missing video is a 404.
    let req = test::TestRequest::post()
        .uri("/api/v1/likes/toggle/v/65a000000000000000000000")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_comment_crud() {
    let app = test::init_service(create_test_app().await).await;

    let mut tokens = Vec::new();
    for name in ["creator", "other"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body(name))
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"username": name, "password": "password123"}))
            .to_request();
        let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
        tokens.push(auth.access_token);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .insert_header(("Authorization", format!("Bearer {}", tokens[0])))
        .set_json(json!({
            "title": "my clip",
            "description": "first upload",
            "video_file": "https://cdn.example.com/clip.mp4",
            "thumbnail": "https://cdn.example.com/clip.jpg",
            "duration": 30.0,
        }))
        .to_request();
    let video: VideoResponse = test::read_body_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/comments/{}", video.id))
        .insert_header(("Authorization", format!("Bearer {}", tokens[0])))
        .set_json(json!({"content": "first!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(resp).await;
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comments/{}", video.id))
        .to_request();
    let comments: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);

    // Someone else cannot edit it.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/comments/c/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {}", tokens[1])))
        .set_json(json!({"content": "hijacked"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/comments/c/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {}", tokens[0])))
        .set_json(json!({"content": "edited"}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["content"], json!("edited"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/comments/c/{comment_id}"))
        .insert_header(("Authorization", format!("Bearer {}", tokens[0])))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comments/{}", video.id))
        .to_request();
    let comments: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(comments.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_tweet_crud() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("chai"))
        .to_request();
    let user: UserResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": "chai", "password": "password123"}))
        .to_request();
    let auth: AuthResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let token = auth.access_token;

    let req = test::TestRequest::post()
        .uri("/api/v1/tweets")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({"content": "hello world"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let tweet: Value = test::read_body_json(resp).await;
    let tweet_id = tweet["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tweets/user/{}", user.id))
        .to_request();
    let tweets: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(tweets.as_array().unwrap().len(), 1);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/tweets/{tweet_id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({"content": "edited"}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["content"], json!("edited"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tweets/{tweet_id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tweets/user/{}", user.id))
        .to_request();
    let tweets: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(tweets.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/current-user")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/tweets")
        .set_json(json!({"content": "anonymous"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
