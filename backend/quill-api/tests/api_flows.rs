//! End-to-end API flows over a live PostgreSQL database.
//!
//! These tests run the real route tree with the real cookie middleware and
//! are destructive: they wipe every table before each flow. Gated behind
//! `--ignored`; point DATABASE_URL at a disposable database first.

mod common;

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use quill_api::handlers;
use quill_api::middleware::CookieAuthMiddleware;
use serde_json::{json, Value};
use serial_test::serial;
use sqlx::PgPool;

use common::fixtures;

/// Same scope tree as `main.rs`, minus the health route.
fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(handlers::signup))
                    .route("/signin", web::post().to(handlers::signin))
                    .route("/google", web::post().to(handlers::google_auth)),
            )
            .service(
                web::scope("/user")
                    .route("/update/{userId}", web::put().to(handlers::update_user))
                    .route("/getusers", web::get().to(handlers::get_users))
                    .route("/getuser/{userId}", web::get().to(handlers::get_user))
                    .route("/signout", web::post().to(handlers::signout))
                    .route("/delete/{userId}", web::delete().to(handlers::delete_user)),
            )
            .service(
                web::scope("/post")
                    .route("/create", web::post().to(handlers::create_post))
                    .route("/getposts", web::get().to(handlers::get_posts))
                    .route("/getpost/{postId}", web::get().to(handlers::get_post))
                    .route("/search", web::get().to(handlers::search_posts))
                    .route(
                        "/updatepost/{postId}/{userId}",
                        web::put().to(handlers::update_post),
                    )
                    .route(
                        "/deletepost/{postId}/{userId}",
                        web::delete().to(handlers::delete_post),
                    ),
            )
            .service(
                web::scope("/comment")
                    .route("/create", web::post().to(handlers::create_comment))
                    .route(
                        "/getpostcomments/{postId}",
                        web::get().to(handlers::get_post_comments),
                    )
                    .route("/getcomments", web::get().to(handlers::get_comments))
                    .route(
                        "/likecomment/{commentId}",
                        web::put().to(handlers::like_comment),
                    )
                    .route(
                        "/editcomment/{commentId}",
                        web::put().to(handlers::edit_comment),
                    )
                    .route(
                        "/deletecomment/{commentId}",
                        web::delete().to(handlers::delete_comment),
                    ),
            ),
    );
}

async fn spawn_app(
    pool: PgPool,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    fixtures::init_test_keys();

    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(fixtures::test_config()))
            .wrap(CookieAuthMiddleware)
            .configure(routes),
    )
    .await
}

async fn fresh_pool() -> PgPool {
    let pool = fixtures::create_test_pool().await;
    fixtures::cleanup_test_data(&pool).await;
    pool
}

/// Pull the `access_token` cookie out of a signin/google response.
fn session_cookie(resp: &ServiceResponse) -> Cookie<'static> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .filter_map(|v| v.to_str().ok())
        .filter_map(|s| Cookie::parse_encoded(s.to_owned()).ok())
        .find(|c| c.name() == "access_token")
        .expect("response sets the session cookie")
}

async fn send<S>(app: &S, req: Request) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(app, req).await
}

async fn body_json(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

/// Register and sign in, returning the user payload and session cookie.
async fn signed_in_user<S>(
    app: &S,
    username: &str,
    email: &str,
    password: &str,
) -> (Value, Cookie<'static>)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({"username": username, "email": email, "password": password}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK, "signup should succeed");

    let resp = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({"email": email, "password": password}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK, "signin should succeed");

    let cookie = session_cookie(&resp);
    let body = body_json(resp).await;
    (body["data"].clone(), cookie)
}

async fn create_post<S>(app: &S, cookie: &Cookie<'static>, title: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = send(
        app,
        test::TestRequest::post()
            .uri("/api/post/create")
            .cookie(cookie.clone())
            .set_json(json!({"title": title, "content": "some content", "category": "rust"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED, "post creation should succeed");
    body_json(resp).await["data"].clone()
}

async fn create_comment<S>(app: &S, cookie: &Cookie<'static>, post_id: i64) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = send(
        app,
        test::TestRequest::post()
            .uri("/api/comment/create")
            .cookie(cookie.clone())
            .set_json(json!({"content": "nice post", "postId": post_id}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK, "comment creation should succeed");
    body_json(resp).await["data"].clone()
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn signup_then_signin_resolves_the_created_user() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let (user, cookie) = signed_in_user(&app, "alice123", "a@x.com", "secret1").await;

    let user_id = user["id"].as_i64().expect("signin returns the user id");
    assert_eq!(user["username"], "alice123");
    assert_eq!(user["isAdmin"], false);
    assert!(
        user.get("passwordHash").is_none() && user.get("password_hash").is_none(),
        "the password hash must never serialize"
    );

    // The cookie must resolve back to this user: a strict-owner endpoint
    // accepts the call only when the resolved principal matches the path.
    let resp = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/user/update/{}", user_id))
            .cookie(cookie)
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["id"].as_i64(), Some(user_id));
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn signin_with_wrong_password_is_invalid_credentials() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let _ = signed_in_user(&app, "alice123", "a@x.com", "secret1").await;

    let resp = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({"email": "a@x.com", "password": "wrong"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");

    // Unknown email gets the same answer, so the endpoint does not reveal
    // which accounts exist.
    let resp = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({"email": "nobody@x.com", "password": "secret1"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Invalid credentials");
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn duplicate_email_signup_conflicts_regardless_of_username() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let _ = signed_in_user(&app, "alice123", "a@x.com", "secret1").await;

    let resp = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({"username": "entirelydifferent", "email": "a@x.com", "password": "other"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Email already exists");
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn anonymous_may_read_posts_but_not_delete_them() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let (author, cookie) = signed_in_user(&app, "author99", "author@x.com", "secret1").await;
    let author_id = author["id"].as_i64().unwrap();
    let post = create_post(&app, &cookie, "A Public Post").await;
    let post_id = post["id"].as_i64().unwrap();

    // Listing and single fetch carry no cookie at all.
    let resp = send(&app, test::TestRequest::get().uri("/api/post/getposts").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["totalPosts"].as_i64(), Some(1));

    let resp = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/post/getpost/{}", post_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/post/getposts?slug={}", post["slug"].as_str().unwrap()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Deletion without a cookie never reaches the policy check.
    let resp = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/post/deletepost/{}/{}", post_id, author_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn like_toggle_twice_restores_count_and_like_set() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let (_, cookie) = signed_in_user(&app, "toggler1", "t@x.com", "secret1").await;
    let post = create_post(&app, &cookie, "Like Me").await;
    let comment = create_comment(&app, &cookie, post["id"].as_i64().unwrap()).await;
    let comment_id = comment["id"].as_i64().unwrap();
    assert_eq!(comment["likeCount"].as_i64(), Some(0));

    let like_rows = |pool: &PgPool| {
        let pool = pool.clone();
        async move {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1",
            )
            .bind(comment_id)
            .fetch_one(&pool)
            .await
            .expect("count like rows")
        }
    };

    // First toggle: NotLiked -> Liked.
    let resp = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/comment/likecomment/{}", comment_id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["likeCount"].as_i64(), Some(1));
    assert_eq!(like_rows(&pool).await, 1);

    // Second toggle: Liked -> NotLiked, back to the original state.
    let resp = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/comment/likecomment/{}", comment_id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["likeCount"].as_i64(), Some(0));
    assert_eq!(like_rows(&pool).await, 0);
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn admin_may_moderate_comments_but_not_foreign_posts() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let (author, author_cookie) = signed_in_user(&app, "author99", "author@x.com", "secret1").await;
    let author_id = author["id"].as_i64().unwrap();
    let post = create_post(&app, &author_cookie, "Owned Post").await;
    let post_id = post["id"].as_i64().unwrap();
    let comment = create_comment(&app, &author_cookie, post_id).await;
    let comment_id = comment["id"].as_i64().unwrap();

    let (admin, admin_cookie) = signed_in_user(&app, "adminuser", "admin@x.com", "secret1").await;
    sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
        .bind(admin["id"].as_i64().unwrap())
        .execute(&pool)
        .await
        .expect("promote the second user to admin");

    // Posts are strict-owner: the admin is denied on both path shapes.
    let resp = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/post/updatepost/{}/{}", post_id, author_id))
            .cookie(admin_cookie.clone())
            .set_json(json!({"title": "Hijacked"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/post/deletepost/{}/{}", post_id, author_id))
            .cookie(admin_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Comments are owner-or-admin: the same admin deletes a stranger's
    // comment just fine.
    let resp = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/comment/deletecomment/{}", comment_id))
            .cookie(admin_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Roster access follows the admin flag as it stands in storage, not as
    // it was at token issuance.
    let resp = send(
        &app,
        test::TestRequest::get()
            .uri("/api/user/getusers")
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["totalUsers"].as_i64(), Some(2));

    let resp = send(
        &app,
        test::TestRequest::get()
            .uri("/api/user/getusers")
            .cookie(author_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn google_auth_provisions_once_and_reuses_the_account() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    // Occupy the bare derived username so provisioning must disambiguate.
    let _ = signed_in_user(&app, "testuser", "taken@x.com", "secret1").await;

    let resp = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/google")
            .set_json(json!({
                "email": "g@x.com",
                "name": "Test User",
                "googlePhotoUrl": "https://example.com/p.png"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let _ = session_cookie(&resp);

    let body = body_json(resp).await;
    let user = &body["data"];
    let first_id = user["id"].as_i64().unwrap();
    let username = user["username"].as_str().unwrap();

    // testuser + zero-padded 4-digit suffix, since "testuser" is taken.
    assert!(username.starts_with("testuser"));
    assert_eq!(username.len(), "testuser".len() + 4);
    assert!(username["testuser".len()..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(user["profilePicture"], "https://example.com/p.png");

    // The same external identity signs back into the same account.
    let resp = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/google")
            .set_json(json!({"email": "g@x.com", "name": "Test User"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["id"].as_i64(), Some(first_id));

    let accounts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .expect("count accounts");
    assert_eq!(accounts, 2, "the second google call must not provision again");
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn signout_clears_the_cookie_but_the_token_stays_valid() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let (user, cookie) = signed_in_user(&app, "leaver12", "l@x.com", "secret1").await;
    let user_id = user["id"].as_i64().unwrap();

    let resp = send(
        &app,
        test::TestRequest::post()
            .uri("/api/user/signout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cleared = session_cookie(&resp);
    assert_eq!(cleared.value(), "");
    assert_eq!(
        cleared.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );

    // Accepted limitation: without a revocation list, a kept copy of the
    // token still authenticates until it expires.
    let resp = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/user/update/{}", user_id))
            .cookie(cookie)
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
#[ignore = "requires PostgreSQL"]
async fn deleted_account_stops_resolving_immediately() {
    let pool = fresh_pool().await;
    let app = spawn_app(pool.clone()).await;

    let (user, cookie) = signed_in_user(&app, "shortlived", "s@x.com", "secret1").await;
    let user_id = user["id"].as_i64().unwrap();

    let resp = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/user/delete/{}", user_id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The token still verifies cryptographically, but the live re-fetch
    // finds no subject, so the request is anonymous and gets a 401.
    let resp = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/user/update/{}", user_id))
            .cookie(cookie)
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
