//! End-to-end portfolio flows: ownership scoping, listing order and the
//! profile overview.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use portfolio_backend::test_support::TestBackend;

mod support;

use support::{bearer, read, signed_up};

fn authed(req: test::TestRequest, access: &str) -> test::TestRequest {
    req.insert_header(bearer(access))
}

#[rstest]
#[actix_web::test]
async fn records_are_invisible_to_other_users() {
    let backend = TestBackend::new();
    let app = test::init_service(support::app(backend.state.clone())).await;
    let (ada, _) = signed_up!(app, "ada");
    let (grace, _) = signed_up!(app, "grace");

    let created = read(
        test::call_service(
            &app,
            authed(test::TestRequest::post().uri("/api/portfolio/projects"), &ada)
                .set_json(json!({
                    "title": "Engine notes",
                    "description": "Annotated translation",
                    "githubUrl": "https://github.com/ada/notes",
                    "technologies": ["Rust", {"name": "SQL"}],
                }))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let id = created.body["data"]["id"].as_str().expect("id").to_owned();
    assert_eq!(created.body["data"]["technologies"][1]["name"], "SQL");

    let item = format!("/api/portfolio/projects/{id}");
    let peek = read(
        test::call_service(&app, authed(test::TestRequest::get().uri(&item), &grace).to_request())
            .await,
    )
    .await;
    assert_eq!(peek.status, StatusCode::NOT_FOUND);

    let edit = read(
        test::call_service(
            &app,
            authed(test::TestRequest::patch().uri(&item), &grace)
                .set_json(json!({"title": "Mine now"}))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let remove = read(
        test::call_service(&app, authed(test::TestRequest::delete().uri(&item), &grace).to_request())
            .await,
    )
    .await;
    assert_eq!(remove.status, StatusCode::NOT_FOUND);

    let listing = read(
        test::call_service(
            &app,
            authed(test::TestRequest::get().uri("/api/portfolio/projects"), &grace).to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(listing.body["data"], json!([]));

    let own = read(
        test::call_service(&app, authed(test::TestRequest::get().uri(&item), &ada).to_request())
            .await,
    )
    .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["data"]["title"], "Engine notes");
}

#[rstest]
#[actix_web::test]
async fn skills_are_listed_alphabetically() {
    let backend = TestBackend::new();
    let app = test::init_service(support::app(backend.state.clone())).await;
    let (access, _) = signed_up!(app, "ada");

    for name in ["sql", "Rust", "actix"] {
        let reply = read(
            test::call_service(
                &app,
                authed(test::TestRequest::post().uri("/api/portfolio/skills"), &access)
                    .set_json(json!({"name": name}))
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    let listing = read(
        test::call_service(
            &app,
            authed(test::TestRequest::get().uri("/api/portfolio/skills/"), &access).to_request(),
        )
        .await,
    )
    .await;
    let names: Vec<&str> = listing.body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|skill| skill["name"].as_str())
        .collect();
    assert_eq!(names, ["actix", "Rust", "sql"]);
}

#[rstest]
#[actix_web::test]
async fn experience_lifecycle_with_partial_updates() {
    let backend = TestBackend::new();
    let app = test::init_service(support::app(backend.state.clone())).await;
    let (access, _) = signed_up!(app, "ada");

    let created = read(
        test::call_service(
            &app,
            authed(test::TestRequest::post().uri("/api/portfolio/experiences"), &access)
                .set_json(json!({
                    "company": "Analytical Engines",
                    "position": "Engineer",
                    "description": "Wrote the notes",
                    "startDate": "2020-01-01",
                    "endDate": "2021-06-30",
                    "current": false,
                }))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let item = format!(
        "/api/portfolio/experiences/{}",
        created.body["data"]["id"].as_str().expect("id")
    );

    let patched = read(
        test::call_service(
            &app,
            authed(test::TestRequest::patch().uri(&item), &access)
                .set_json(json!({"position": "Lead engineer"}))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["data"]["position"], "Lead engineer");
    assert_eq!(patched.body["data"]["company"], "Analytical Engines");
    assert_eq!(patched.body["data"]["endDate"], "2021-06-30");

    let backwards = read(
        test::call_service(
            &app,
            authed(test::TestRequest::patch().uri(&item), &access)
                .set_json(json!({"endDate": "2019-01-01"}))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);
    assert!(backwards.body["fields"].is_object());

    let deleted = read(
        test::call_service(&app, authed(test::TestRequest::delete().uri(&item), &access).to_request())
            .await,
    )
    .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = read(
        test::call_service(&app, authed(test::TestRequest::get().uri(&item), &access).to_request())
            .await,
    )
    .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn overview_collects_every_collection() {
    let backend = TestBackend::new();
    let app = test::init_service(support::app(backend.state.clone())).await;
    let (access, _) = signed_up!(app, "ada");

    let payloads: [(&str, Value); 3] = [
        ("/api/portfolio/skills", json!({"name": "Rust"})),
        (
            "/api/portfolio/education",
            json!({
                "institution": "University of London",
                "degree": "BSc",
                "fieldOfStudy": "Mathematics",
                "startDate": "2015-09-01",
                "current": true,
            }),
        ),
        (
            "/api/portfolio/projects",
            json!({"title": "Notes", "description": "Annotations"}),
        ),
    ];
    for (uri, body) in payloads {
        let reply = read(
            test::call_service(
                &app,
                authed(test::TestRequest::post().uri(uri), &access)
                    .set_json(body)
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{uri}: {}", reply.body);
    }

    let mine = read(
        test::call_service(
            &app,
            authed(test::TestRequest::get().uri("/api/portfolio/profiles/me"), &access)
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(mine.status, StatusCode::OK);
    let data = &mine.body["data"];
    assert_eq!(data["user"]["username"], "ada");
    assert_eq!(data["skills"][0]["name"], "Rust");
    assert_eq!(data["education"][0]["fieldOfStudy"], "Mathematics");
    assert_eq!(data["projects"][0]["title"], "Notes");
    assert_eq!(data["experiences"], json!([]));

    let by_id = format!(
        "/api/portfolio/profiles/{}",
        data["id"].as_str().expect("profile id")
    );
    let same = read(
        test::call_service(&app, authed(test::TestRequest::get().uri(&by_id), &access).to_request())
            .await,
    )
    .await;
    assert_eq!(same.status, StatusCode::OK);
    assert_eq!(same.body["data"]["id"], data["id"]);
}

#[rstest]
#[actix_web::test]
async fn foreign_profiles_cannot_be_edited() {
    let backend = TestBackend::new();
    let app = test::init_service(support::app(backend.state.clone())).await;
    let (ada, _) = signed_up!(app, "ada");
    let (grace, _) = signed_up!(app, "grace");

    let ada_profile = read(
        test::call_service(
            &app,
            authed(test::TestRequest::get().uri("/api/portfolio/profiles/me"), &ada).to_request(),
        )
        .await,
    )
    .await;
    let item = format!(
        "/api/portfolio/profiles/{}",
        ada_profile.body["data"]["id"].as_str().expect("profile id")
    );

    let read_attempt = read(
        test::call_service(&app, authed(test::TestRequest::get().uri(&item), &grace).to_request())
            .await,
    )
    .await;
    assert_eq!(read_attempt.status, StatusCode::NOT_FOUND);

    let edit_attempt = read(
        test::call_service(
            &app,
            authed(test::TestRequest::patch().uri(&item), &grace)
                .set_json(json!({"title": "Impostor"}))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(edit_attempt.status, StatusCode::FORBIDDEN);

    let own_edit = read(
        test::call_service(
            &app,
            authed(test::TestRequest::patch().uri(&item), &ada)
                .set_json(json!({"title": "Mathematician", "github": "https://github.com/ada"}))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(own_edit.status, StatusCode::OK);
    assert_eq!(own_edit.body["data"]["title"], "Mathematician");
    assert_eq!(own_edit.body["data"]["github"], "https://github.com/ada");
}

#[rstest]
#[actix_web::test]
async fn invalid_tokens_are_rejected() {
    let backend = TestBackend::new();
    let app = test::init_service(support::app(backend.state.clone())).await;
    let (_, refresh_token) = signed_up!(app, "ada");

    let reply = read(
        test::call_service(
            &app,
            authed(test::TestRequest::get().uri("/api/portfolio/skills"), &refresh_token)
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "unauthorized");
}
