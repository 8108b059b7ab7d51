//! Handler tests for the portfolio collections and profile endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::NaiveDate;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::{Error, Period, ProfileId, RecordId, Technology};
use crate::inbound::http::test_utils::{
    MockPorts, bearer, fixed_time, sample_overview, test_app, test_user_id,
};

const RECORD_ID: &str = "22222222-2222-4222-8222-222222222222";

fn record_id() -> RecordId {
    RecordId::from(Uuid::parse_str(RECORD_ID).expect("fixture id"))
}

fn skill(name: &str) -> Skill {
    Skill {
        id: record_id(),
        profile_id: ProfileId::from(Uuid::nil()),
        name: name.to_owned(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

fn project() -> Project {
    Project {
        id: record_id(),
        profile_id: ProfileId::from(Uuid::nil()),
        title: "Portfolio".to_owned(),
        description: "This site".to_owned(),
        image: None,
        live_url: Some("https://ada.example.com".to_owned()),
        source_url: None,
        technologies: vec![Technology {
            id: RecordId::random(),
            name: "Rust".to_owned(),
        }],
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

fn experience() -> Experience {
    Experience {
        id: record_id(),
        profile_id: ProfileId::from(Uuid::nil()),
        company: "Analytical Engines".to_owned(),
        position: "Engineer".to_owned(),
        description: "Notes".to_owned(),
        period: Period {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
            end_date: None,
            current: true,
        },
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

async fn send(ports: MockPorts, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(test_app(ports.into_state())).await;
    let res = test::call_service(&app, req.insert_header(bearer()).to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[actix_web::test]
async fn collections_require_authentication() {
    let app = test::init_service(test_app(MockPorts::default().into_state())).await;
    let req = test::TestRequest::get()
        .uri("/api/portfolio/skills")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn skills_are_listed_for_the_caller() {
    let mut ports = MockPorts::default();
    ports
        .skills
        .expect_list()
        .withf(|owner| *owner == test_user_id())
        .times(1)
        .returning(|_| Ok(vec![skill("Rust"), skill("SQL")]));

    let (status, body) = send(ports, test::TestRequest::get().uri("/api/portfolio/skills")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Records retrieved successfully");
    assert_eq!(body["data"][0]["name"], "Rust");
    assert_eq!(body["data"][1]["name"], "SQL");
    assert_eq!(body["data"][0]["id"], RECORD_ID);
}

#[actix_web::test]
async fn skill_creation_returns_created() {
    let mut ports = MockPorts::default();
    ports
        .skills
        .expect_create()
        .withf(|_, input| input.name.as_deref() == Some("Rust"))
        .times(1)
        .returning(|_, _| Ok(skill("Rust")));

    let req = test::TestRequest::post()
        .uri("/api/portfolio/skills")
        .set_json(json!({"name": "Rust"}));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Record created successfully");
    assert_eq!(body["data"]["name"], "Rust");
}

#[actix_web::test]
async fn validation_failures_from_the_service_keep_their_fields() {
    let mut ports = MockPorts::default();
    ports.skills.expect_create().returning(|_, _| {
        Err(Error::validation(crate::domain::FieldErrors::single(
            "name",
            "This field may not be blank.",
        )))
    });

    let req = test::TestRequest::post()
        .uri("/api/portfolio/skills")
        .set_json(json!({"name": ""}));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["name"][0], "This field may not be blank.");
}

#[actix_web::test]
async fn project_payloads_accept_mixed_technologies_and_null_links() {
    let mut ports = MockPorts::default();
    ports
        .projects
        .expect_create()
        .withf(|_, input| {
            input.technologies.as_deref()
                == Some(&["Rust".to_owned(), "Postgres".to_owned()][..])
                && input.source_url == Some(None)
                && input.live_url.is_none()
        })
        .times(1)
        .returning(|_, _| Ok(project()));

    let req = test::TestRequest::post()
        .uri("/api/portfolio/projects")
        .set_json(json!({
            "title": "Portfolio",
            "description": "This site",
            "githubUrl": null,
            "technologies": ["Rust", {"name": "Postgres"}]
        }));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["liveUrl"], "https://ada.example.com");
    assert!(body["data"]["githubUrl"].is_null());
    assert_eq!(body["data"]["technologies"][0]["name"], "Rust");
}

#[rstest]
#[case("not-a-uuid")]
#[case("42")]
#[actix_web::test]
async fn malformed_record_ids_are_not_found(#[case] raw: &str) {
    let req = test::TestRequest::get().uri(&format!("/api/portfolio/skills/{raw}"));
    let (status, body) = send(MockPorts::default(), req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["detail"], "skill not found");
}

#[actix_web::test]
async fn foreign_records_are_not_found() {
    let mut ports = MockPorts::default();
    ports
        .projects
        .expect_get()
        .withf(|owner, id| *owner == test_user_id() && *id == record_id())
        .times(1)
        .returning(|_, _| Err(Error::not_found("project not found")));

    let req = test::TestRequest::get().uri(&format!("/api/portfolio/projects/{RECORD_ID}"));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "project not found");
}

#[actix_web::test]
async fn experience_patch_forwards_only_supplied_fields() {
    let mut ports = MockPorts::default();
    ports
        .experiences
        .expect_patch()
        .withf(|_, id, input| {
            *id == record_id()
                && input.company.is_none()
                && input.end_date == Some(None)
                && input.current == Some(true)
        })
        .times(1)
        .returning(|_, _, _| Ok(experience()));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/portfolio/experiences/{RECORD_ID}"))
        .set_json(json!({"end_date": null, "current": true}));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record updated successfully");
    assert_eq!(body["data"]["startDate"], "2020-01-01");
    assert!(body["data"]["endDate"].is_null());
}

#[actix_web::test]
async fn experience_replace_uses_the_full_update_port() {
    let mut ports = MockPorts::default();
    ports
        .experiences
        .expect_replace()
        .withf(|_, _, input| input.start_date.as_deref() == Some("2020-01-01"))
        .times(1)
        .returning(|_, _, _| Ok(experience()));

    let req = test::TestRequest::put()
        .uri(&format!("/api/portfolio/experiences/{RECORD_ID}"))
        .set_json(json!({
            "company": "Analytical Engines",
            "position": "Engineer",
            "description": "Notes",
            "startDate": "2020-01-01",
            "current": true
        }));
    let (status, _) = send(ports, req).await;

    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn education_delete_returns_no_content() {
    let mut ports = MockPorts::default();
    ports
        .education
        .expect_delete()
        .withf(|owner, id| *owner == test_user_id() && *id == record_id())
        .times(1)
        .returning(|_, _| Ok(()));

    let req = test::TestRequest::delete().uri(&format!("/api/portfolio/education/{RECORD_ID}"));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

#[actix_web::test]
async fn my_profile_is_served_before_id_lookup() {
    let mut ports = MockPorts::default();
    ports
        .profiles
        .expect_get_mine()
        .withf(|owner| *owner == test_user_id())
        .times(1)
        .returning(|_| Ok(sample_overview()));

    let (status, body) = send(
        ports,
        test::TestRequest::get().uri("/api/portfolio/profiles/me"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile retrieved successfully");
    assert_eq!(body["data"]["user"]["username"], "ada");
    assert_eq!(body["data"]["skills"], json!([]));
}

#[actix_web::test]
async fn profile_listing_contains_only_the_callers_profile() {
    let mut ports = MockPorts::default();
    ports
        .profiles
        .expect_list()
        .times(1)
        .returning(|_| Ok(vec![sample_overview()]));

    let (status, body) =
        send(ports, test::TestRequest::get().uri("/api/portfolio/profiles")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn updating_someone_elses_profile_is_forbidden() {
    let mut ports = MockPorts::default();
    ports
        .profiles
        .expect_update()
        .returning(|_, _, _| Err(Error::forbidden("You do not have permission to perform this action.")));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/portfolio/profiles/{RECORD_ID}"))
        .set_json(json!({"title": "Hacker"}));
    let (status, body) = send(ports, req).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[actix_web::test]
async fn profile_patch_rejects_invalid_urls() {
    let req = test::TestRequest::patch()
        .uri("/api/portfolio/profiles/me")
        .set_json(json!({"website": "not a url"}));
    let (status, body) = send(MockPorts::default(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["website"].is_array());
}

#[actix_web::test]
async fn malformed_profile_ids_are_not_found() {
    let req = test::TestRequest::get().uri("/api/portfolio/profiles/nope");
    let (status, body) = send(MockPorts::default(), req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "portfolio profile not found");
}
