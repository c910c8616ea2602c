//! HTTP handlers end to end against an in-memory database.

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use tournament_manager::{db, routes};

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! app {
    () => {{
        let pool = db::connect_in_memory().await.unwrap();
        test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .configure(routes::configure),
        )
        .await
    }};
}

fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn health_and_error_envelopes() {
    let app = app!();
    let (status, body) = send!(app, test::TestRequest::get().uri("/api/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/tournaments/7d0b7d4e-5b7c-4f6c-9a57-3f3c2c5b8a11")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/tournaments/not-an-id"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/tournaments")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\":")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/tournaments")
            .set_json(json!({ "name": "   " }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn full_tournament_flow() {
    let app = app!();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/tournaments")
            .set_json(json!({ "name": "Summer Cup", "venue": "Riverside" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "planning");
    let tid = id_of(&body);

    let mut team_ids = Vec::new();
    for name in ["Lynx", "Moose", "Newts", "Orcas"] {
        let (status, body) = send!(
            app,
            test::TestRequest::post().uri("/api/teams").set_json(json!({ "name": name }))
        );
        assert_eq!(status, StatusCode::CREATED);
        let team_id = id_of(&body);
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/tournaments/{tid}/teams"))
                .set_json(json!({ "team_id": team_id }))
        );
        assert_eq!(status, StatusCode::CREATED);
        team_ids.push(team_id);
    }
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/teams"))
            .set_json(json!({ "team_id": team_ids[0] }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/draw"))
            .set_json(json!({ "blocks": ["A"] }))
    );
    assert_eq!(status, StatusCode::OK);
    let seated = body["data"]["teams"].as_array().unwrap();
    assert!(seated.iter().all(|t| t["block_name"] == "A"));

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/templates/round-robin"))
            .set_json(json!({ "block": "A", "team_count": 4 }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}/templates")));
    let mut templates = body["data"].as_array().unwrap().clone();
    templates.push(json!({
        "match_code": "F",
        "phase": "final",
        "round_name": "Final",
        "match_number": 7,
        "team1_source": "A_1",
        "team2_source": "A_2",
    }));
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/templates"))
            .set_json(&templates)
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/generate"))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["matches"].as_array().unwrap().len(), 7);
    let (status, _) = send!(
        app,
        test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/generate"))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}/matches")));
    let matches = body["data"]["matches"].as_array().unwrap().clone();
    let final_id = matches
        .iter()
        .find(|m| m["match_code"] == "F")
        .map(|m| m["id"].as_str().unwrap().to_string())
        .unwrap();
    assert_eq!(matches.iter().find(|m| m["match_code"] == "F").unwrap()["team1_display"], "Block A #1");

    for m in matches.iter().filter(|m| m["phase"] == "preliminary") {
        let mid = m["id"].as_str().unwrap();
        let (status, _) = send!(
            app,
            test::TestRequest::put()
                .uri(&format!("/api/tournaments/{tid}/matches/{mid}/score"))
                .set_json(json!({ "team1_score": 2, "team2_score": 1, "finished": true }))
        );
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send!(
            app,
            test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/{mid}/confirm"))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["result"]["match_code"], m["match_code"]);
    }

    let first = matches[0]["id"].as_str().unwrap();
    let (status, body) = send!(
        app,
        test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/{first}/confirm"))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Match is already confirmed");

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}/matches")));
    let final_match = body["data"]["matches"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["match_code"] == "F")
        .unwrap()
        .clone();
    assert!(final_match["team1_id"].is_string());
    assert!(final_match["team2_id"].is_string());

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}/standings")));
    let tables = body["data"].as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["rows"].as_array().unwrap().len(), 4);
    assert_eq!(tables[0]["rows"][0]["rank"], 1);

    // Tied final without penalties cannot be confirmed.
    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/tournaments/{tid}/matches/{final_id}/score"))
            .set_json(json!({ "team1_score": 0, "team2_score": 0, "finished": true }))
    );
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send!(
        app,
        test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/{final_id}/confirm"))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A block match feeds the final table, so it stays locked once the final is confirmed.
    send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/tournaments/{tid}/matches/{final_id}/score"))
            .set_json(json!({ "team1_score": 0, "team2_score": 0, "team1_pk": 5, "team2_pk": 4, "finished": true }))
    );
    let (status, body) = send!(
        app,
        test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/{final_id}/confirm"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tournament_completed"], true);
    let (status, _) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/tournaments/{tid}/matches/{first}/confirm"))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/tournaments/{tid}/matches/{final_id}/confirm"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tournament_reopened"], true);
}

#[actix_web::test]
async fn overrides_over_http() {
    let app = app!();
    let (_, body) = send!(
        app,
        test::TestRequest::post().uri("/api/tournaments").set_json(json!({ "name": "Cup" }))
    );
    let tid = id_of(&body);
    for name in ["Lynx", "Moose", "Newts"] {
        let (_, body) = send!(
            app,
            test::TestRequest::post().uri("/api/teams").set_json(json!({ "name": name }))
        );
        send!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/tournaments/{tid}/teams"))
                .set_json(json!({ "team_id": id_of(&body) }))
        );
    }
    send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/draw"))
            .set_json(json!({ "blocks": ["A"] }))
    );
    send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/templates/round-robin"))
            .set_json(json!({ "block": "A", "team_count": 3 }))
    );
    send!(app, test::TestRequest::post().uri(&format!("/api/tournaments/{tid}/matches/generate")));

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/tournaments/{tid}/overrides"))
            .set_json(json!({ "match_code": "A-1", "slot": "team1", "source": "A1", "reason": "swap" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}/overrides")));
    assert_eq!(body["data"][0]["team1_source"], "A1");

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/tournaments/{tid}/overrides"))
            .set_json(json!({ "match_code": "A-1", "slot": "team2", "source": "A-1_winner" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/tournaments/{tid}/overrides/A-1/team1"))
    );
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}/overrides")));
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send!(
        app,
        test::TestRequest::delete().uri(&format!("/api/tournaments/{tid}/overrides/A-1/team3"))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn publishing_and_purge() {
    let app = app!();
    let (_, body) = send!(
        app,
        test::TestRequest::post().uri("/api/tournaments").set_json(json!({ "name": "Open Day" }))
    );
    let tid = id_of(&body);

    let (status, _) = send!(app, test::TestRequest::get().uri(&format!("/api/public/tournaments/{tid}")));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tournaments/{tid}/publish"))
            .set_json(json!({ "is_public": true }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_public"], true);

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/public/tournaments"));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (status, body) = send!(app, test::TestRequest::get().uri(&format!("/api/public/tournaments/{tid}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tournament"]["name"], "Open Day");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/public/tournaments/{tid}/results.csv"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert_eq!(content_type, "text/csv; charset=utf-8");

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tournaments/{tid}/status"))
            .set_json(json!({ "status": "recruiting" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "recruiting");
    let (status, _) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/tournaments/{tid}/status"))
            .set_json(json!({ "status": "planning" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(app, test::TestRequest::delete().uri(&format!("/api/tournaments/{tid}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 9);

    let (status, _) = send!(app, test::TestRequest::get().uri(&format!("/api/tournaments/{tid}")));
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send!(app, test::TestRequest::delete().uri(&format!("/api/tournaments/{tid}")));
    assert_eq!(status, StatusCode::NOT_FOUND);
}
