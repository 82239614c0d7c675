use crate::helpers::{document_path, send_path, spawn_app, valid_request, TestApp};
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

/// Nobody must be called: neither the document store nor the push provider.
async fn expect_no_collaborator_calls(app: &TestApp) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .named("Unexpected document store call")
        .expect(0)
        .mount(&app.document_store)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .named("Unexpected push provider call")
        .expect(0)
        .mount(&app.push_server)
        .await;
}

/// Any send at all is a failure.
async fn expect_no_sends(app: &TestApp) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&app.push_server)
        .await;
}

async fn error_message(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Expected a JSON body.");
    body["error"]
        .as_str()
        .expect("Expected an `error` field.")
        .to_string()
}

#[tokio::test]
async fn requests_missing_required_fields_are_rejected_with_a_400() {
    // Arrange
    let app = spawn_app().await;
    expect_no_collaborator_calls(&app).await;

    let mut test_cases = Vec::new();
    for field in ["negocioId", "mensaje", "codigo", "fechaInicio", "fechaFin"] {
        let mut missing = valid_request("b1");
        missing.as_object_mut().unwrap().remove(field);
        test_cases.push((missing, format!("missing {field}")));

        let mut empty = valid_request("b1");
        empty[field] = json!("");
        test_cases.push((empty, format!("empty {field}")));

        let mut null = valid_request("b1");
        null[field] = serde_json::Value::Null;
        test_cases.push((null, format!("null {field}")));
    }
    test_cases.push((json!({}), "an empty object".to_string()));

    for (invalid_body, description) in test_cases {
        // Act
        let response = app.post_offer_notification(&invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        assert_eq!(
            error_message(response).await,
            "Parámetros requeridos: negocioId, mensaje, código, fechaInicio, fechaFin."
        );
    }
}

#[tokio::test]
async fn malformed_bodies_are_rejected_with_a_400() {
    // Arrange
    let app = spawn_app().await;
    expect_no_collaborator_calls(&app).await;
    let url = format!("{}/enviar-notificacion-oferta", &app.address);

    let mut numeric_code = valid_request("b1");
    numeric_code["codigo"] = json!(2024);
    let test_cases = vec![
        ("application/json", "{not json".to_string(), "not valid JSON"),
        ("text/plain", valid_request("b1").to_string(), "not sent as JSON"),
        ("application/json", numeric_code.to_string(), "a non-string field"),
    ];

    for (content_type, body, description) in test_cases {
        // Act
        let response = app
            .api_client
            .post(&url)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.");

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        assert_eq!(
            error_message(response).await,
            "Parámetros requeridos: negocioId, mensaje, código, fechaInicio, fechaFin."
        );
    }
}

#[tokio::test]
async fn an_unknown_business_returns_a_404_and_nothing_is_sent() {
    // Arrange
    let app = spawn_app().await;
    expect_no_sends(&app).await;
    // No document mounted: the store answers 404, as Firestore does.

    // Act
    let response = app.post_offer_notification(&valid_request("ghost")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(error_message(response).await, "Negocio no encontrado.");
}

#[tokio::test]
async fn a_business_without_subscriptions_returns_a_404() {
    // Arrange
    let app = spawn_app().await;
    expect_no_sends(&app).await;
    app.given_business("b1", Some("Café Central"), &[]).await;

    // Act
    let response = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(
        error_message(response).await,
        "No se encontraron usuarios suscritos al negocio especificado."
    );
}

#[tokio::test]
async fn subscribers_without_any_token_return_a_404_rather_than_an_empty_result() {
    // Arrange
    let app = spawn_app().await;
    expect_no_sends(&app).await;
    app.given_business("b1", Some("Café Central"), &["u1", "u2"])
        .await;
    app.given_user("u1", None).await;
    // u2 does not exist

    // Act
    let response = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(
        error_message(response).await,
        "No se encontraron tokens FCM válidos para los usuarios suscritos."
    );
}

#[tokio::test]
async fn a_rejected_token_is_reported_next_to_the_delivered_ones() {
    // Arrange
    let app = spawn_app().await;
    app.given_business("b1", Some("Café Central"), &["u1", "u2", "u3"])
        .await;
    app.given_user("u1", Some("t1")).await;
    app.given_user("u2", None).await;
    app.given_user("u3", Some("t2")).await;
    app.given_accepted_token("t1", 1).await;
    app.given_rejected_token(
        "t2",
        "The registration token is not a valid FCM registration token",
        1,
    )
    .await;

    // Act
    let response = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["mensaje"], "Notificación enviada exitosamente.");
    let results = body["resultados"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["token"], "t1");
    assert!(results[0]["response"]
        .as_str()
        .unwrap()
        .starts_with("projects/test-project/messages/"));
    assert!(results[0].get("error").is_none());

    assert_eq!(
        results[1],
        json!({
            "token": "t2",
            "error": "The registration token is not a valid FCM registration token"
        })
    );
}

#[tokio::test]
async fn only_subscribers_with_a_reachable_token_are_notified() {
    // Arrange
    let app = spawn_app().await;
    app.given_business("b1", Some("Café Central"), &["u1", "u2", "u3", "u4", "u5"])
        .await;
    app.given_user("u1", Some("t1")).await;
    // u2 does not exist
    Mock::given(method("GET"))
        .and(path(document_path("usuarios", "u3")))
        .respond_with(ResponseTemplate::new(503))
        .named("Failing user lookup")
        .expect(1)
        .mount(&app.document_store)
        .await;
    app.given_user("u4", None).await;
    app.given_user("u5", Some("t5")).await;
    app.given_accepted_token("t1", 1).await;
    app.given_accepted_token("t5", 1).await;

    // Act
    let response = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let tokens: Vec<&str> = body["resultados"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["token"].as_str().unwrap())
        .collect();
    assert_eq!(tokens, vec!["t1", "t5"]);
}

#[tokio::test]
async fn the_title_names_the_business_and_the_code_and_the_body_is_the_message() {
    // Arrange
    let app = spawn_app().await;
    app.given_business("b1", None, &["u1"]).await;
    app.given_user("u1", Some("t1")).await;
    Mock::given(method("POST"))
        .and(path(send_path()))
        .and(body_partial_json(json!({
            "message": {
                "token": "t1",
                "notification": {
                    "title": "Nueva promoción de Negocio desconocido con el código CAFE2X1",
                    "body": "2x1 en cafés todo el fin de semana"
                }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "projects/test-project/messages/1"})),
        )
        .expect(1)
        .mount(&app.push_server)
        .await;

    // Act
    let response = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn a_repeated_request_sends_a_second_round_of_notifications() {
    // Arrange
    let app = spawn_app().await;
    app.given_business("b1", Some("Café Central"), &["u1", "u2"])
        .await;
    app.given_user("u1", Some("t1")).await;
    app.given_user("u2", Some("t2")).await;
    // Nothing is deduplicated across requests: each token is sent to once per request.
    app.given_accepted_token("t1", 2).await;
    app.given_accepted_token("t2", 2).await;

    // Act
    let first = app.post_offer_notification(&valid_request("b1")).await;
    let second = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);
}

#[tokio::test]
async fn a_failing_business_lookup_returns_a_500_without_leaking_details() {
    // Arrange
    let app = spawn_app().await;
    expect_no_sends(&app).await;
    Mock::given(method("GET"))
        .and(path(document_path("negocios", "b1")))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&app.document_store)
        .await;

    // Act
    let response = app.post_offer_notification(&valid_request("b1")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(error_message(response).await, "Error interno del servidor.");
}
