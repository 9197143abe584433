#![allow(clippy::unwrap_used)]
// Integration tests for `SmartHomeClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kodakhome_api::{
    AuthFailure, Endpoints, Error, EventType, SmartHomeClient, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SmartHomeClient) {
    let server = MockServer::start().await;
    let endpoints = Endpoints::new(
        &format!("{}/web", server.uri()),
        &format!("{}/v1/oauth/token", server.uri()),
    )
    .unwrap();
    let client = SmartHomeClient::new(endpoints, &TransportConfig::default()).unwrap();
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("abcdef0123456789".to_string())
}

// ── Probe ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_success() {
    let (server, client) = setup().await;

    Mock::given(method("OPTIONS"))
        .and(path("/v1/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.probe().await.unwrap();
}

#[tokio::test]
async fn test_probe_failure() {
    let (server, client) = setup().await;

    Mock::given(method("OPTIONS"))
        .and(path("/v1/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.probe().await;

    assert!(
        matches!(result, Err(Error::Http { status: 500, .. })),
        "expected HTTP 500 error, got: {result:?}"
    );
}

// ── Token ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/token"))
        .and(header("authorization", kodakhome_api::auth::CLIENT_AUTHORIZATION))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=fake_user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abcdef0123456789",
            "token_type": "bearer",
            "refresh_token": "refresh-me",
            "expires_in": 3599,
            "scope": "read write",
            "account_info": { "id": 7777 },
            "web_urls": { "web": "https://app-eu.kodaksmarthome.com/web" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("fake_pass".to_string());
    let info = client.request_token("fake_user", &password).await.unwrap();

    assert_eq!(info.access_token.expose_secret(), "abcdef0123456789");
    assert_eq!(info.token_type.as_deref(), Some("bearer"));
    assert_eq!(info.expires_in, Some(3599));
    assert_eq!(info.account_info["id"], 7777);
}

#[tokio::test]
async fn test_request_token_invalid_grant() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let password = SecretString::from("wrong".to_string());
    let result = client.request_token("fake_user", &password).await;

    assert!(
        matches!(result, Err(Error::Unauthorized(AuthFailure::InvalidGrant))),
        "expected invalid_grant, got: {result:?}"
    );
}

#[tokio::test]
async fn test_request_token_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let password = SecretString::from("fake_pass".to_string());
    let result = client.request_token("fake_user", &password).await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert!(body.contains("maintenance"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Authenticate ────────────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_sets_session_cookie() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/web/authenticate"))
        .and(body_string_contains("password=abcdef0123456789"))
        .and(body_string_contains("rememberme=false"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "JSESSIONID=session-42; Path=/")
                .set_body_json(json!({
                    "status": 200,
                    "msg": "Success",
                    "data": { "id": 7777, "email": "my@email.com" }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.session_cookie().is_none());

    let user = client.authenticate(&token()).await.unwrap();

    assert_eq!(user.id, 7777);
    assert_eq!(user.extra["email"], "my@email.com");
    assert_eq!(
        client.session_cookie().unwrap().expose_secret(),
        "session-42"
    );
}

#[tokio::test]
async fn test_authenticate_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/web/authenticate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.authenticate(&token()).await;

    match result {
        Err(Error::Http { status, ref body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HTTP error, got: {other:?}"),
    }
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/web/user/device"))
        .and(query_param("access_token", "abcdef0123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "msg": "Success",
            "data": {
                "payment_source": 1,
                "plan_id": "plan_01",
                "devices": [{
                    "id": 1000,
                    "device_id": "FAKEDEVICEID",
                    "plan_id": "plan_01"
                }]
            }
        })))
        .mount(&server)
        .await;

    let listing = client.list_devices(&token()).await.unwrap();

    assert_eq!(listing.devices.len(), 1);
    assert_eq!(listing.devices[0].device_id, "FAKEDEVICEID");
    assert_eq!(listing.account["payment_source"], 1);
}

// ── Events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_events_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/web/user/device/event"))
        .and(query_param("device_id", "FAKEDEVICEID"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "msg": "Success",
            "total_pages": 2,
            "data": {
                "total_events": 2,
                "total_pages": 2,
                "events": [
                    {
                        "id": "c71516a0-2f3d-11ea-8790-3fdecad07f1c",
                        "event_type": 2,
                        "created_date": "2020-01-04T22:01:36.000Z",
                        "data": [],
                        "dv_data": null
                    },
                    {
                        "id": "13889a30-227c-11ea-8790-3fdecad07f1c",
                        "event_type": 7,
                        "created_date": "2019-12-19T16:24:48.000Z",
                        "data": [],
                        "dv_data": null
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let page = client
        .device_events(&token(), "FAKEDEVICEID", 2)
        .await
        .unwrap();

    assert_eq!(page.total_pages, 2);
    assert_eq!(page.total_events, 2);
    assert_eq!(page.events[0].event_type, EventType::Sound);
    assert_eq!(page.events[1].event_type, EventType::Battery);
}

// ── 401 classification ──────────────────────────────────────────────

#[tokio::test]
async fn test_access_denied_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/web/user/device"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "msg": "Access Denied"
        })))
        .mount(&server)
        .await;

    let result = client.list_devices(&token()).await;

    match result {
        Err(Error::Unauthorized(AuthFailure::AccessDenied { ref message })) => {
            assert_eq!(message, "Access Denied");
        }
        other => panic!("expected AccessDenied, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_auth_error_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/web/user/device/event"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "reason": "authError",
            "message": "session expired"
        })))
        .mount(&server)
        .await;

    let result = client.device_events(&token(), "FAKEDEVICEID", 1).await;

    assert!(
        matches!(
            result,
            Err(Error::Unauthorized(AuthFailure::AuthError { .. }))
        ),
        "expected AuthError, got: {result:?}"
    );
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_ignores_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/web/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
}
