// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the API client over HTTP using wiremock.

use std::time::Duration;

use chrono::TimeDelta;
use mylight_systems::protocol::{HttpClientBuilder, HttpConfig, Protocol};
use mylight_systems::{
    ApiClient, Credentials, Error, GridType, ProtocolError, RelayState, Session,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "abcdef";

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::http(HttpConfig::new(server.uri())).unwrap()
}

fn credentials() -> Credentials {
    Credentials::new("jane@example.com", "secret")
}

fn not_authorized() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "error",
        "error": "not.authorized"
    }))
}

async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .and(query_param("email", "jane@example.com"))
        .and(query_param("password", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "authToken": token
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ============================================================================
// HttpClient Tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn query_is_url_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth"))
            .and(query_param("email", "jane+solar@example.com"))
            .and(query_param("password", "p&ss=word"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClientBuilder::new()
            .base_url(server.uri())
            .build()
            .unwrap();

        let response = client
            .get(
                "/api/auth",
                &[("email", "jane+solar@example.com"), ("password", "p&ss=word")],
            )
            .await
            .unwrap();

        assert_eq!(response.body(), "{}");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClientBuilder::new()
            .base_url(format!("{}/", server.uri()))
            .build()
            .unwrap();

        client.get("/api/profile", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_connection_failed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_profile(TOKEN).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Communication(ProtocolError::ConnectionFailed(ref msg)) if msg.contains("503")
        ));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn http_unauthorized_is_authentication_failed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).get_devices(TOKEN).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Communication(ProtocolError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_states(TOKEN).await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn missing_status_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"authToken": TOKEN})))
            .mount(&server)
            .await;

        let err = client_for(&server).login(&credentials()).await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}

// ============================================================================
// Authentication Tests
// ============================================================================

mod login {
    use super::*;

    #[tokio::test]
    async fn token_is_auth_token() {
        let server = MockServer::start().await;
        mount_login(&server, TOKEN, 1).await;

        let session = client_for(&server).login(&credentials()).await.unwrap();

        assert_eq!(session.token(), TOKEN);
        assert!(session.is_fresh());
    }

    #[tokio::test]
    async fn credential_errors_are_invalid_credentials() {
        for code in ["invalid.credentials", "undefined.email", "undefined.password"] {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/api/auth"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "status": "error",
                    "error": code
                })))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let err = client.ensure_valid_token(&credentials()).await.unwrap_err();

            assert!(matches!(err, Error::InvalidCredentials), "code {code}");
            assert!(err.requires_reauthentication());
            assert!(client.tokens().session().await.is_none(), "code {code}");
        }
    }

    #[tokio::test]
    async fn unknown_error_is_general() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "error": "maintenance.in.progress"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).login(&credentials()).await.unwrap_err();

        assert!(matches!(err, Error::General(ref msg) if msg.contains("maintenance.in.progress")));
    }

    #[tokio::test]
    async fn ensure_valid_token_logs_in_once() {
        let server = MockServer::start().await;
        mount_login(&server, TOKEN, 1).await;

        let client = client_for(&server);
        let first = client.ensure_valid_token(&credentials()).await.unwrap();
        let second = client.ensure_valid_token(&credentials()).await.unwrap();

        assert_eq!(first, TOKEN);
        assert_eq!(second, TOKEN);
        assert!(client.tokens().is_authenticated().await);
    }

    #[tokio::test]
    async fn stale_token_is_renewed() {
        let server = MockServer::start().await;
        mount_login(&server, TOKEN, 2).await;

        let client = client_for(&server).with_token_validity(TimeDelta::zero());
        client.ensure_valid_token(&credentials()).await.unwrap();
        client.ensure_valid_token(&credentials()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "error": "invalid.credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .tokens()
            .store(Session::issue("previous", TimeDelta::zero()))
            .await;

        let err = client.ensure_valid_token(&credentials()).await.unwrap_err();

        assert!(matches!(err, Error::InvalidCredentials));
        assert_eq!(client.tokens().session().await.unwrap().token(), "previous");
    }
}

// ============================================================================
// Account Tests
// ============================================================================

mod account {
    use super::*;

    async fn profile_grid_type(remote: &str) -> GridType {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(query_param("authToken", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "id": "40oXYqq6nM7R9zGK",
                "gridType": remote
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).get_profile(TOKEN).await.unwrap();
        assert_eq!(profile.subscription_id, "40oXYqq6nM7R9zGK");
        profile.grid_type
    }

    #[tokio::test]
    async fn grid_type_mapping() {
        assert_eq!(profile_grid_type("1 phase").await, GridType::OnePhase);
        assert_eq!(profile_grid_type("3 phases").await, GridType::ThreePhases);
        assert_eq!(profile_grid_type("2 phases").await, GridType::OnePhase);
    }

    #[tokio::test]
    async fn devices_are_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/devices"))
            .and(query_param("authToken", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "devices": [
                    {"id": "qVGSJ45vkeqvrHy6g", "type": "vrt", "name": "Virtual"},
                    {
                        "id": "ZEdtSVQKto8T53RWa_msb",
                        "type": "bat",
                        "name": "MySmartBattery",
                        "batteryCapacity": 5000.0
                    },
                    {
                        "id": "4tGrXr2CViF8chJEd",
                        "type": "mst",
                        "name": "Master",
                        "reportPeriod": 300
                    },
                    {"id": "Xc4dTu9pVq2sWz1", "type": "sw", "name": "Water heater"},
                    {"id": "cmp-1", "type": "cmp", "name": "Counter"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let devices = client_for(&server).get_devices(TOKEN).await.unwrap();

        assert_eq!(devices.virtual_device_id.as_deref(), Some("qVGSJ45vkeqvrHy6g"));
        assert_eq!(devices.virtual_battery_id.as_deref(), Some("ZEdtSVQKto8T53RWa_msb"));
        assert_eq!(devices.virtual_battery_capacity, Some(5000.0));
        assert_eq!(devices.master_id.as_deref(), Some("4tGrXr2CViF8chJEd"));
        assert_eq!(devices.master_report_period, Some(300));
        assert_eq!(devices.master_relay_id.as_deref(), Some("Xc4dTu9pVq2sWz1"));
    }
}

// ============================================================================
// Measures and States Tests
// ============================================================================

mod measures {
    use super::*;

    const FIXTURE_ORDER: [&str; 14] = [
        "energy",
        "produced_energy",
        "electricity_meter_energy",
        "green_energy",
        "grid_energy",
        "msb_charge",
        "msb_discharge",
        "msb_loss",
        "positive_index",
        "negative_index",
        "grid_sans_msb_energy",
        "autonomy_rate",
        "available_power_rate",
        "self_conso",
    ];

    #[tokio::test]
    async fn measures_keep_wire_order() {
        let server = MockServer::start().await;

        let values: Vec<_> = (0_u32..)
            .zip(FIXTURE_ORDER)
            .map(|(i, kind)| {
                let unit = if kind.ends_with("_rate") || kind == "self_conso" {
                    "%"
                } else {
                    "Ws"
                };
                json!({"type": kind, "value": f64::from(i) * 1000.0, "unit": unit})
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/api/measures/total"))
            .and(query_param("authToken", TOKEN))
            .and(query_param("measureType", "one_phase"))
            .and(query_param("deviceId", "qVGSJ45vkeqvrHy6g"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "measure": {"values": values}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let measures = client_for(&server)
            .get_measures_total(TOKEN, GridType::OnePhase, "qVGSJ45vkeqvrHy6g")
            .await
            .unwrap();

        let kinds: Vec<&str> = measures.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, FIXTURE_ORDER);
        assert_eq!(measures[1].unit, "Ws");
        assert_eq!(measures[11].unit, "%");
        assert_eq!(measures[13].value, Some(13_000.0));
    }

    #[tokio::test]
    async fn null_value_keeps_other_measures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/measures/total"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "measure": {"values": [
                    {"type": "produced_energy", "value": 7200.0, "unit": "Ws"},
                    {"type": "msb_charge", "value": null, "unit": "Ws"},
                    {"type": "self_conso", "value": 81.5, "unit": "%"}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let measures = client_for(&server)
            .get_measures_total(TOKEN, GridType::OnePhase, "qVGSJ45vkeqvrHy6g")
            .await
            .unwrap();

        assert_eq!(measures.len(), 3);
        assert_eq!(measures[0].watt_hours(), Some(2.0));
        assert_eq!(measures[1].value, None);
        assert_eq!(measures[2].value, Some(81.5));
    }

    #[tokio::test]
    async fn battery_and_relay_states() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/states"))
            .and(query_param("authToken", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "deviceStates": [
                    {
                        "deviceId": "ZEdtSVQKto8T53RWa_msb",
                        "sensorStates": [
                            {
                                "sensorId": "ZEdtSVQKto8T53RWa_msb-soc",
                                "measure": {"type": "soc", "value": 5_400_000.0, "unit": "Ws"}
                            }
                        ]
                    },
                    {"deviceId": "Xc4dTu9pVq2sWz1", "state": "on", "sensorStates": []}
                ]
            })))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server);

        let battery = client
            .get_battery_state(TOKEN, "ZEdtSVQKto8T53RWa_msb")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(battery.watt_hours(), Some(1500.0));

        let relay = client.get_relay_state(TOKEN, "Xc4dTu9pVq2sWz1").await.unwrap();
        assert_eq!(relay, Some(RelayState::On));

        let missing = client.get_relay_state(TOKEN, "unknown").await.unwrap();
        assert_eq!(missing, None);
    }
}

// ============================================================================
// Relay Tests
// ============================================================================

mod relay {
    use super::*;

    #[tokio::test]
    async fn turn_on_returns_reported_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/device/switch"))
            .and(query_param("authToken", TOKEN))
            .and(query_param("id", "Xc4dTu9pVq2sWz1"))
            .and(query_param("on", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "state": "on"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = client_for(&server)
            .turn_relay_on(TOKEN, "Xc4dTu9pVq2sWz1")
            .await
            .unwrap();

        assert_eq!(state, RelayState::On);
    }

    #[tokio::test]
    async fn switch_not_allowed_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/device/switch"))
            .and(query_param("on", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "error": "switch.not.allowed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = client_for(&server)
            .turn_relay_off(TOKEN, "Xc4dTu9pVq2sWz1")
            .await
            .unwrap();

        assert_eq!(state, RelayState::On);
    }
}

// ============================================================================
// Token Rejection and Transport Failure Tests
// ============================================================================

mod failures {
    use super::*;

    #[test]
    fn unparsable_base_url_is_communication_error() {
        let result = ApiClient::http(HttpConfig::new("https://bad host"));

        assert!(matches!(
            result,
            Err(Error::Communication(ProtocolError::InvalidAddress(_)))
        ));
    }

    #[tokio::test]
    async fn not_authorized_on_every_authenticated_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(not_authorized())
            .mount(&server)
            .await;

        let client = client_for(&server);

        assert!(matches!(client.get_profile(TOKEN).await, Err(Error::Unauthorized)));
        assert!(matches!(client.get_devices(TOKEN).await, Err(Error::Unauthorized)));
        assert!(matches!(
            client
                .get_measures_total(TOKEN, GridType::ThreePhases, "qVGSJ45vkeqvrHy6g")
                .await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(client.get_states(TOKEN).await, Err(Error::Unauthorized)));
        assert!(matches!(
            client.get_battery_state(TOKEN, "ZEdtSVQKto8T53RWa_msb").await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            client.get_relay_state(TOKEN, "Xc4dTu9pVq2sWz1").await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            client.turn_relay_on(TOKEN, "Xc4dTu9pVq2sWz1").await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            client.turn_relay_off(TOKEN, "Xc4dTu9pVq2sWz1").await,
            Err(Error::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn not_authorized_clears_session_and_next_call_logs_in() {
        let server = MockServer::start().await;
        mount_login(&server, TOKEN, 2).await;

        Mock::given(method("GET"))
            .and(path("/api/devices"))
            .respond_with(not_authorized())
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = client.ensure_valid_token(&credentials()).await.unwrap();

        let err = client.get_devices(&token).await.unwrap_err();
        assert!(err.requires_reauthentication());
        assert!(client.tokens().session().await.is_none());

        client.ensure_valid_token(&credentials()).await.unwrap();
    }

    #[tokio::test]
    async fn timeout_keeps_stored_token() {
        let server = MockServer::start().await;
        mount_login(&server, TOKEN, 1).await;

        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "ok", "id": "x", "gridType": "1 phase"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = HttpConfig::new(server.uri()).with_timeout(Duration::from_millis(200));
        let client = ApiClient::http(config).unwrap();
        let token = client.ensure_valid_token(&credentials()).await.unwrap();

        let err = client.get_profile(&token).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(err, Error::Communication(ProtocolError::Timeout(200))));
        assert_eq!(client.tokens().session().await.unwrap().token(), TOKEN);
    }

    #[tokio::test]
    async fn connection_failure_keeps_stored_token() {
        let config = HttpConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
        let client = ApiClient::http(config).unwrap();
        client
            .tokens()
            .store(Session::issue(TOKEN, TimeDelta::hours(2)))
            .await;

        let err = client.get_devices(TOKEN).await.unwrap_err();

        assert!(matches!(err, Error::Communication(_)));
        assert!(err.is_transient());
        assert_eq!(client.tokens().session().await.unwrap().token(), TOKEN);
    }
}
