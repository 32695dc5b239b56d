//! Blocking HTTP adapter that binds the server operator to the remote API
//!
//! Thin by intent: one request per operator call, no retries, no caching.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::Account;
use crate::domain::{
    Server, ServerCreateRequest, ServerCreateResponse, ServerEvent, ServerMetric,
    ServerUpdateRequest,
};
use crate::infrastructure::traits::ServerOperator;
use crate::infrastructure::{InfraError, InfraResult};

pub const HEADER_USER_ID: &str = "x-auth-userid";
pub const HEADER_TOKEN: &str = "x-auth-token";

const SERVERS_PATH: &str = "/objects/servers";

/// Authenticated client for one account's endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the account's url and credentials.
    pub fn new(account: &Account, timeout: Option<Duration>) -> InfraResult<Self> {
        account.validate()?;

        let invalid = |field| InfraError::InvalidCredential {
            name: account.name.clone(),
            field,
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_TOKEN,
            HeaderValue::from_str(&account.token).map_err(|_| invalid("token"))?,
        );
        if !account.user_id.is_empty() {
            headers.insert(
                HEADER_USER_ID,
                HeaderValue::from_str(&account.user_id).map_err(|_| invalid("userId"))?,
            );
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| InfraError::http("build HTTP client", e))?;

        Ok(Self {
            http,
            base_url: account.url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> InfraResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| InfraError::http(format!("GET {url}"), e))?;
        check(response)?
            .json()
            .map_err(|e| InfraError::http(format!("decode response of GET {url}"), e))
    }

    /// Send a request with a JSON body and return the successful response.
    pub fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> InfraResult<Response> {
        let url = self.url(path);
        debug!(%method, %url, "request");
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .map_err(|e| InfraError::http(format!("{method} {url}"), e))?;
        check(response)
    }
}

fn check(response: Response) -> InfraResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .ok()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(InfraError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
struct ServerList {
    #[serde(default)]
    servers: BTreeMap<String, Server>,
}

#[derive(Deserialize)]
struct ServerEnvelope {
    server: Server,
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    events: Vec<ServerEvent>,
}

#[derive(Deserialize)]
struct MetricList {
    #[serde(default)]
    server_metrics: Vec<ServerMetric>,
}

/// Server operator backed by the remote API.
#[derive(Debug, Clone)]
pub struct RemoteServerOperator {
    client: ApiClient,
}

impl RemoteServerOperator {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn server_path(id: &str) -> String {
        format!("{SERVERS_PATH}/{id}")
    }

    fn set_power(&self, id: &str, on: bool) -> InfraResult<()> {
        let path = format!("{}/power", Self::server_path(id));
        self.client
            .send(Method::PATCH, &path, Some(&json!({ "power": on })))?;
        Ok(())
    }
}

impl ServerOperator for RemoteServerOperator {
    #[instrument(level = "debug", skip(self))]
    fn list_servers(&self) -> InfraResult<Vec<Server>> {
        let list: ServerList = self.client.get(SERVERS_PATH)?;
        Ok(list
            .servers
            .into_iter()
            .map(|(id, mut server)| {
                if server.object_uuid.is_empty() {
                    server.object_uuid = id;
                }
                server
            })
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    fn get_server(&self, id: &str) -> InfraResult<Server> {
        let envelope: ServerEnvelope = self.client.get(&Self::server_path(id))?;
        Ok(envelope.server)
    }

    #[instrument(level = "debug", skip(self))]
    fn create_server(&self, request: &ServerCreateRequest) -> InfraResult<ServerCreateResponse> {
        self.client
            .send(Method::POST, SERVERS_PATH, Some(request))?
            .json()
            .map_err(|e| InfraError::http("decode create response", e))
    }

    #[instrument(level = "debug", skip(self))]
    fn update_server(&self, id: &str, request: &ServerUpdateRequest) -> InfraResult<()> {
        self.client
            .send(Method::PATCH, &Self::server_path(id), Some(request))?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_server(&self, id: &str) -> InfraResult<()> {
        self.client
            .send::<()>(Method::DELETE, &Self::server_path(id), None)?;
        Ok(())
    }

    fn start_server(&self, id: &str) -> InfraResult<()> {
        self.set_power(id, true)
    }

    fn stop_server(&self, id: &str) -> InfraResult<()> {
        self.set_power(id, false)
    }

    #[instrument(level = "debug", skip(self))]
    fn shutdown_server(&self, id: &str) -> InfraResult<()> {
        let path = format!("{}/shutdown", Self::server_path(id));
        self.client
            .send(Method::PATCH, &path, Some(&json!({})))?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn list_server_events(&self, id: &str) -> InfraResult<Vec<ServerEvent>> {
        let list: EventList = self
            .client
            .get(&format!("{}/events", Self::server_path(id)))?;
        Ok(list.events)
    }

    #[instrument(level = "debug", skip(self))]
    fn list_server_metrics(&self, id: &str) -> InfraResult<Vec<ServerMetric>> {
        let list: MetricList = self
            .client
            .get(&format!("{}/metrics", Self::server_path(id)))?;
        Ok(list.server_metrics)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{DELETE, GET, PATCH};
    use httpmock::MockServer;

    use super::*;

    fn operator_for(server: &MockServer) -> RemoteServerOperator {
        let account = Account {
            name: "test".into(),
            user_id: "user-1".into(),
            token: "secret".into(),
            url: server.base_url(),
        };
        RemoteServerOperator::new(ApiClient::new(&account, None).expect("client"))
    }

    #[test]
    fn given_account_without_token_when_building_client_then_fails() {
        let account = Account {
            name: "broken".into(),
            url: "http://localhost".into(),
            ..Default::default()
        };
        assert!(matches!(
            ApiClient::new(&account, None),
            Err(InfraError::IncompleteAccount { field: "token", .. })
        ));
    }

    #[test]
    fn list_servers_sends_credentials_and_fills_ids() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/objects/servers")
                .header(HEADER_TOKEN, "secret")
                .header(HEADER_USER_ID, "user-1");
            then.status(200).json_body(json!({
                "servers": {
                    "uuid-1": { "name": "web", "cores": 2, "memory": 4, "power": true },
                    "uuid-2": { "object_uuid": "uuid-2", "name": "db" }
                }
            }));
        });

        let servers = operator_for(&server).list_servers().expect("list");

        mock.assert();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].object_uuid, "uuid-1");
        assert_eq!(servers[0].name, "web");
        assert_eq!(servers[1].object_uuid, "uuid-2");
    }

    #[test]
    fn stop_server_patches_power_off() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/objects/servers/abc/power")
                .json_body(json!({ "power": false }));
            then.status(202);
        });

        operator_for(&server).stop_server("abc").expect("stop");

        mock.assert();
    }

    #[test]
    fn shutdown_server_patches_shutdown_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH).path("/objects/servers/abc/shutdown");
            then.status(202);
        });

        operator_for(&server).shutdown_server("abc").expect("shutdown");

        mock.assert();
    }

    #[test]
    fn delete_server_maps_error_status_to_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/objects/servers/abc");
            then.status(404).body("object not found");
        });

        let err = operator_for(&server)
            .delete_server("abc")
            .expect_err("should fail");

        match err {
            InfraError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "object not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn is_server_on_reads_power_from_get_server() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/objects/servers/abc");
            then.status(200)
                .json_body(json!({ "server": { "object_uuid": "abc", "power": true } }));
        });

        assert!(operator_for(&server).is_server_on("abc").expect("power state"));
    }
}
