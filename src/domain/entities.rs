//! Domain entities: resource records passed between operators and the renderer
//!
//! Records serialize with camelCase keys (`objectUUID` for identifiers) and accept
//! the remote API's snake_case keys on input.

use serde::{Deserialize, Serialize};

/// A virtual server as returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    #[serde(rename = "objectUUID", alias = "object_uuid")]
    pub object_uuid: String,
    pub name: String,
    pub cores: u32,
    /// Memory in GiB
    pub memory: u32,
    pub power: bool,
    pub status: String,
    #[serde(rename = "locationUUID", alias = "location_uuid")]
    pub location_uuid: String,
    #[serde(alias = "location_name")]
    pub location_name: String,
    #[serde(alias = "change_time")]
    pub change_time: String,
    #[serde(alias = "create_time")]
    pub create_time: String,
    pub labels: Vec<String>,
}

impl Server {
    /// Power state as shown in tables.
    pub fn power_label(&self) -> &'static str {
        if self.power {
            "on"
        } else {
            "off"
        }
    }
}

/// One entry of a server's event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerEvent {
    #[serde(rename = "objectUUID", alias = "object_uuid")]
    pub object_uuid: String,
    #[serde(alias = "object_type")]
    pub object_type: String,
    #[serde(rename = "requestUUID", alias = "request_uuid")]
    pub request_uuid: String,
    #[serde(alias = "request_type")]
    pub request_type: String,
    #[serde(alias = "request_status")]
    pub request_status: String,
    pub change: String,
    pub timestamp: String,
    #[serde(rename = "userUUID", alias = "user_uuid")]
    pub user_uuid: String,
    pub initiator: String,
}

/// A measured value with its unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub value: f64,
    pub unit: String,
}

/// CPU usage sample for a server over a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerMetric {
    #[serde(alias = "begin_time")]
    pub begin_time: String,
    #[serde(alias = "end_time")]
    pub end_time: String,
    #[serde(alias = "padding_seconds")]
    pub padding_seconds: u32,
    #[serde(rename = "serverUUID", alias = "server_uuid")]
    pub server_uuid: String,
    #[serde(alias = "core_usage")]
    pub core_usage: Usage,
}

/// Body of a server creation request, in the remote API's wire casing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCreateRequest {
    pub name: String,
    pub cores: u32,
    pub memory: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,
}

/// Response to a creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerCreateResponse {
    #[serde(rename = "objectUUID", alias = "object_uuid")]
    pub object_uuid: String,
    #[serde(rename = "requestUUID", alias = "request_uuid")]
    pub request_uuid: String,
}

/// Partial update of a server; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
}

impl ServerUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cores.is_none() && self.memory.is_none()
    }
}
