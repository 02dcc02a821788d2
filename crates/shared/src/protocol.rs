use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ArticleId, AssertionId, EndpointId, TestResult, TestcaseId, TeststepId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EndpointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Request payload of a test step. Generated requests are opaque: either a
/// raw document (a SOAP envelope) or a structured body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeststepRequest {
    Raw(String),
    Structured(serde_json::Value),
}

impl From<serde_json::Value> for TeststepRequest {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(raw) => Self::Raw(raw),
            other => Self::Structured(other),
        }
    }
}

impl From<String> for TeststepRequest {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teststep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TeststepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase_id: Option<TestcaseId>,
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub endpoint: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<TeststepRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// Raw result of running a test step against its endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    #[serde(default)]
    pub http_response_body: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_headers: Vec<HttpHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ArticleId>,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AssertionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teststep_id: Option<TeststepId>,
    pub name: String,
    #[serde(rename = "type")]
    pub assertion_type: String,
    #[serde(default)]
    pub other_properties: serde_json::Value,
}

/// Stateless verification of one assertion against an arbitrary input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionVerificationRequest {
    pub assertion: Assertion,
    pub input: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionVerificationResult {
    pub result: TestResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
