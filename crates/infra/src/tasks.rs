//! Task backend client - the standalone callback factory
//!
//! Builds the task-domain callbacks against a REST backend with no host
//! involvement. Serialization of the deadline fields is deliberately
//! asymmetric: a create without an end date omits `end_date`/`deadline`
//! entirely, an update without one sends explicit `null`s so a previously
//! set deadline can be un-set.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowcal_core::{TaskGateway, TaskGatewayFactory};
use flowcal_domain::{
    ImportSummary, Result, ServerTask, TaskDraft, TaskList, TaskPriority, TaskStatus,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::errors::{network_error, parse_json, require_success};
use crate::http::HttpClient;

/// HTTP client for the task CRUD contract.
pub struct TaskApiClient {
    http: HttpClient,
    base_url: String,
}

impl TaskApiClient {
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        let base_url = api_base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http: HttpClient::new()?, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// `Option<Option<_>>` drives the create/update asymmetry: the outer `None`
// omits the key, `Some(None)` serializes an explicit `null`.
#[derive(Debug, Serialize)]
struct TaskRequestBody<'a> {
    title: &'a str,
    description: &'a str,
    status: TaskStatus,
    start_date: DateTime<Utc>,
    priority: TaskPriority,
    assignee: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<Option<DateTime<Utc>>>,
}

impl<'a> TaskRequestBody<'a> {
    fn base(draft: &'a TaskDraft) -> Self {
        Self {
            title: &draft.title,
            description: &draft.description,
            status: draft.status.unwrap_or_default(),
            start_date: draft.start_date,
            priority: draft.priority.unwrap_or_default(),
            assignee: draft.assignee.as_deref().unwrap_or(""),
            end_date: None,
            deadline: None,
        }
    }

    fn for_create(draft: &'a TaskDraft) -> Self {
        let end = draft.end_date.map(Some);
        Self { end_date: end, deadline: end, ..Self::base(draft) }
    }

    fn for_update(draft: &'a TaskDraft) -> Self {
        let end = Some(draft.end_date);
        Self { end_date: end, deadline: end, ..Self::base(draft) }
    }
}

#[async_trait]
impl TaskGateway for TaskApiClient {
    async fn create_task(&self, draft: &TaskDraft) -> Result<ServerTask> {
        let body = TaskRequestBody::for_create(draft);
        debug!(title = %draft.title, "creating task");
        let request = self.http.request(Method::POST, self.url("/tasks")).json(&body);
        let response = require_success(self.http.send(request).await?).await?;
        parse_json(response).await
    }

    async fn update_task(&self, task_id: i64, draft: &TaskDraft) -> Result<ServerTask> {
        let body = TaskRequestBody::for_update(draft);
        debug!(task_id, "updating task");
        let request =
            self.http.request(Method::PUT, self.url(&format!("/tasks/{task_id}"))).json(&body);
        let response = require_success(self.http.send(request).await?).await?;
        parse_json(response).await
    }

    async fn delete_task(&self, task_id: i64) -> Result<()> {
        debug!(task_id, "deleting task");
        let request = self.http.request(Method::DELETE, self.url(&format!("/tasks/{task_id}")));
        require_success(self.http.send(request).await?).await?;
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<ServerTask>> {
        let request = self.http.request(Method::GET, self.url("/tasks"));
        let response = require_success(self.http.send(request).await?).await?;
        let list: TaskList = parse_json(response).await?;
        Ok(list.tasks)
    }

    async fn import_calendar(&self, file_name: &str, ics: Vec<u8>) -> Result<ImportSummary> {
        let part = Part::bytes(ics)
            .file_name(file_name.to_string())
            .mime_str("text/calendar")
            .map_err(network_error)?;
        let form = Form::new().part("calendar", part);
        let request = self.http.request(Method::POST, self.url("/tasks/import")).multipart(form);
        let response = require_success(self.http.send(request).await?).await?;
        parse_json(response).await
    }
}

/// Factory binding [`TaskApiClient`]s to backend URLs at resolution time.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandaloneTaskFactory;

impl TaskGatewayFactory for StandaloneTaskFactory {
    fn task_gateway(&self, api_base_url: &str) -> Result<Arc<dyn TaskGateway>> {
        Ok(Arc::new(TaskApiClient::new(api_base_url)?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use flowcal_domain::WidgetError;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn draft_without_end() -> TaskDraft {
        TaskDraft::new("Quarterly review", Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
    }

    fn draft_with_end() -> TaskDraft {
        let mut draft = draft_without_end();
        draft.end_date = Some(Utc.with_ymd_and_hms(2025, 3, 2, 18, 0, 0).unwrap());
        draft
    }

    fn created_task_json() -> Value {
        json!({
            "id": 17,
            "title": "Quarterly review",
            "status": "todo",
            "start_date": "2025-03-01T09:00:00Z",
            "priority": "medium"
        })
    }

    async fn recorded_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.expect("requests recorded");
        serde_json::from_slice(&requests[0].body).expect("json body")
    }

    #[tokio::test]
    async fn create_without_end_date_omits_deadline_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created_task_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        let task = client.create_task(&draft_without_end()).await.unwrap();
        assert_eq!(task.id, 17);

        let body = recorded_body(&server).await;
        assert_eq!(body["status"], "todo");
        assert_eq!(body["priority"], "medium");
        assert_eq!(body["assignee"], "");
        assert!(body.get("end_date").is_none());
        assert!(body.get("deadline").is_none());
    }

    #[tokio::test]
    async fn create_with_end_date_sends_both_deadline_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created_task_json()))
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        client.create_task(&draft_with_end()).await.unwrap();

        let body = recorded_body(&server).await;
        assert!(body["end_date"].is_string());
        assert_eq!(body["end_date"], body["deadline"]);
    }

    #[tokio::test]
    async fn update_without_end_date_clears_the_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/tasks/17"))
            .respond_with(ResponseTemplate::new(200).set_body_json(created_task_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        client.update_task(17, &draft_without_end()).await.unwrap();

        let body = recorded_body(&server).await;
        // Keys present with explicit nulls, unlike create which omits them.
        assert!(body["end_date"].is_null());
        assert!(body["deadline"].is_null());
        assert!(body.as_object().unwrap().contains_key("end_date"));
        assert!(body.as_object().unwrap().contains_key("deadline"));
    }

    #[tokio::test]
    async fn non_success_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        let error = client.create_task(&draft_without_end()).await.unwrap_err();
        match error {
            WidgetError::Request { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "backend exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn delete_targets_the_task_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        client.delete_task(9).await.unwrap();
    }

    #[tokio::test]
    async fn list_tasks_unwraps_the_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tasks": [created_task_json()]})),
            )
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        let tasks = client.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Quarterly review");
    }

    #[tokio::test]
    async fn import_reports_the_imported_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks/import"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"imported": 12})))
            .mount(&server)
            .await;

        let client = TaskApiClient::new(server.uri()).unwrap();
        let summary = client
            .import_calendar("team.ics", b"BEGIN:VCALENDAR\nEND:VCALENDAR\n".to_vec())
            .await
            .unwrap();
        assert_eq!(summary.imported, 12);
    }
}
