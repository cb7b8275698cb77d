use async_trait::async_trait;
use serde_json::json;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::model::{TaskId, TaskPage, TaskStatus};
use crate::view::{TaskQuery, TaskStore};

#[derive(Debug, Clone)]
pub struct TasksService {
    client: ApiClient,
}

impl TasksService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        let mut params = Vec::new();
        if let Some(date) = query.filter_date {
            params.push(("filter_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        let page: TaskPage = self.client.get_json("/tasks", &params).await?;
        tracing::debug!(count = page.items.len(), total = page.counts.total, "tasks listed");
        Ok(page)
    }

    pub async fn update_status(&self, id: TaskId, status: TaskStatus) -> ApiResult<()> {
        self.client
            .put(&format!("/tasks/{id}"), &json!({ "status": status }))
            .await
    }

    pub async fn delete(&self, id: TaskId) -> ApiResult<()> {
        self.client.delete(&format!("/tasks/{id}")).await
    }
}

#[async_trait]
impl TaskStore for TasksService {
    async fn list(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        TasksService::list(self, query).await
    }

    async fn update_status(&self, id: TaskId, status: TaskStatus) -> ApiResult<()> {
        TasksService::update_status(self, id, status).await
    }

    async fn delete(&self, id: TaskId) -> ApiResult<()> {
        TasksService::delete(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> TasksService {
        let client = ApiClient::new(server.uri(), Some(Session::new("tok"))).unwrap();
        TasksService::new(client)
    }

    fn task_json(id: i64, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Task {id}"),
            "description": "from chat",
            "due_date": "2025-03-14T09:30:00Z",
            "status": status,
            "confidence_score": 0.7,
            "severity": "low",
            "origin_provider": "slack",
            "origin_integration_id": 2,
            "user_id": 1,
            "created_at": "2025-03-10T08:00:00Z",
            "timeline_events": [],
            "message_links": []
        })
    }

    #[tokio::test]
    async fn list_sends_filter_date_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(query_param("filter_date", "2025-03-14"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [task_json(1, "pending"), task_json(2, "completed")],
                "total": 9, "all_tasks": 9, "todays_task": 2, "later_tasks": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = TaskQuery {
            filter_date: NaiveDate::from_ymd_opt(2025, 3, 14),
            limit: Some(3),
        };
        let page = service(&server).list(&query).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].status, TaskStatus::Completed);
        assert_eq!(page.counts.todays_task, 2);
    }

    #[tokio::test]
    async fn list_without_filters_sends_no_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        service(&server).list(&TaskQuery::default()).await.unwrap();
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn update_status_puts_lowercase_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/tasks/5"))
            .and(body_json(json!({ "status": "completed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(5, "completed")))
            .expect(1)
            .mount(&server)
            .await;

        service(&server)
            .update_status(5, TaskStatus::Completed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_propagates_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/8"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = service(&server).delete(8).await.unwrap_err();
        assert!(matches!(err, crate::ApiError::Status { status: 500, .. }));
    }
}
