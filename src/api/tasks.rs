use super::error::ApiError;
use super::http::ApiClient;
use super::validate;
use crate::models::{NewTask, Task, TaskUpdate};

#[derive(Debug, Clone)]
pub struct TaskClient {
    api: ApiClient,
}

impl TaskClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All tasks of the signed-in user, in whatever order the backend returns.
    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        self.api.get("/tasks").await
    }

    pub async fn get(&self, id: i64) -> Result<Task, ApiError> {
        self.api.get(&format!("/tasks/{id}")).await
    }

    pub async fn create(&self, task: &NewTask) -> Result<Task, ApiError> {
        validate::new_task(task)?;
        let created: Task = self.api.post("/tasks", task).await?;
        tracing::debug!(task_id = created.id, "Task created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task, ApiError> {
        validate::task_update(update)?;
        self.api.patch(&format!("/tasks/{id}"), update).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete(&format!("/tasks/{id}")).await?;
        tracing::debug!(task_id = id, "Task deleted");
        Ok(())
    }
}
