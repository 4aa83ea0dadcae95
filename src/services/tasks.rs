use std::cmp::Ordering;

use crate::api::{ApiError, TaskClient};
use crate::models::{NewTask, Task, TaskUpdate};

/// Counters shown on the dashboard. Pure function of the task set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage in `0.0..=100.0`; `0.0` for an empty set.
    pub progress: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let progress = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            total,
            completed,
            pending: total - completed,
            progress,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskOrder {
    /// Newest first.
    #[default]
    Created,
    /// Most urgent first.
    Priority,
    /// Earliest due date first, undated tasks last.
    DueDate,
}

impl std::str::FromStr for TaskOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(TaskOrder::Created),
            "priority" => Ok(TaskOrder::Priority),
            "due" | "due-date" => Ok(TaskOrder::DueDate),
            other => Err(format!("unknown order: {other}")),
        }
    }
}

pub fn sort_tasks(tasks: &mut [Task], order: TaskOrder) {
    match order {
        TaskOrder::Created => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        TaskOrder::Priority => tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        TaskOrder::DueDate => tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        }),
    }
}

/// Local view of the signed-in user's tasks, kept in step with the backend.
pub struct TaskBoard {
    client: TaskClient,
    user_id: i64,
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(client: TaskClient, user_id: i64) -> Self {
        Self {
            client,
            user_id,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    pub fn active(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    pub async fn refresh(&mut self) -> Result<&[Task], ApiError> {
        let tasks = self.client.list().await?;
        let user_id = self.user_id;
        self.tasks = tasks
            .into_iter()
            .filter(|t| {
                let owned = t.user_id == user_id;
                if !owned {
                    tracing::warn!(task_id = t.id, owner = t.user_id, "Dropping task owned by another user");
                }
                owned
            })
            .collect();
        Ok(&self.tasks)
    }

    pub async fn create(&mut self, task: &NewTask) -> Result<Task, ApiError> {
        let created = self.client.create(task).await?;
        self.upsert(created.clone());
        Ok(created)
    }

    pub async fn update(&mut self, id: i64, update: &TaskUpdate) -> Result<Task, ApiError> {
        match self.client.update(id, update).await {
            Ok(task) => {
                self.upsert(task.clone());
                Ok(task)
            }
            Err(e) => {
                if matches!(e, ApiError::NotFoundError(_)) {
                    self.tasks.retain(|t| t.id != id);
                }
                Err(e)
            }
        }
    }

    /// Flip the completion flag of a task already on the board.
    pub async fn toggle(&mut self, id: i64) -> Result<Task, ApiError> {
        let completed = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.completed)
            .ok_or_else(|| ApiError::NotFoundError(format!("Task {id} is not loaded")))?;
        self.update(id, &TaskUpdate::completed(!completed)).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        let result = self.client.delete(id).await;
        if result.is_ok() || matches!(result, Err(ApiError::NotFoundError(_))) {
            self.tasks.retain(|t| t.id != id);
        }
        result
    }

    fn upsert(&mut self, task: Task) {
        if task.user_id != self.user_id {
            tracing::warn!(task_id = task.id, "Ignoring task owned by another user");
            return;
        }
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskCategory, TaskPriority};
    use chrono::{Duration, NaiveDate, Utc};

    fn task(id: i64, completed: bool) -> Task {
        let now = Utc::now() + Duration::seconds(id);
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            completed,
            priority: TaskPriority::Medium,
            category: TaskCategory::Other,
            due_date: None,
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stats_empty_set() {
        let stats = TaskStats::from_tasks(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.progress, 0.0);
    }

    #[test]
    fn test_stats_invariants_hold_for_every_mix() {
        for total in 0..12usize {
            for done in 0..=total {
                let tasks: Vec<Task> = (0..total).map(|i| task(i as i64, i < done)).collect();
                let stats = TaskStats::from_tasks(&tasks);
                assert_eq!(stats.completed + stats.pending, stats.total);
                assert_eq!(stats.completed, done);
                assert!((0.0..=100.0).contains(&stats.progress));
            }
        }
    }

    #[test]
    fn test_stats_progress_value() {
        let tasks = vec![task(1, true), task(2, false), task(3, false), task(4, true)];
        assert_eq!(TaskStats::from_tasks(&tasks).progress, 50.0);
    }

    #[test]
    fn test_sort_by_priority_then_newest() {
        let mut tasks = vec![task(1, false), task(2, false), task(3, false)];
        tasks[0].priority = TaskPriority::Urgent;
        tasks[2].priority = TaskPriority::Low;
        sort_tasks(&mut tasks, TaskOrder::Priority);
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_by_due_date_puts_undated_last() {
        let mut tasks = vec![task(1, false), task(2, false), task(3, false)];
        tasks[1].due_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        tasks[2].due_date = NaiveDate::from_ymd_opt(2026, 2, 1);
        sort_tasks(&mut tasks, TaskOrder::DueDate);
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
