//! Data behind the home dashboard: a short list of today's tasks and the first few
//! connected integrations.

use chrono::NaiveDate;

use super::query::{TaskFilter, TaskQuery};
use super::store::TaskStore;
use crate::model::{Integration, Task};
use crate::services::IntegrationsService;

pub const HOME_TASK_LIMIT: u32 = 3;
pub const HOME_INTEGRATION_LIMIT: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct HomeSnapshot {
    pub todays_tasks: Vec<Task>,
    pub integrations: Vec<Integration>,
}

pub struct HomeView;

impl HomeView {
    /// Loads both halves concurrently; a failing half is logged and left empty.
    pub async fn load<S>(
        tasks: &S,
        integrations: &IntegrationsService,
        today: NaiveDate,
    ) -> HomeSnapshot
    where
        S: TaskStore + ?Sized,
    {
        let query = TaskQuery::for_filter(TaskFilter::Today, today).with_limit(Some(HOME_TASK_LIMIT));
        let (task_result, integration_result) = tokio::join!(
            tasks.list(&query),
            integrations.list(Some(HOME_INTEGRATION_LIMIT))
        );

        let todays_tasks = match task_result {
            Ok(page) => page.items,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch tasks for home");
                Vec::new()
            }
        };
        let integrations = match integration_result {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch integrations for home");
                Vec::new()
            }
        };

        HomeSnapshot {
            todays_tasks,
            integrations,
        }
    }
}
