use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{BrainResult, StoreError},
    store::{BrainStore, TaskFilter},
    task::{self, BoardColumn, NewProject, NewTask, Project, Task, TaskListView, TaskStatus},
};

/// Task snapshot with list and board groupings.
pub struct TaskBoard {
    store: Arc<dyn BrainStore>,
    owner: Uuid,
    tasks: Vec<Task>,
    projects: Vec<Project>,
}

impl TaskBoard {
    pub fn new(store: Arc<dyn BrainStore>, owner: Uuid) -> Self {
        Self {
            store,
            owner,
            tasks: Vec::new(),
            projects: Vec::new(),
        }
    }

    pub fn load(&mut self) -> BrainResult<()> {
        let tasks = self.store.list_tasks(self.owner, &TaskFilter::default())?;
        let projects = self.store.list_projects(self.owner)?;
        tracing::info!(tasks = tasks.len(), projects = projects.len(), "loaded tasks");
        self.tasks = tasks;
        self.projects = projects;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    pub fn add_task(&mut self, task: NewTask) -> BrainResult<Task> {
        let row = self
            .store
            .insert_task(self.owner, task)
            .inspect_err(|err| tracing::warn!(%err, "unable to add task"))?;
        self.tasks.push(row.clone());
        Ok(row)
    }

    #[instrument(skip(self, project), fields(name = %project.name))]
    pub fn add_project(&mut self, project: NewProject) -> BrainResult<Project> {
        let row = self
            .store
            .insert_project(self.owner, project)
            .inspect_err(|err| tracing::warn!(%err, "unable to add project"))?;
        self.projects.push(row.clone());
        Ok(row)
    }

    #[instrument(skip(self))]
    pub fn update_status(&mut self, task_id: Uuid, status: TaskStatus) -> BrainResult<Task> {
        let row = self
            .store
            .update_task_status(self.owner, task_id, status)
            .inspect_err(|err| tracing::warn!(%err, "unable to update task status"))?;
        match self.tasks.iter_mut().find(|task| task.id == row.id) {
            Some(slot) => *slot = row.clone(),
            None => self.tasks.push(row.clone()),
        }
        Ok(row)
    }

    /// Checkbox behaviour: `done` becomes `todo`, anything else becomes `done`.
    pub fn toggle_done(&mut self, task_id: Uuid) -> BrainResult<Task> {
        let current = self
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .map(|task| task.status)
            .ok_or_else(|| StoreError::not_found("task", task_id))?;
        self.update_status(task_id, current.toggled())
    }

    pub fn list_view<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskListView {
        task::group_for_list(&self.tasks, now)
    }

    pub fn board_view<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<BoardColumn> {
        task::group_for_board(&self.tasks, now)
    }
}
