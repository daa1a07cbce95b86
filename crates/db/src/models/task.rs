use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::{
    comment::{Attachment, Comment},
    user::{Role, User},
};
use crate::{
    DBService,
    store::{Entity, EntityKind, StoreError},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: Option<String>, // Display name of the assigned user
    #[serde(default)]
    pub target_roles: Vec<Role>, // Everyone holding one of these roles sees the task
    pub due_date: NaiveDate,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
    pub target_roles: Vec<Role>,
    pub due_date: NaiveDate,
    pub attachments: Vec<Attachment>,
}

impl CreateTask {
    pub fn assigned_to(
        project_id: impl Into<String>,
        title: impl Into<String>,
        assignee: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            description: String::new(),
            status: Some(TaskStatus::Todo),
            assignee: Some(assignee.into()),
            target_roles: Vec::new(),
            due_date,
            attachments: Vec::new(),
        }
    }

    /// Task addressed to every holder of the given roles instead of one person.
    pub fn for_roles(
        project_id: impl Into<String>,
        title: impl Into<String>,
        target_roles: Vec<Role>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            description: String::new(),
            status: Some(TaskStatus::Todo),
            assignee: None,
            target_roles,
            due_date,
            attachments: Vec::new(),
        }
    }
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Done
    }

    /// Open and due on or before `today`; a task due today is already late.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date <= today
    }

    /// Assigned to the user by name, or targeted at the user's role.
    pub fn concerns(&self, user: &User) -> bool {
        self.assignee.as_deref() == Some(user.name.as_str()) || self.target_roles.contains(&user.role)
    }

    pub async fn find_by_project_id(db: &DBService, project_id: &str) -> Result<Vec<Self>, StoreError> {
        db.find_by_scope(project_id).await
    }

    pub async fn find_for_user(db: &DBService, user: &User) -> Result<Vec<Self>, StoreError> {
        db.find_where(|task: &Task| task.concerns(user)).await
    }

    pub async fn create(db: &DBService, data: &CreateTask, task_id: String) -> Result<Self, StoreError> {
        let task = Task {
            id: task_id,
            project_id: data.project_id.clone(),
            title: data.title.clone(),
            description: data.description.clone(),
            status: data.status.unwrap_or_default(),
            assignee: data.assignee.clone(),
            target_roles: data.target_roles.clone(),
            due_date: data.due_date,
            attachments: data.attachments.clone(),
            comments: Vec::new(),
        };
        db.insert(&task).await?;
        Ok(task)
    }
}
