//! Best-effort AI advice: the "suggested next action" card, daily insights and
//! new-task hints. Nothing here ever fails the caller; any problem falls back to
//! a locally computed answer or to no advice at all.

use std::sync::Arc;

use chrono::NaiveDate;
use db::models::{
    ai_feedback::{AiFeedback, FeedbackVote},
    project::Project,
    route::{Link, Route},
    task::Task,
    user::User,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};
use ts_rs::TS;
use utils::date::today;

use super::{
    config::AiConfig,
    gateway::{EntityGateway, GatewayError},
    gemini_api::{CompletionClient, GeminiApiClient, GeminiApiError},
};

/// Down-votes on prioritisation cards before advice switches to the gentler variant.
const PRIORITISATION_DISLIKE_THRESHOLD: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct SuggestionAction {
    pub label: String,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct AiSuggestion {
    pub title: String,
    pub reason: String,
    pub action: SuggestionAction,
}

impl AiSuggestion {
    fn for_task(task: &Task, clarify: bool) -> Self {
        let link = Link::in_project(&task.project_id, Route::task_detail(&task.id));
        if clarify {
            Self {
                title: "Clarify Overdue Task".to_string(),
                reason: format!(
                    "Task \"{}\" is overdue. Adding a comment or photo might help clarify next steps.",
                    task.title
                ),
                action: SuggestionAction {
                    label: "View & Add Details".to_string(),
                    link,
                },
            }
        } else {
            Self {
                title: "Address Overdue Task".to_string(),
                reason: format!("Task \"{}\" is overdue. Please review it.", task.title),
                action: SuggestionAction {
                    label: "View Task".to_string(),
                    link,
                },
            }
        }
    }

    fn is_prioritisation(title: &str) -> bool {
        title.contains("Overdue Task") || title.contains("urgent action")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Risk,
    Alert,
    Tip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct AiInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Weather {
    pub temp: i32,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestions {
    pub suggested_assignee_ids: Vec<String>,
    pub suggested_due_date: NaiveDate,
    pub photos_recommended: bool,
}

#[derive(Clone)]
pub struct AdvisoryService {
    gateway: EntityGateway,
    client: Option<Arc<dyn CompletionClient>>,
}

impl std::fmt::Debug for AdvisoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryService")
            .field("gateway", &self.gateway)
            .field("ai_enabled", &self.client.is_some())
            .finish()
    }
}

impl AdvisoryService {
    pub fn new(gateway: EntityGateway, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { gateway, client }
    }

    /// Uses Gemini when a key is configured, otherwise local fallbacks only.
    pub fn from_config(gateway: EntityGateway, config: &AiConfig) -> Self {
        let client = match GeminiApiClient::from_config(config) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn CompletionClient>),
            Err(e) => {
                warn!(error = %e, "AI advisory disabled, using local fallbacks");
                None
            }
        };
        Self::new(gateway, client)
    }

    pub fn fallback_only(gateway: EntityGateway) -> Self {
        Self::new(gateway, None)
    }

    async fn ask<T: serde::de::DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Option<Value>,
    ) -> Result<Option<T>, GeminiApiError> {
        let Some(client) = &self.client else {
            return Ok(None);
        };
        let value = client.generate_json(prompt, schema).await?;
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| GeminiApiError::Serde(e.to_string()))
    }

    async fn dislikes_prioritisation(&self, user: &User) -> bool {
        match self.gateway.fetch_ai_feedback_for_user(&user.id).await {
            Ok(history) => {
                history
                    .iter()
                    .filter(|f| {
                        f.feedback == FeedbackVote::Down
                            && AiSuggestion::is_prioritisation(&f.suggestion_title)
                    })
                    .count()
                    > PRIORITISATION_DISLIKE_THRESHOLD
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "could not read feedback history");
                false
            }
        }
    }

    /// At most one card, about the user's most overdue open task. `None` when nothing is overdue.
    pub async fn suggest_next_action(&self, user: &User) -> Option<AiSuggestion> {
        let tasks = match self.gateway.fetch_tasks_for_user(user).await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "could not load tasks for suggestion");
                return None;
            }
        };
        let today = today();
        let Some(task) = tasks
            .into_iter()
            .filter(|t| t.is_overdue(today))
            .min_by_key(|t| t.due_date)
        else {
            debug!(user_id = %user.id, "nothing overdue, no suggestion");
            return None;
        };

        let clarify = self.dislikes_prioritisation(user).await;
        let prompt = next_action_prompt(user, &task, clarify);
        match self.ask::<AiSuggestion>(&prompt, None).await {
            Ok(Some(suggestion)) => Some(suggestion),
            Ok(None) => Some(AiSuggestion::for_task(&task, clarify)),
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "AI suggestion failed, using fallback");
                Some(AiSuggestion::for_task(&task, clarify))
            }
        }
    }

    /// Two or three cards about today's work. Empty on no tasks or any failure.
    pub async fn daily_insights(&self, tasks: &[Task], project: &Project, weather: &Weather) -> Vec<AiInsight> {
        if tasks.is_empty() {
            return Vec::new();
        }
        let prompt = format!(
            "Analyze the user's tasks for the day and provide helpful insights. Consider the project context and weather.\n\
             Project: {} - {}\n\
             Weather: {}\n\
             Tasks: {}\n\n\
             Generate 2-3 insights as a JSON array of objects with keys \"type\" (\"risk\" | \"alert\" | \"tip\"), \"title\" and \"message\".\n\
             Focus on safety, efficiency, and potential blockers. For example, if it's raining and there's outdoor electrical work, that's a risk. \
             If two tasks are in the same location, suggest doing them together.",
            project.name,
            project.description,
            to_json(weather),
            to_json(tasks),
        );
        match self.ask::<Vec<AiInsight>>(&prompt, None).await {
            Ok(insights) => insights.unwrap_or_default(),
            Err(e) => {
                warn!(project_id = %project.id, error = %e, "AI insights failed");
                Vec::new()
            }
        }
    }

    /// Assignee, due date and photo hints for a task being drafted.
    pub async fn suggest_task_details(&self, description: &str, users: &[User]) -> Option<TaskSuggestions> {
        if description.trim().is_empty() {
            return None;
        }
        let profiles: Vec<Value> = users
            .iter()
            .map(|u| json!({ "id": u.id, "name": u.name, "role": u.role }))
            .collect();
        let prompt = format!(
            "Based on the task description for a construction project, provide suggestions for assigning and scheduling. The current date is {}.\n\n\
             Task Description: \"{}\"\n\n\
             Users available for assignment: {}\n\n\
             1. 'suggestedAssigneeIds': up to 2 suitable user IDs, most relevant first. Hands-on work suits 'operative' roles, coordination and inspection suit 'supervisor' roles. Empty if no one fits.\n\
             2. 'suggestedDueDate': a future date in YYYY-MM-DD format sized to the work.\n\
             3. 'photosRecommended': true for physical work worth documenting, false for administrative tasks.\n\n\
             Return a single JSON object with the specified keys.",
            today(),
            description.trim(),
            Value::Array(profiles),
        );
        match self.ask::<TaskSuggestions>(&prompt, Some(task_suggestion_schema())).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(error = %e, "AI task suggestion failed");
                None
            }
        }
    }

    pub async fn submit_feedback(
        &self,
        suggestion: &AiSuggestion,
        vote: FeedbackVote,
        user: &User,
    ) -> Result<AiFeedback, GatewayError> {
        self.gateway.submit_ai_feedback(suggestion, vote, user).await
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn next_action_prompt(user: &User, task: &Task, clarify: bool) -> String {
    let template = AiSuggestion::for_task(task, clarify);
    let intro = if clarify {
        "A user has an overdue task but seems to dislike direct reminders about prioritization. \
         Instead of just telling them to do the task, suggest an action that helps them clarify or get started, \
         such as adding a comment asking for clarification or a photo of the current state."
    } else {
        "A user has an overdue task. Create a suggestion to help them address it."
    };
    format!(
        "{intro}\nUser: {}\nMost Urgent Overdue Task: {}\n\nRespond in this JSON format, keeping the action link as given:\n{}",
        to_json(user),
        to_json(task),
        to_json(&template),
    )
}

fn task_suggestion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedAssigneeIds": {
                "type": "ARRAY",
                "items": { "type": "STRING", "description": "User ID of a suggested assignee" }
            },
            "suggestedDueDate": {
                "type": "STRING",
                "description": "The estimated due date in YYYY-MM-DD format."
            },
            "photosRecommended": {
                "type": "BOOLEAN",
                "description": "True if photos are recommended for this task."
            }
        },
        "required": ["suggestedAssigneeIds", "suggestedDueDate", "photosRecommended"]
    })
}
