//! Screens and the typed routes that open them.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use ts_rs::TS;

/// Every renderable view in the app.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Screen {
    GlobalDashboard,
    Projects,
    ProjectHome,
    MyDay,
    Tasks,
    TaskDetail,
    NewTask,
    DailyLog,
    Photos,
    Rfis,
    RfiDetail,
    NewRfi,
    PunchList,
    PunchListItemDetail,
    NewPunchListItem,
    Drawings,
    Plans,
    DayworkSheets,
    DayworkSheetDetail,
    NewDayworkSheet,
    Documents,
    Delivery,
    // Modules
    Accounting,
    AiTools,
    DocumentManagement,
    TimeTracking,
    ProjectOperations,
    FinancialManagement,
    BusinessDevelopment,
    // Tools
    PlaceholderTool,
}

impl Screen {
    /// Global landing screens every signed-in role may open.
    pub fn is_landing(&self) -> bool {
        matches!(self, Self::GlobalDashboard | Self::Projects)
    }

    /// Noun used in prompts such as "Select a project for the new task".
    pub fn subject_noun(&self) -> String {
        let name = self.to_string();
        name.split('-').nth(1).unwrap_or(name.as_str()).to_string()
    }
}

/// A screen together with exactly the inputs it needs.
///
/// Serialises as `{"screen": "task-detail", "params": {"taskId": "task-4"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "screen", content = "params", rename_all = "kebab-case")]
pub enum Route {
    GlobalDashboard,
    Projects,
    ProjectHome,
    MyDay,
    Tasks,
    TaskDetail {
        #[serde(rename = "taskId")]
        task_id: String,
    },
    NewTask,
    DailyLog {
        #[serde(rename = "logId", default, skip_serializing_if = "Option::is_none")]
        log_id: Option<String>,
    },
    Photos,
    Rfis,
    RfiDetail {
        #[serde(rename = "rfiId")]
        rfi_id: String,
    },
    NewRfi,
    PunchList,
    PunchListItemDetail {
        #[serde(rename = "itemId")]
        item_id: String,
    },
    NewPunchListItem,
    Drawings,
    Plans {
        #[serde(rename = "drawingId", default, skip_serializing_if = "Option::is_none")]
        drawing_id: Option<String>,
    },
    DayworkSheets,
    DayworkSheetDetail {
        #[serde(rename = "sheetId")]
        sheet_id: String,
    },
    NewDayworkSheet,
    Documents,
    Delivery,
    Accounting,
    AiTools,
    DocumentManagement,
    TimeTracking,
    ProjectOperations,
    FinancialManagement,
    BusinessDevelopment,
    PlaceholderTool {
        title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("screen {0} needs parameters and cannot be opened bare")]
pub struct MissingParams(pub Screen);

impl Route {
    pub fn screen(&self) -> Screen {
        match self {
            Self::GlobalDashboard => Screen::GlobalDashboard,
            Self::Projects => Screen::Projects,
            Self::ProjectHome => Screen::ProjectHome,
            Self::MyDay => Screen::MyDay,
            Self::Tasks => Screen::Tasks,
            Self::TaskDetail { .. } => Screen::TaskDetail,
            Self::NewTask => Screen::NewTask,
            Self::DailyLog { .. } => Screen::DailyLog,
            Self::Photos => Screen::Photos,
            Self::Rfis => Screen::Rfis,
            Self::RfiDetail { .. } => Screen::RfiDetail,
            Self::NewRfi => Screen::NewRfi,
            Self::PunchList => Screen::PunchList,
            Self::PunchListItemDetail { .. } => Screen::PunchListItemDetail,
            Self::NewPunchListItem => Screen::NewPunchListItem,
            Self::Drawings => Screen::Drawings,
            Self::Plans { .. } => Screen::Plans,
            Self::DayworkSheets => Screen::DayworkSheets,
            Self::DayworkSheetDetail { .. } => Screen::DayworkSheetDetail,
            Self::NewDayworkSheet => Screen::NewDayworkSheet,
            Self::Documents => Screen::Documents,
            Self::Delivery => Screen::Delivery,
            Self::Accounting => Screen::Accounting,
            Self::AiTools => Screen::AiTools,
            Self::DocumentManagement => Screen::DocumentManagement,
            Self::TimeTracking => Screen::TimeTracking,
            Self::ProjectOperations => Screen::ProjectOperations,
            Self::FinancialManagement => Screen::FinancialManagement,
            Self::BusinessDevelopment => Screen::BusinessDevelopment,
            Self::PlaceholderTool { .. } => Screen::PlaceholderTool,
        }
    }

    pub fn task_detail(task_id: impl Into<String>) -> Self {
        Self::TaskDetail {
            task_id: task_id.into(),
        }
    }

    pub fn rfi_detail(rfi_id: impl Into<String>) -> Self {
        Self::RfiDetail {
            rfi_id: rfi_id.into(),
        }
    }

    pub fn punch_list_item_detail(item_id: impl Into<String>) -> Self {
        Self::PunchListItemDetail {
            item_id: item_id.into(),
        }
    }

    /// Route used when launching a tool card; placeholder tools carry their title.
    pub fn for_tool(screen: Screen, title: &str) -> Result<Self, MissingParams> {
        match screen {
            Screen::PlaceholderTool => Ok(Self::PlaceholderTool {
                title: title.to_string(),
            }),
            other => Self::try_from(other),
        }
    }
}

impl TryFrom<Screen> for Route {
    type Error = MissingParams;

    fn try_from(screen: Screen) -> Result<Self, Self::Error> {
        Ok(match screen {
            Screen::GlobalDashboard => Self::GlobalDashboard,
            Screen::Projects => Self::Projects,
            Screen::ProjectHome => Self::ProjectHome,
            Screen::MyDay => Self::MyDay,
            Screen::Tasks => Self::Tasks,
            Screen::NewTask => Self::NewTask,
            Screen::DailyLog => Self::DailyLog { log_id: None },
            Screen::Photos => Self::Photos,
            Screen::Rfis => Self::Rfis,
            Screen::NewRfi => Self::NewRfi,
            Screen::PunchList => Self::PunchList,
            Screen::NewPunchListItem => Self::NewPunchListItem,
            Screen::Drawings => Self::Drawings,
            Screen::Plans => Self::Plans { drawing_id: None },
            Screen::DayworkSheets => Self::DayworkSheets,
            Screen::NewDayworkSheet => Self::NewDayworkSheet,
            Screen::Documents => Self::Documents,
            Screen::Delivery => Self::Delivery,
            Screen::Accounting => Self::Accounting,
            Screen::AiTools => Self::AiTools,
            Screen::DocumentManagement => Self::DocumentManagement,
            Screen::TimeTracking => Self::TimeTracking,
            Screen::ProjectOperations => Self::ProjectOperations,
            Screen::FinancialManagement => Self::FinancialManagement,
            Screen::BusinessDevelopment => Self::BusinessDevelopment,
            Screen::TaskDetail
            | Screen::RfiDetail
            | Screen::PunchListItemDetail
            | Screen::DayworkSheetDetail
            | Screen::PlaceholderTool => return Err(MissingParams(screen)),
        })
    }
}

/// Deep-link target carried by notifications, activity events and AI suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Link {
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(flatten)]
    #[ts(flatten)]
    pub route: Route,
}

impl Link {
    pub fn in_project(project_id: impl Into<String>, route: Route) -> Self {
        Self {
            project_id: Some(project_id.into()),
            route,
        }
    }

    pub fn global(route: Route) -> Self {
        Self {
            project_id: None,
            route,
        }
    }
}
