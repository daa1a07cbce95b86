//! Role-based visibility and mutation rights.
//!
//! Every visibility and permission question in the app is answered here: menu,
//! sidebar, tool catalogues and gateway mutations all share the same rule.

use db::{
    models::{
        route::Screen,
        user::{Role, User},
    },
    store::EntityKind,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("permission denied: {role} may not modify {kind}")]
pub struct PermissionError {
    pub role: Role,
    pub kind: EntityKind,
}

/// Anything carrying a list of roles allowed to see it.
pub trait RoleGated {
    fn roles(&self) -> &[Role];
}

/// `super_admin` sees every item, including ones with an empty role list.
pub fn is_visible<T: RoleGated + ?Sized>(item: &T, role: Role) -> bool {
    role.is_super_admin() || item.roles().contains(&role)
}

const EVERYONE: &[Role] = &[Role::CompanyAdmin, Role::Supervisor, Role::Operative];
const MANAGERS: &[Role] = &[Role::CompanyAdmin, Role::Supervisor];
const ADMINS: &[Role] = &[Role::CompanyAdmin];

/// Roles allowed to create or edit tasks, RFIs, punch-list closures, drawings and daywork sheets.
pub const EDITORS: &[Role] = MANAGERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub screen: Option<Screen>,
    pub roles: &'static [Role],
    pub children: &'static [MenuItem],
}

impl RoleGated for MenuItem {
    fn roles(&self) -> &[Role] {
        self.roles
    }
}

const fn module(label: &'static str, screen: Screen, roles: &'static [Role]) -> MenuItem {
    MenuItem {
        label,
        screen: Some(screen),
        roles,
        children: &[],
    }
}

pub static MENU_ITEMS: &[MenuItem] = &[
    module("Accounting", Screen::Accounting, ADMINS),
    module("AI Tools", Screen::AiTools, MANAGERS),
    MenuItem {
        label: "Document Management",
        screen: None,
        roles: EVERYONE,
        children: &[
            module("All Documents", Screen::DocumentManagement, EVERYONE),
            module("Drawings", Screen::Drawings, EVERYONE),
            module("Photo Gallery", Screen::Photos, EVERYONE),
            module("Reports", Screen::Documents, MANAGERS),
        ],
    },
    module("Time Tracking", Screen::TimeTracking, EVERYONE),
    module("Project Operations", Screen::ProjectOperations, MANAGERS),
    module("Financial Management", Screen::FinancialManagement, ADMINS),
    module("Business Development", Screen::BusinessDevelopment, ADMINS),
];

/// A menu entry after role filtering; `children` holds only the visible ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleMenuItem {
    pub label: &'static str,
    pub screen: Option<Screen>,
    pub children: Vec<VisibleMenuItem>,
}

/// Each level is filtered on its own, so a visible parent may end up with no children.
pub fn visible_menu(role: Role) -> Vec<VisibleMenuItem> {
    filter_menu(MENU_ITEMS, role)
}

fn filter_menu(items: &[MenuItem], role: Role) -> Vec<VisibleMenuItem> {
    items
        .iter()
        .filter(|item| is_visible(*item, role))
        .map(|item| VisibleMenuItem {
            label: item.label,
            screen: item.screen,
            children: filter_menu(item.children, role),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub label: &'static str,
    pub screen: Screen,
    #[serde(skip)]
    pub roles: &'static [Role],
}

impl RoleGated for SidebarItem {
    fn roles(&self) -> &[Role] {
        self.roles
    }
}

pub static SIDEBAR_ITEMS: &[SidebarItem] = &[
    SidebarItem { label: "My Projects", screen: Screen::Projects, roles: EVERYONE },
    SidebarItem { label: "My Day", screen: Screen::MyDay, roles: EVERYONE },
    SidebarItem { label: "Tasks", screen: Screen::Tasks, roles: EVERYONE },
    SidebarItem { label: "Daily Logs", screen: Screen::DailyLog, roles: EVERYONE },
    SidebarItem { label: "Photos", screen: Screen::Photos, roles: EVERYONE },
    SidebarItem { label: "RFIs", screen: Screen::Rfis, roles: MANAGERS },
    SidebarItem { label: "Punch List", screen: Screen::PunchList, roles: MANAGERS },
    SidebarItem { label: "Drawings", screen: Screen::Drawings, roles: MANAGERS },
    SidebarItem { label: "Daywork Sheets", screen: Screen::DayworkSheets, roles: MANAGERS },
    SidebarItem { label: "Documents", screen: Screen::Documents, roles: ADMINS },
];

/// Project view lists the project-scoped entries; global view only "My Projects".
pub fn sidebar(role: Role, in_project: bool) -> Vec<SidebarItem> {
    SIDEBAR_ITEMS
        .iter()
        .filter(|item| (item.screen == Screen::Projects) != in_project)
        .filter(|item| is_visible(*item, role))
        .copied()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub title: &'static str,
    pub description: &'static str,
    pub screen: Screen,
    #[serde(skip)]
    pub roles: &'static [Role],
    /// Opening the tool needs a project chosen first.
    pub requires_project_context: bool,
}

impl RoleGated for ToolDefinition {
    fn roles(&self) -> &[Role] {
        self.roles
    }
}

const fn tool(
    title: &'static str,
    description: &'static str,
    screen: Screen,
    roles: &'static [Role],
) -> ToolDefinition {
    ToolDefinition {
        title,
        description,
        screen,
        roles,
        requires_project_context: false,
    }
}

const fn project_tool(
    title: &'static str,
    description: &'static str,
    screen: Screen,
    roles: &'static [Role],
) -> ToolDefinition {
    ToolDefinition {
        requires_project_context: true,
        ..tool(title, description, screen, roles)
    }
}

pub static ACCOUNTING_TOOLS: &[ToolDefinition] = &[
    tool("Invoicing", "Create and manage client invoices.", Screen::PlaceholderTool, ADMINS),
    tool("Chart of Accounts", "Manage your company's financial accounts.", Screen::PlaceholderTool, ADMINS),
    tool("Tax Preparation", "AI-assisted tax document preparation.", Screen::PlaceholderTool, ADMINS),
];

pub static AI_TOOLS: &[ToolDefinition] = &[
    tool("Risk Assessment AI", "Analyze project data to identify potential risks.", Screen::PlaceholderTool, MANAGERS),
    tool("Procurement AI Agent", "Automated material and subcontractor sourcing.", Screen::PlaceholderTool, MANAGERS),
    tool("Compliance Bot", "Monitor documents for regulatory compliance.", Screen::PlaceholderTool, MANAGERS),
    tool("HR AI Agent", "Manage training, qualifications, and certifications.", Screen::PlaceholderTool, ADMINS),
];

pub static DOCUMENT_MANAGEMENT_TOOLS: &[ToolDefinition] = &[
    project_tool("Drawing Sets", "View and manage all project drawings.", Screen::Drawings, EVERYONE),
    project_tool("Photo Galleries", "Browse and upload site photos.", Screen::Photos, EVERYONE),
    project_tool("Official Documents", "Store contracts, permits, and reports.", Screen::Documents, MANAGERS),
];

pub static TIME_TRACKING_TOOLS: &[ToolDefinition] = &[
    tool("Live Time Entry", "Clock in and out for tasks.", Screen::PlaceholderTool, EVERYONE),
    tool("Timesheet Reports", "Generate and review timesheets.", Screen::PlaceholderTool, MANAGERS),
];

pub static PROJECT_OPERATIONS_TOOLS: &[ToolDefinition] = &[
    tool("Risk Assessments (RAMS)", "Create and manage Risk Assessment Method Statements.", Screen::PlaceholderTool, MANAGERS),
    tool("Training Matrix", "Track employee qualifications and training.", Screen::PlaceholderTool, ADMINS),
];

pub static FINANCIAL_MANAGEMENT_TOOLS: &[ToolDefinition] = &[
    tool("Company Payroll", "Process payroll for all employees.", Screen::PlaceholderTool, ADMINS),
    tool("Project Budgets", "Track budgets and spending per project.", Screen::PlaceholderTool, MANAGERS),
];

pub static BUSINESS_DEVELOPMENT_TOOLS: &[ToolDefinition] = &[
    tool("CRM", "Manage client relationships and leads.", Screen::PlaceholderTool, ADMINS),
    tool("Procurement Hub", "Manage suppliers and procurement processes.", Screen::PlaceholderTool, MANAGERS),
];

/// Tool catalogue shown on a module screen.
pub fn catalogue(module: Screen) -> &'static [ToolDefinition] {
    match module {
        Screen::Accounting => ACCOUNTING_TOOLS,
        Screen::AiTools => AI_TOOLS,
        Screen::DocumentManagement => DOCUMENT_MANAGEMENT_TOOLS,
        Screen::TimeTracking => TIME_TRACKING_TOOLS,
        Screen::ProjectOperations => PROJECT_OPERATIONS_TOOLS,
        Screen::FinancialManagement => FINANCIAL_MANAGEMENT_TOOLS,
        Screen::BusinessDevelopment => BUSINESS_DEVELOPMENT_TOOLS,
        _ => &[],
    }
}

pub fn visible_tools(catalogue: &[ToolDefinition], role: Role) -> Vec<ToolDefinition> {
    catalogue
        .iter()
        .filter(|tool| is_visible(*tool, role))
        .copied()
        .collect()
}

/// A module is openable when some visible menu entry, at any level, targets it.
pub fn can_open_module(screen: Screen, role: Role) -> bool {
    fn targets(items: &[MenuItem], screen: Screen, role: Role) -> bool {
        items.iter().filter(|item| is_visible(*item, role)).any(|item| {
            item.screen == Some(screen) || targets(item.children, screen, role)
        })
    }
    targets(MENU_ITEMS, screen, role)
}

pub fn can_mutate(kind: EntityKind, role: Role, required: &[Role]) -> bool {
    let allowed = role.is_super_admin() || required.contains(&role);
    debug!(%kind, %role, allowed, "mutation check");
    allowed
}

pub fn require_mutation(
    kind: EntityKind,
    user: &User,
    required: &[Role],
) -> Result<(), PermissionError> {
    if can_mutate(kind, user.role, required) {
        Ok(())
    } else {
        Err(PermissionError {
            role: user.role,
            kind,
        })
    }
}

pub fn can_edit_task_status(role: Role) -> bool {
    can_mutate(EntityKind::Task, role, EDITORS)
}

pub fn can_answer_rfi(role: Role) -> bool {
    can_mutate(EntityKind::Rfi, role, EDITORS)
}

pub fn can_create_drawing(role: Role) -> bool {
    can_mutate(EntityKind::Drawing, role, EDITORS)
}

/// Dashboard stats, the activity feed and the projects overview.
pub fn sees_company_overview(role: Role) -> bool {
    role >= Role::Supervisor
}
