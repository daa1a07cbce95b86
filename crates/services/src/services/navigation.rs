//! Navigation stack for one session.
//!
//! The stack is never empty: it always has a root frame, with drill-down
//! frames above it. Project resolution is two-phase (`request_*` then
//! `complete`) so a slow lookup that finishes after the user has moved on
//! is discarded instead of yanking the stack back.

use std::fmt;

use async_trait::async_trait;
use db::models::{
    project::Project,
    route::{Link, Route, Screen},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("project {0} not found")]
    ProjectNotFound(String),
}

/// Looks up projects that are not in the session cache.
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn fetch_project(&self, project_id: &str) -> Option<Project>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationFrame {
    pub route: Route,
    pub active_project: Option<Project>,
}

impl NavigationFrame {
    pub fn global(route: Route) -> Self {
        Self {
            route,
            active_project: None,
        }
    }

    pub fn in_project(route: Route, project: Project) -> Self {
        Self {
            route,
            active_project: Some(project),
        }
    }

    pub fn screen(&self) -> Screen {
        self.route.screen()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.active_project.as_ref().map(|p| p.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    /// Replace the stack with the project's home screen.
    SelectProject,
    /// Replace the stack with project home followed by this route.
    DeepLink(Route),
}

/// A project lookup in flight. Only the most recently issued one can still apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    token: u64,
    pub project_id: String,
    pub intent: NavigationIntent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkRequest {
    /// Handled synchronously from the cache or as a same-scope push.
    Applied,
    Pending(PendingNavigation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Applied,
    /// Another navigation happened while the project was being resolved.
    Stale,
}

/// Callback for the project selector. May return a follow-up link to deep-link into.
pub type OnProjectSelected = Box<dyn FnOnce(&str) -> Option<Link> + Send>;

struct ProjectSelector {
    title: String,
    on_select: OnProjectSelected,
}

impl fmt::Debug for ProjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectSelector")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct NavigationController {
    root: NavigationFrame,
    above: Vec<NavigationFrame>,
    projects: Vec<Project>,
    generation: u64,
    selector: Option<ProjectSelector>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationController {
    pub fn new() -> Self {
        Self {
            root: NavigationFrame::global(Route::GlobalDashboard),
            above: Vec::new(),
            projects: Vec::new(),
            generation: 0,
            selector: None,
        }
    }

    pub fn current(&self) -> &NavigationFrame {
        self.above.last().unwrap_or(&self.root)
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.current().active_project.as_ref()
    }

    /// Frames from root to top.
    pub fn frames(&self) -> impl Iterator<Item = &NavigationFrame> {
        std::iter::once(&self.root).chain(self.above.iter())
    }

    pub fn depth(&self) -> usize {
        self.above.len() + 1
    }

    pub fn breadcrumbs(&self) -> Vec<Screen> {
        self.frames().map(NavigationFrame::screen).collect()
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        debug!(count = projects.len(), "cached session projects");
        self.projects = projects;
    }

    pub fn cached_project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    fn replace(&mut self, root: NavigationFrame, above: Vec<NavigationFrame>) {
        self.root = root;
        self.above = above;
        self.generation += 1;
        debug!(breadcrumbs = ?self.breadcrumbs(), "navigation stack replaced");
    }

    /// Drill down, keeping the current project scope.
    pub fn push(&mut self, route: Route) {
        let frame = NavigationFrame {
            route,
            active_project: self.current().active_project.clone(),
        };
        debug!(screen = %frame.screen(), depth = self.depth() + 1, "push");
        self.above.push(frame);
        self.generation += 1;
    }

    /// Switch to a top-level module in global scope, dropping all history.
    pub fn reset_to_module(&mut self, route: Route) {
        self.replace(NavigationFrame::global(route), Vec::new());
    }

    /// No-op on a single-frame stack.
    pub fn go_back(&mut self) {
        if let Some(frame) = self.above.pop() {
            debug!(screen = %frame.screen(), "back");
            self.generation += 1;
        }
    }

    pub fn pop(&mut self) {
        self.go_back();
    }

    /// Collapse to `[root, project-home]` inside a project, else back to the dashboard.
    pub fn go_home(&mut self) {
        match self.current().active_project.clone() {
            Some(project) => {
                let root = self.root.clone();
                self.replace(root, vec![NavigationFrame::in_project(Route::ProjectHome, project)]);
            }
            None => self.reset_to_module(Route::GlobalDashboard),
        }
    }

    fn issue(&mut self, project_id: &str, intent: NavigationIntent) -> PendingNavigation {
        self.generation += 1;
        PendingNavigation {
            token: self.generation,
            project_id: project_id.to_string(),
            intent,
        }
    }

    /// Start resolving a project to open its home screen. Supersedes any earlier request.
    pub fn request_select_project(&mut self, project_id: &str) -> PendingNavigation {
        self.issue(project_id, NavigationIntent::SelectProject)
    }

    /// A `None` project is a same-scope push. A cached project applies at once.
    pub fn request_deep_link(&mut self, project_id: Option<&str>, route: Route) -> DeepLinkRequest {
        let Some(project_id) = project_id else {
            self.push(route);
            return DeepLinkRequest::Applied;
        };
        match self.cached_project(project_id).cloned() {
            Some(project) => {
                self.apply(NavigationIntent::DeepLink(route), project);
                DeepLinkRequest::Applied
            }
            None => DeepLinkRequest::Pending(self.issue(project_id, NavigationIntent::DeepLink(route))),
        }
    }

    /// Finish a pending lookup. Stale requests leave the stack untouched, as does a missing project.
    pub fn complete(
        &mut self,
        pending: PendingNavigation,
        resolved: Option<Project>,
    ) -> Result<NavigationOutcome, NavigationError> {
        if pending.token != self.generation {
            warn!(
                project_id = %pending.project_id,
                token = pending.token,
                current = self.generation,
                "discarding stale project navigation"
            );
            return Ok(NavigationOutcome::Stale);
        }
        let Some(project) = resolved else {
            warn!(project_id = %pending.project_id, "project not found, staying put");
            return Err(NavigationError::ProjectNotFound(pending.project_id));
        };
        if self.cached_project(&project.id).is_none() {
            self.projects.push(project.clone());
        }
        self.apply(pending.intent, project);
        Ok(NavigationOutcome::Applied)
    }

    fn apply(&mut self, intent: NavigationIntent, project: Project) {
        let home = NavigationFrame::in_project(Route::ProjectHome, project.clone());
        match intent {
            NavigationIntent::SelectProject => self.replace(home, Vec::new()),
            NavigationIntent::DeepLink(route) => {
                self.replace(home, vec![NavigationFrame::in_project(route, project)])
            }
        }
    }

    pub async fn select_project<R: ProjectResolver + ?Sized>(
        &mut self,
        resolver: &R,
        project_id: &str,
    ) -> Result<NavigationOutcome, NavigationError> {
        let pending = self.request_select_project(project_id);
        let project = resolver.fetch_project(project_id).await;
        self.complete(pending, project)
    }

    pub async fn deep_link<R: ProjectResolver + ?Sized>(
        &mut self,
        resolver: &R,
        project_id: Option<&str>,
        route: Route,
    ) -> Result<NavigationOutcome, NavigationError> {
        match self.request_deep_link(project_id, route) {
            DeepLinkRequest::Applied => Ok(NavigationOutcome::Applied),
            DeepLinkRequest::Pending(pending) => {
                let project = resolver.fetch_project(&pending.project_id).await;
                self.complete(pending, project)
            }
        }
    }

    pub async fn follow<R: ProjectResolver + ?Sized>(
        &mut self,
        resolver: &R,
        link: &Link,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.deep_link(resolver, link.project_id.as_deref(), link.route.clone())
            .await
    }

    pub fn open_project_selector(&mut self, title: impl Into<String>, on_select: OnProjectSelected) {
        let title = title.into();
        debug!(%title, "project selector opened");
        self.selector = Some(ProjectSelector { title, on_select });
    }

    pub fn close_project_selector(&mut self) {
        self.selector = None;
    }

    pub fn selector_title(&self) -> Option<&str> {
        self.selector.as_ref().map(|s| s.title.as_str())
    }

    /// Run the selector callback with `project_id` and dismiss it.
    pub fn choose_project(&mut self, project_id: &str) -> Option<Link> {
        let selector = self.selector.take()?;
        (selector.on_select)(project_id)
    }
}

#[cfg(test)]
mod tests {
    use db::models::project::ProjectSnapshot;

    use super::*;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            company_id: "comp-1".into(),
            name: format!("Project {id}"),
            location: String::new(),
            image: String::new(),
            description: String::new(),
            contacts: vec![],
            snapshot: ProjectSnapshot {
                open_rfis: 0,
                overdue_tasks: 0,
                pending_tm_tickets: 0,
                ai_risk_level: "Low".into(),
            },
        }
    }

    struct Known(Vec<Project>);

    #[async_trait]
    impl ProjectResolver for Known {
        async fn fetch_project(&self, project_id: &str) -> Option<Project> {
            self.0.iter().find(|p| p.id == project_id).cloned()
        }
    }

    fn resolver() -> Known {
        Known(vec![project("proj-1"), project("proj-2")])
    }

    fn frames(nav: &NavigationController) -> Vec<NavigationFrame> {
        nav.frames().cloned().collect()
    }

    #[test]
    fn push_inherits_project_and_grows_by_one() {
        let mut nav = NavigationController::new();
        nav.request_deep_link(None, Route::Tasks);
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.active_project(), None);

        nav.set_projects(vec![project("proj-1")]);
        nav.request_deep_link(Some("proj-1"), Route::Rfis);
        for route in [Route::rfi_detail("rfi-1"), Route::Photos, Route::MyDay] {
            let before = nav.depth();
            nav.push(route.clone());
            assert_eq!(nav.depth(), before + 1);
            assert_eq!(nav.current().route, route);
            assert_eq!(nav.current().project_id(), Some("proj-1"));
        }
    }

    #[test]
    fn pop_on_single_frame_is_noop() {
        let mut nav = NavigationController::new();
        nav.go_back();
        nav.pop();
        assert_eq!(nav.breadcrumbs(), vec![Screen::GlobalDashboard]);
    }

    #[test]
    fn pop_exposes_previous_frame() {
        let mut nav = NavigationController::new();
        nav.push(Route::Tasks);
        nav.push(Route::task_detail("task-1"));
        let second = frames(&nav)[1].clone();
        nav.go_back();
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.current(), &second);
    }

    #[test]
    fn reset_to_module_drops_history_and_scope() {
        let mut nav = NavigationController::new();
        nav.set_projects(vec![project("proj-1")]);
        nav.request_deep_link(Some("proj-1"), Route::Tasks);
        nav.push(Route::task_detail("task-1"));

        nav.reset_to_module(Route::Accounting);
        assert_eq!(frames(&nav), vec![NavigationFrame::global(Route::Accounting)]);
    }

    #[test]
    fn operative_dashboard_push_back_scenario() {
        let mut nav = NavigationController::new();
        nav.reset_to_module(Route::GlobalDashboard);
        nav.push(Route::Tasks);
        nav.go_back();
        assert_eq!(frames(&nav), vec![NavigationFrame::global(Route::GlobalDashboard)]);
    }

    #[test]
    fn go_home_keeps_root_and_lands_on_project_home() {
        let mut nav = NavigationController::new();
        nav.set_projects(vec![project("proj-2")]);
        nav.request_deep_link(Some("proj-2"), Route::Tasks);
        nav.push(Route::task_detail("task-4"));
        nav.push(Route::Photos);
        let root = frames(&nav)[0].clone();

        nav.go_home();
        assert_eq!(
            frames(&nav),
            vec![
                root,
                NavigationFrame::in_project(Route::ProjectHome, project("proj-2")),
            ]
        );
    }

    #[test]
    fn go_home_without_project_resets_to_dashboard() {
        let mut nav = NavigationController::new();
        nav.reset_to_module(Route::TimeTracking);
        nav.push(Route::PlaceholderTool { title: "Live Time Entry".into() });
        nav.go_home();
        assert_eq!(frames(&nav), vec![NavigationFrame::global(Route::GlobalDashboard)]);
    }

    #[tokio::test]
    async fn select_project_gives_single_home_frame() {
        let mut nav = NavigationController::new();
        nav.push(Route::Tasks);
        let outcome = nav.select_project(&resolver(), "proj-1").await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Applied);
        assert_eq!(
            frames(&nav),
            vec![NavigationFrame::in_project(Route::ProjectHome, project("proj-1"))]
        );
    }

    #[tokio::test]
    async fn unknown_project_reports_not_found_and_keeps_stack() {
        let mut nav = NavigationController::new();
        nav.push(Route::Tasks);
        let before = frames(&nav);

        let err = nav.select_project(&resolver(), "proj-404").await.unwrap_err();
        assert_eq!(err, NavigationError::ProjectNotFound("proj-404".into()));
        let err = nav
            .deep_link(&resolver(), Some("proj-404"), Route::Rfis)
            .await
            .unwrap_err();
        assert_eq!(err, NavigationError::ProjectNotFound("proj-404".into()));
        assert_eq!(frames(&nav), before);
    }

    #[tokio::test]
    async fn deep_link_builds_fresh_two_frame_flow() {
        let mut nav = NavigationController::new();
        nav.push(Route::Rfis);
        nav.push(Route::rfi_detail("rfi-1"));

        nav.deep_link(&resolver(), Some("proj-2"), Route::task_detail("task-4"))
            .await
            .unwrap();
        assert_eq!(
            frames(&nav),
            vec![
                NavigationFrame::in_project(Route::ProjectHome, project("proj-2")),
                NavigationFrame::in_project(Route::task_detail("task-4"), project("proj-2")),
            ]
        );
        assert!(nav.cached_project("proj-2").is_some());
    }

    #[tokio::test]
    async fn deep_link_without_project_matches_push() {
        let mut linked = NavigationController::new();
        let mut pushed = NavigationController::new();
        linked
            .deep_link(&resolver(), None, Route::Delivery)
            .await
            .unwrap();
        pushed.push(Route::Delivery);
        assert_eq!(frames(&linked), frames(&pushed));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut nav = NavigationController::new();
        let slow = nav.request_select_project("proj-1");
        nav.push(Route::Tasks);

        let outcome = nav.complete(slow, Some(project("proj-1"))).unwrap();
        assert_eq!(outcome, NavigationOutcome::Stale);
        assert_eq!(nav.breadcrumbs(), vec![Screen::GlobalDashboard, Screen::Tasks]);
    }

    #[test]
    fn later_request_wins_regardless_of_completion_order() {
        let mut nav = NavigationController::new();
        let first = nav.request_select_project("proj-1");
        let DeepLinkRequest::Pending(second) =
            nav.request_deep_link(Some("proj-2"), Route::task_detail("task-4"))
        else {
            panic!("proj-2 is not cached");
        };

        assert_eq!(
            nav.complete(second, Some(project("proj-2"))).unwrap(),
            NavigationOutcome::Applied
        );
        assert_eq!(
            nav.complete(first, Some(project("proj-1"))).unwrap(),
            NavigationOutcome::Stale
        );
        assert_eq!(nav.active_project().map(|p| p.id.as_str()), Some("proj-2"));
    }

    #[test]
    fn selector_runs_callback_once_and_closes() {
        let mut nav = NavigationController::new();
        nav.open_project_selector(
            "Select a project for the new task",
            Box::new(|id: &str| Some(Link::in_project(id, Route::NewTask))),
        );
        assert_eq!(nav.selector_title(), Some("Select a project for the new task"));

        let link = nav.choose_project("proj-1").unwrap();
        assert_eq!(link, Link::in_project("proj-1", Route::NewTask));
        assert_eq!(nav.selector_title(), None);
        assert_eq!(nav.choose_project("proj-1"), None);

        nav.open_project_selector("Pick", Box::new(|_: &str| None));
        nav.close_project_selector();
        assert_eq!(nav.choose_project("proj-1"), None);
    }
}
