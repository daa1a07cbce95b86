//! The logged-in shell: one user, their navigation stack, and the glue between
//! menu actions, notifications, AI cards and the navigation controller.

use db::{
    DBService,
    models::{
        route::{Link, MissingParams, Route, Screen},
        user::{RegisterUser, Role, User},
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    access_policy::{
        SidebarItem, ToolDefinition, VisibleMenuItem, can_open_module, is_visible, sidebar,
        visible_menu,
    },
    advisory::{AdvisoryService, AiSuggestion},
    config::Config,
    gateway::{EntityGateway, GatewayError},
    navigation::{NavigationController, NavigationError, NavigationOutcome},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no account for {0}")]
    UnknownUser(String),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{role} may not open {screen}")]
    ModuleForbidden { role: Role, screen: Screen },
    #[error("{role} may not use {tool}")]
    ToolForbidden { role: Role, tool: String },
    #[error(transparent)]
    MissingParams(#[from] MissingParams),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug)]
pub struct Session {
    user: User,
    nav: NavigationController,
    gateway: EntityGateway,
    advisory: AdvisoryService,
}

impl Session {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub fn menu(&self) -> Vec<VisibleMenuItem> {
        visible_menu(self.user.role)
    }

    pub fn sidebar(&self) -> Vec<SidebarItem> {
        sidebar(self.user.role, self.nav.active_project().is_some())
    }

    pub async fn refresh_projects(&mut self) -> Result<(), SessionError> {
        let projects = self.gateway.fetch_all_projects(&self.user).await?;
        self.nav.set_projects(projects);
        Ok(())
    }

    /// Top-level switch from the main menu or the "My Projects" entry.
    pub fn open_module(&mut self, screen: Screen) -> Result<(), SessionError> {
        if !screen.is_landing() && !can_open_module(screen, self.user.role) {
            warn!(user_id = %self.user.id, %screen, "module not permitted");
            return Err(SessionError::ModuleForbidden {
                role: self.user.role,
                screen,
            });
        }
        self.nav.reset_to_module(Route::try_from(screen)?);
        Ok(())
    }

    pub fn push(&mut self, route: Route) {
        self.nav.push(route);
    }

    pub fn go_back(&mut self) {
        self.nav.go_back();
    }

    pub fn go_home(&mut self) {
        self.nav.go_home();
    }

    pub async fn select_project(&mut self, project_id: &str) -> Result<NavigationOutcome, SessionError> {
        Ok(self.nav.select_project(&self.gateway, project_id).await?)
    }

    /// "New task" and friends from the global dashboard: pick a project, then open the form there.
    pub fn quick_action(&mut self, screen: Screen) -> Result<(), SessionError> {
        let route = Route::try_from(screen)?;
        self.nav.open_project_selector(
            format!("Select a project for the new {}", screen.subject_noun()),
            Box::new(move |project_id: &str| Some(Link::in_project(project_id, route))),
        );
        Ok(())
    }

    /// Tools needing a project go through the selector; others open in the current scope.
    pub async fn launch_tool(&mut self, tool: &ToolDefinition) -> Result<(), SessionError> {
        if !is_visible(tool, self.user.role) {
            return Err(SessionError::ToolForbidden {
                role: self.user.role,
                tool: tool.title.to_string(),
            });
        }
        let route = Route::for_tool(tool.screen, tool.title)?;
        debug!(tool = tool.title, "launching tool");
        if tool.requires_project_context {
            self.nav.open_project_selector(
                format!("Select a project for {}", tool.title),
                Box::new(move |project_id: &str| Some(Link::in_project(project_id, route))),
            );
        } else {
            self.nav.deep_link(&self.gateway, None, route).await?;
        }
        Ok(())
    }

    /// Selector pick; follows whatever link the selector's callback produced.
    pub async fn choose_project(&mut self, project_id: &str) -> Result<Option<NavigationOutcome>, SessionError> {
        match self.nav.choose_project(project_id) {
            Some(link) => Ok(Some(self.follow_link(&link).await?)),
            None => Ok(None),
        }
    }

    pub fn close_project_selector(&mut self) {
        self.nav.close_project_selector();
    }

    /// Notification, activity entry or any other stored link.
    pub async fn follow_link(&mut self, link: &Link) -> Result<NavigationOutcome, SessionError> {
        Ok(self.nav.follow(&self.gateway, link).await?)
    }

    pub async fn suggest_action(&self) -> Option<AiSuggestion> {
        self.advisory.suggest_next_action(&self.user).await
    }

    /// Suggestions only navigate when they name a project.
    pub async fn act_on_suggestion(
        &mut self,
        suggestion: &AiSuggestion,
    ) -> Result<Option<NavigationOutcome>, SessionError> {
        if suggestion.action.link.project_id.is_none() {
            debug!(title = %suggestion.title, "suggestion has no project, ignoring");
            return Ok(None);
        }
        Ok(Some(self.follow_link(&suggestion.action.link).await?))
    }
}

#[derive(Debug)]
pub struct SessionManager {
    gateway: EntityGateway,
    advisory: AdvisoryService,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(gateway: EntityGateway, advisory: AdvisoryService) -> Self {
        Self {
            gateway,
            advisory,
            session: None,
        }
    }

    pub fn from_config(db: DBService, config: &Config) -> Self {
        let gateway = EntityGateway::from_config(db, &config.gateway);
        let advisory = AdvisoryService::from_config(gateway.clone(), &config.ai);
        Self::new(gateway, advisory)
    }

    pub fn gateway(&self) -> &EntityGateway {
        &self.gateway
    }

    pub fn advisory(&self) -> &AdvisoryService {
        &self.advisory
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, SessionError> {
        self.session.as_mut().ok_or(SessionError::NotLoggedIn)
    }

    /// Starts on the global dashboard with the user's projects cached.
    pub async fn login(&mut self, email: &str) -> Result<&mut Session, SessionError> {
        let user = self
            .gateway
            .login(email)
            .await?
            .ok_or_else(|| SessionError::UnknownUser(email.to_string()))?;
        self.start(user).await
    }

    pub async fn register(&mut self, details: &RegisterUser) -> Result<&mut Session, SessionError> {
        let user = self.gateway.register(details).await?;
        self.start(user).await
    }

    async fn start(&mut self, user: User) -> Result<&mut Session, SessionError> {
        let mut session = Session {
            user,
            nav: NavigationController::new(),
            gateway: self.gateway.clone(),
            advisory: self.advisory.clone(),
        };
        session.refresh_projects().await?;
        session.nav.reset_to_module(Route::GlobalDashboard);
        if let Err(e) = self.gateway.check_due_date_notifications(&session.user).await {
            warn!(error = %e, "due date check failed");
        }
        info!(user_id = %session.user.id, role = %session.user.role, "session started");
        Ok(self.session.insert(session))
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user_id = %session.user.id, "session ended");
        }
    }
}
