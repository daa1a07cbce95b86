//! Async CRUD over the store with role checks, activity and notification side effects.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use db::{
    DBService,
    models::{
        ai_feedback::{AiFeedback, FeedbackVote},
        comment::{Attachment, Comment},
        daily_log::{CreateDailyLog, DailyLog},
        daywork_sheet::{CreateDayworkSheet, DayworkLedgerEntry, DayworkSheet, DayworkStatus},
        drawing::{CreateDrawing, Document, Drawing, SAMPLE_DRAWING_URL},
        notification::{ActivityEvent, ActivityKind, Notification},
        project::Project,
        punch_list::{CreatePunchListItem, PunchListItem, PunchListStatus},
        rfi::{CreateRfi, Rfi, RfiHistoryEvent, RfiStatus},
        route::{Link, Route},
        site::{DeliveryItem, SiteInstruction},
        task::{CreateTask, Task},
        user::{Company, RegisterUser, Role, User},
    },
    store::{Entity, EntityKind, StoreError},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use utils::{date::today, id::new_id, latency};

use super::{
    access_policy::{EDITORS, PermissionError, require_mutation},
    advisory::AiSuggestion,
    config::GatewayConfig,
    navigation::ProjectResolver,
};

/// RFIs due within this many days (inclusive) get a reminder.
const RFI_REMINDER_WINDOW_DAYS: i64 = 2;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct EntityGateway {
    db: DBService,
    latency: Duration,
}

impl EntityGateway {
    pub fn new(db: DBService, latency: Duration) -> Self {
        Self { db, latency }
    }

    pub fn from_config(db: DBService, config: &GatewayConfig) -> Self {
        Self::new(db, config.latency())
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    async fn delay(&self) {
        latency::simulate(self.latency).await;
    }

    async fn require<T: Entity>(&self, id: &str) -> Result<T, GatewayError> {
        self.db
            .find_by_id(id)
            .await?
            .ok_or_else(|| GatewayError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })
    }

    async fn save<T: Entity>(&self, row: &T) -> Result<(), GatewayError> {
        if self.db.update(row).await? {
            Ok(())
        } else {
            Err(GatewayError::NotFound {
                kind: T::KIND,
                id: row.id().to_string(),
            })
        }
    }

    async fn project_name(&self, project_id: &str) -> Result<String, GatewayError> {
        Ok(self
            .db
            .find_by_id::<Project>(project_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| "Unknown Project".to_string()))
    }

    async fn record_activity(
        &self,
        kind: ActivityKind,
        author: &User,
        description: String,
        project_id: &str,
        link: Route,
    ) -> Result<(), GatewayError> {
        let event = ActivityEvent {
            id: new_id("ae"),
            kind,
            author: author.name.clone(),
            description,
            timestamp: Utc::now(),
            project_id: project_id.to_string(),
            project_name: self.project_name(project_id).await?,
            link,
        };
        self.db.insert_front(&event).await?;
        debug!(kind = %event.kind, project_id, "recorded activity");
        Ok(())
    }

    async fn notify(&self, message: String, link: Link) -> Result<Notification, GatewayError> {
        let notification = Notification::unread(new_id("notif"), message, link);
        self.db.insert_front(&notification).await?;
        info!(notification_id = %notification.id, "notification created");
        Ok(notification)
    }

    // Auth

    /// Case-insensitive e-mail match. Passwords are not modelled.
    pub async fn login(&self, email: &str) -> Result<Option<User>, GatewayError> {
        self.delay().await;
        let email = email.trim().to_lowercase();
        let user = self
            .db
            .find_where(|u: &User| u.email.to_lowercase() == email)
            .await?
            .into_iter()
            .next();
        match &user {
            Some(u) => info!(user_id = %u.id, role = %u.role, "login"),
            None => warn!(%email, "login for unknown email"),
        }
        Ok(user)
    }

    /// New accounts join (or create) the named company as supervisors.
    pub async fn register(&self, details: &RegisterUser) -> Result<User, GatewayError> {
        self.delay().await;
        let email = details.email.trim().to_lowercase();
        let taken = self
            .db
            .find_where(|u: &User| u.email.to_lowercase() == email)
            .await?;
        if !taken.is_empty() {
            return Err(GatewayError::DuplicateEmail(details.email.clone()));
        }

        let company_name = details.company_name.trim();
        let existing = self
            .db
            .find_where(|c: &Company| c.name.eq_ignore_ascii_case(company_name))
            .await?
            .into_iter()
            .next();
        let company = match existing {
            Some(company) => company,
            None => {
                let company = Company {
                    id: new_id("comp"),
                    name: company_name.to_string(),
                };
                self.db.insert(&company).await?;
                info!(company_id = %company.id, "company created");
                company
            }
        };

        let id = new_id("user");
        let user = User {
            avatar: format!("https://i.pravatar.cc/150?u={id}"),
            id,
            name: details.name.clone(),
            email: details.email.clone(),
            role: Role::Supervisor,
            company_id: Some(company.id),
        };
        self.db.insert(&user).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    // Users, companies, projects

    pub async fn fetch_users(&self) -> Result<Vec<User>, GatewayError> {
        self.delay().await;
        Ok(self.db.find_all().await?)
    }

    pub async fn fetch_users_by_company(&self, company_id: &str) -> Result<Vec<User>, GatewayError> {
        self.delay().await;
        Ok(self.db.find_by_scope(company_id).await?)
    }

    pub async fn fetch_companies(&self, user: &User) -> Result<Vec<Company>, GatewayError> {
        self.delay().await;
        if user.role.is_super_admin() {
            return Ok(self.db.find_all().await?);
        }
        Ok(self
            .db
            .find_where(|c: &Company| user.belongs_to(&c.id))
            .await?)
    }

    pub async fn fetch_all_projects(&self, user: &User) -> Result<Vec<Project>, GatewayError> {
        self.delay().await;
        if user.role.is_super_admin() {
            return Ok(self.db.find_all().await?);
        }
        match user.company_id.as_deref() {
            Some(company_id) => Ok(self.db.find_by_scope(company_id).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn fetch_project_by_id(&self, id: &str) -> Result<Option<Project>, GatewayError> {
        self.fetch_by_id(id).await
    }

    pub async fn fetch_all_for_scope<T: Entity>(&self, scope_id: &str) -> Result<Vec<T>, GatewayError> {
        self.delay().await;
        Ok(self.db.find_by_scope(scope_id).await?)
    }

    pub async fn fetch_by_id<T: Entity>(&self, id: &str) -> Result<Option<T>, GatewayError> {
        self.delay().await;
        Ok(self.db.find_by_id(id).await?)
    }

    // Tasks

    pub async fn fetch_tasks_for_project(&self, project_id: &str) -> Result<Vec<Task>, GatewayError> {
        self.delay().await;
        Ok(Task::find_by_project_id(&self.db, project_id).await?)
    }

    /// Tasks assigned to the user by name or addressed to their role.
    pub async fn fetch_tasks_for_user(&self, user: &User) -> Result<Vec<Task>, GatewayError> {
        self.delay().await;
        Ok(Task::find_for_user(&self.db, user).await?)
    }

    pub async fn create_task(&self, data: &CreateTask, creator: &User) -> Result<Task, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::Task, creator, EDITORS)?;
        let task = Task::create(&self.db, data, new_id("task")).await?;
        info!(task_id = %task.id, project_id = %task.project_id, "task created");

        if !task.target_roles.is_empty() {
            self.notify_target_roles(&task).await?;
        }
        Ok(task)
    }

    async fn notify_target_roles(&self, task: &Task) -> Result<(), GatewayError> {
        let Some(project) = self.db.find_by_id::<Project>(&task.project_id).await? else {
            return Ok(());
        };
        let roles = task
            .target_roles
            .iter()
            .map(Role::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let recipients = self
            .db
            .find_where(|u: &User| {
                u.belongs_to(&project.company_id) && task.target_roles.contains(&u.role)
            })
            .await?;
        for recipient in recipients {
            debug!(user_id = %recipient.id, "notifying targeted role holder");
            self.notify(
                format!("New task for your role ({roles}): \"{}\"", task.title),
                Link::in_project(&task.project_id, Route::task_detail(&task.id)),
            )
            .await?;
        }
        Ok(())
    }

    /// A changed status is recorded in the activity feed.
    pub async fn update_task(&self, task: &Task, user: &User) -> Result<Task, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::Task, user, EDITORS)?;
        let original: Task = self.require(&task.id).await?;
        self.save(task).await?;
        if original.status != task.status {
            self.record_activity(
                ActivityKind::StatusChange,
                user,
                format!("updated task \"{}\" to {}.", task.title, task.status),
                &task.project_id,
                Route::task_detail(&task.id),
            )
            .await?;
        }
        info!(task_id = %task.id, status = %task.status, "task updated");
        Ok(task.clone())
    }

    pub async fn add_comment_to_task(
        &self,
        task_id: &str,
        text: &str,
        attachments: Vec<Attachment>,
        author: &User,
    ) -> Result<Comment, GatewayError> {
        self.delay().await;
        let mut task: Task = self.require(task_id).await?;
        let comment = Comment::new(&author.name, text, attachments);
        task.comments.push(comment.clone());
        self.save(&task).await?;
        self.record_activity(
            ActivityKind::Comment,
            author,
            format!("commented on task \"{}\".", task.title),
            &task.project_id,
            Route::task_detail(&task.id),
        )
        .await?;
        Ok(comment)
    }

    // RFIs

    pub async fn fetch_rfis_for_project(&self, project_id: &str) -> Result<Vec<Rfi>, GatewayError> {
        self.fetch_all_for_scope(project_id).await
    }

    pub async fn create_rfi(&self, data: &CreateRfi, creator: &User) -> Result<Rfi, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::Rfi, creator, EDITORS)?;
        let rfi = Rfi {
            id: new_id("rfi"),
            project_id: data.project_id.clone(),
            subject: data.subject.clone(),
            question: data.question.clone(),
            status: data.status.unwrap_or_default(),
            assignee: data.assignee.clone(),
            due_date: data.due_date,
            attachments: data.attachments.clone(),
            comments: Vec::new(),
            response: None,
            answered_by: None,
            response_attachments: Vec::new(),
            created_by: creator.id.clone(),
            due_date_notified: false,
            history: vec![RfiHistoryEvent::now(&creator.name, "Created RFI.")],
        };
        self.db.insert(&rfi).await?;
        info!(rfi_id = %rfi.id, project_id = %rfi.project_id, "rfi created");
        Ok(rfi)
    }

    pub async fn add_comment_to_rfi(
        &self,
        rfi_id: &str,
        text: &str,
        author: &User,
    ) -> Result<Comment, GatewayError> {
        self.delay().await;
        let mut rfi: Rfi = self.require(rfi_id).await?;
        let comment = Comment::new(&author.name, text, Vec::new());
        rfi.comments.push(comment.clone());
        self.save(&rfi).await?;
        self.record_activity(
            ActivityKind::Comment,
            author,
            format!("commented on RFI \"{}\".", rfi.subject),
            &rfi.project_id,
            Route::rfi_detail(&rfi.id),
        )
        .await?;
        Ok(comment)
    }

    /// Records the answer, closes the RFI and tells its creator.
    pub async fn answer_rfi(
        &self,
        rfi_id: &str,
        answer: &str,
        attachments: Vec<Attachment>,
        author: &User,
    ) -> Result<Rfi, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::Rfi, author, EDITORS)?;
        let mut rfi: Rfi = self.require(rfi_id).await?;
        rfi.response = Some(answer.to_string());
        rfi.answered_by = Some(author.name.clone());
        rfi.status = RfiStatus::Closed;
        rfi.response_attachments = attachments;
        rfi.history.push(RfiHistoryEvent::now(
            &author.name,
            "Answered RFI and changed status to Closed.",
        ));
        self.save(&rfi).await?;
        info!(rfi_id = %rfi.id, "rfi answered");

        self.notify(
            format!("Your RFI \"{}\" has been answered.", rfi.subject),
            Link::in_project(&rfi.project_id, Route::rfi_detail(&rfi.id)),
        )
        .await?;
        Ok(rfi)
    }

    // Punch list

    pub async fn fetch_punch_list_items_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<PunchListItem>, GatewayError> {
        self.fetch_all_for_scope(project_id).await
    }

    pub async fn create_punch_list_item(
        &self,
        data: &CreatePunchListItem,
        creator: &User,
    ) -> Result<PunchListItem, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::PunchListItem, creator, EDITORS)?;
        let item = PunchListItem {
            id: new_id("pl"),
            project_id: data.project_id.clone(),
            title: data.title.clone(),
            description: data.description.clone(),
            location: data.location.clone(),
            status: PunchListStatus::Open,
            assignee: data.assignee.clone(),
            photos: data.photos.clone(),
            comments: Vec::new(),
        };
        self.db.insert(&item).await?;
        info!(item_id = %item.id, "punch list item created");
        Ok(item)
    }

    /// Anyone may edit an item; only editors may move it to Closed.
    pub async fn update_punch_list_item(
        &self,
        item: &PunchListItem,
        user: &User,
    ) -> Result<PunchListItem, GatewayError> {
        self.delay().await;
        let original: PunchListItem = self.require(&item.id).await?;
        if original.status != item.status && item.status == PunchListStatus::Closed {
            require_mutation(EntityKind::PunchListItem, user, EDITORS)?;
        }
        self.save(item).await?;
        info!(item_id = %item.id, status = %item.status, "punch list item updated");
        Ok(item.clone())
    }

    pub async fn add_comment_to_punch_list_item(
        &self,
        item_id: &str,
        text: &str,
        author: &User,
    ) -> Result<Comment, GatewayError> {
        self.delay().await;
        let mut item: PunchListItem = self.require(item_id).await?;
        let comment = Comment::new(&author.name, text, Vec::new());
        item.comments.push(comment.clone());
        self.save(&item).await?;
        self.record_activity(
            ActivityKind::Comment,
            author,
            format!("commented on punch list item \"{}\".", item.title),
            &item.project_id,
            Route::punch_list_item_detail(&item.id),
        )
        .await?;
        Ok(comment)
    }

    // Drawings, documents, site lists

    pub async fn fetch_drawings_for_project(&self, project_id: &str) -> Result<Vec<Drawing>, GatewayError> {
        self.fetch_all_for_scope(project_id).await
    }

    /// New drawings are listed first.
    pub async fn create_drawing(
        &self,
        project_id: &str,
        data: &CreateDrawing,
        creator: &User,
    ) -> Result<Drawing, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::Drawing, creator, EDITORS)?;
        let drawing = Drawing {
            id: new_id("dwg"),
            project_id: project_id.to_string(),
            number: data.number.clone(),
            title: data.title.clone(),
            revision: data.revision,
            date: data.date,
            url: SAMPLE_DRAWING_URL.to_string(),
        };
        self.db.insert_front(&drawing).await?;
        info!(drawing_id = %drawing.id, file = %data.file_name, "drawing uploaded");
        Ok(drawing)
    }

    pub async fn fetch_documents_for_project(&self, project_id: &str) -> Result<Vec<Document>, GatewayError> {
        self.fetch_all_for_scope(project_id).await
    }

    pub async fn fetch_site_instructions(&self) -> Result<Vec<SiteInstruction>, GatewayError> {
        self.delay().await;
        Ok(self.db.find_all().await?)
    }

    pub async fn fetch_delivery_items(&self) -> Result<Vec<DeliveryItem>, GatewayError> {
        self.delay().await;
        Ok(self.db.find_all().await?)
    }

    // Daywork sheets

    pub async fn fetch_daywork_sheets_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<DayworkSheet>, GatewayError> {
        self.fetch_all_for_scope(project_id).await
    }

    pub async fn create_daywork_sheet(
        &self,
        data: &CreateDayworkSheet,
        creator: &User,
    ) -> Result<DayworkSheet, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::DayworkSheet, creator, EDITORS)?;
        let existing = self
            .db
            .find_by_scope::<DayworkSheet>(&data.project_id)
            .await?
            .len();
        let sheet = DayworkSheet {
            id: new_id("dws"),
            project_id: data.project_id.clone(),
            ticket_number: DayworkSheet::ticket_number(existing),
            date: data.date,
            contractor: data.contractor.clone(),
            description: data.description.clone(),
            status: DayworkStatus::Pending,
            items: Vec::new(),
            approved_by: None,
            approved_date: None,
        };
        self.db.insert(&sheet).await?;
        info!(sheet_id = %sheet.id, ticket = %sheet.ticket_number, "daywork sheet created");
        Ok(sheet)
    }

    /// Approval stamps the approver and copies the sheet into the ledger.
    pub async fn update_daywork_sheet_status(
        &self,
        sheet_id: &str,
        status: DayworkStatus,
        user: &User,
    ) -> Result<DayworkSheet, GatewayError> {
        self.delay().await;
        require_mutation(EntityKind::DayworkSheet, user, EDITORS)?;
        let mut sheet: DayworkSheet = self.require(sheet_id).await?;
        sheet.status = status;
        if status == DayworkStatus::Approved {
            sheet.approved_by = Some(user.name.clone());
            sheet.approved_date = Some(Utc::now());
            self.db
                .insert(&DayworkLedgerEntry {
                    id: new_id("ledger"),
                    sheet: sheet.clone(),
                })
                .await?;
        }
        self.save(&sheet).await?;
        info!(sheet_id = %sheet.id, %status, "daywork sheet reviewed");
        Ok(sheet)
    }

    pub async fn fetch_daywork_ledger(&self, project_id: &str) -> Result<Vec<DayworkLedgerEntry>, GatewayError> {
        self.fetch_all_for_scope(project_id).await
    }

    // Daily logs

    pub async fn fetch_daily_log_for_user(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyLog>, GatewayError> {
        self.delay().await;
        Ok(self
            .db
            .find_where(|log: &DailyLog| log.user_id == user_id && log.date == date)
            .await?
            .into_iter()
            .next())
    }

    pub async fn create_daily_log(&self, data: &CreateDailyLog, user: &User) -> Result<DailyLog, GatewayError> {
        self.delay().await;
        let log = DailyLog {
            id: new_id("log"),
            project_id: data.project_id.clone(),
            user_id: data.user_id.clone(),
            date: data.date,
            submitted_at: Utc::now(),
            weather: data.weather.clone(),
            notes: data.notes.clone(),
            photos: data.photos.clone(),
            labor: data.labor.clone(),
            equipment: data.equipment.clone(),
            materials: data.materials.clone(),
        };
        self.db.insert(&log).await?;
        self.record_activity(
            ActivityKind::LogSubmitted,
            user,
            format!("submitted a daily log for {}.", log.date.format("%d/%m/%Y")),
            &log.project_id,
            Route::DailyLog {
                log_id: Some(log.id.clone()),
            },
        )
        .await?;
        info!(log_id = %log.id, project_id = %log.project_id, "daily log submitted");
        Ok(log)
    }

    // Notifications and activity

    pub async fn fetch_notifications(&self, user: &User) -> Result<Vec<Notification>, GatewayError> {
        self.delay().await;
        debug!(user_id = %user.id, "fetching notifications");
        Ok(self.db.find_all().await?)
    }

    pub async fn mark_notifications_read(&self, ids: &[String], user: &User) -> Result<(), GatewayError> {
        self.delay().await;
        let unread = self
            .db
            .find_where(|n: &Notification| !n.read && ids.contains(&n.id))
            .await?;
        for mut notification in unread {
            notification.read = true;
            self.save(&notification).await?;
        }
        debug!(user_id = %user.id, count = ids.len(), "notifications marked read");
        Ok(())
    }

    pub async fn fetch_recent_activity(&self, user: &User) -> Result<Vec<ActivityEvent>, GatewayError> {
        self.delay().await;
        debug!(user_id = %user.id, "fetching activity");
        Ok(self.db.find_all().await?)
    }

    /// One reminder per open RFI due within the window; returns the reminders created.
    pub async fn check_due_date_notifications(&self, user: &User) -> Result<Vec<Notification>, GatewayError> {
        self.delay().await;
        let today = today();
        let due = self
            .db
            .find_where(|rfi: &Rfi| rfi.needs_due_reminder(today, RFI_REMINDER_WINDOW_DAYS))
            .await?;
        let mut created = Vec::with_capacity(due.len());
        for mut rfi in due {
            created.push(
                self.notify(
                    format!("Response for RFI \"{}\" is due soon.", rfi.subject),
                    Link::in_project(&rfi.project_id, Route::rfi_detail(&rfi.id)),
                )
                .await?,
            );
            rfi.due_date_notified = true;
            self.save(&rfi).await?;
        }
        debug!(user_id = %user.id, count = created.len(), "due date check complete");
        Ok(created)
    }

    // AI feedback

    pub async fn submit_ai_feedback(
        &self,
        suggestion: &AiSuggestion,
        vote: FeedbackVote,
        user: &User,
    ) -> Result<AiFeedback, GatewayError> {
        self.delay().await;
        let feedback = AiFeedback {
            id: new_id("feedback"),
            suggestion_title: suggestion.title.clone(),
            suggestion_reason: suggestion.reason.clone(),
            feedback: vote,
            timestamp: Utc::now(),
            user_id: user.id.clone(),
        };
        self.db.insert(&feedback).await?;
        info!(user_id = %user.id, %vote, title = %feedback.suggestion_title, "ai feedback recorded");
        Ok(feedback)
    }

    pub async fn fetch_ai_feedback_for_user(&self, user_id: &str) -> Result<Vec<AiFeedback>, GatewayError> {
        self.fetch_all_for_scope(user_id).await
    }
}

#[async_trait]
impl ProjectResolver for EntityGateway {
    async fn fetch_project(&self, project_id: &str) -> Option<Project> {
        match self.fetch_project_by_id(project_id).await {
            Ok(project) => project,
            Err(e) => {
                warn!(project_id, error = %e, "project lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use db::models::task::TaskStatus;
    use utils::date::days_from_today;

    use super::*;
    use crate::services::advisory::SuggestionAction;

    async fn gateway() -> EntityGateway {
        EntityGateway::new(DBService::seeded().await.unwrap(), Duration::ZERO)
    }

    async fn user(gw: &EntityGateway, id: &str) -> User {
        gw.fetch_by_id(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn login_is_case_insensitive() {
        let gw = gateway().await;
        let casey = gw.login("  CASEY@northgate.dev ").await.unwrap().unwrap();
        assert_eq!(casey.id, "user-ca");
        assert!(gw.login("nobody@nowhere.dev").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_creates_company_and_rejects_duplicates() {
        let gw = gateway().await;
        let details = RegisterUser {
            name: "Mira Cole".into(),
            email: "mira@harbourline.dev".into(),
            company_name: "Harbourline".into(),
        };
        let user = gw.register(&details).await.unwrap();
        assert_eq!(user.role, Role::Supervisor);
        let companies = gw.fetch_companies(&user).await.unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "Harbourline");

        let again = RegisterUser {
            email: "MIRA@harbourline.dev".into(),
            ..details
        };
        assert!(matches!(
            gw.register(&again).await,
            Err(GatewayError::DuplicateEmail(_))
        ));

        let joiner = gw
            .register(&RegisterUser {
                name: "Tom Reed".into(),
                email: "tom@northgate.dev".into(),
                company_name: "northgate builders".into(),
            })
            .await
            .unwrap();
        assert_eq!(joiner.company_id.as_deref(), Some("comp-1"));
    }

    #[tokio::test]
    async fn projects_are_company_scoped_except_for_super_admin() {
        let gw = gateway().await;
        let ken = user(&gw, "user-kc").await;
        let ids: Vec<_> = gw
            .fetch_all_projects(&ken)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["proj-3"]);

        let sasha = user(&gw, "user-sa").await;
        assert_eq!(gw.fetch_all_projects(&sasha).await.unwrap().len(), 3);
        assert_eq!(gw.fetch_companies(&sasha).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn operatives_cannot_create_tasks() {
        let gw = gateway().await;
        let owen = user(&gw, "user-oo").await;
        let data = CreateTask::assigned_to("proj-1", "Sweep level 2", "Owen Hale", days_from_today(-1));
        let err = gw.create_task(&data, &owen).await.unwrap_err();
        assert!(matches!(err, GatewayError::Permission(_)));
        assert_eq!(gw.fetch_tasks_for_project("proj-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn role_targeted_task_notifies_company_role_holders() {
        let gw = gateway().await;
        let casey = user(&gw, "user-ca").await;
        let before = gw.fetch_notifications(&casey).await.unwrap().len();

        let data = CreateTask::for_roles("proj-1", "Clear scaffold debris", vec![Role::Operative], days_from_today(-2));
        let task = gw.create_task(&data, &casey).await.unwrap();

        let notifications = gw.fetch_notifications(&casey).await.unwrap();
        assert_eq!(notifications.len(), before + 2);
        assert_eq!(
            notifications[0].link,
            Link::in_project("proj-1", Route::task_detail(&task.id))
        );
        assert!(notifications[0].message.contains("(operative)"));

        let lena = user(&gw, "user-ol").await;
        let lena_tasks = gw.fetch_tasks_for_user(&lena).await.unwrap();
        assert!(lena_tasks.iter().any(|t| t.id == task.id));
    }

    #[tokio::test]
    async fn status_change_lands_in_activity_feed() {
        let gw = gateway().await;
        let priya = user(&gw, "user-ss").await;
        let mut task: Task = gw.fetch_by_id("task-3").await.unwrap().unwrap();
        task.status = TaskStatus::Done;
        gw.update_task(&task, &priya).await.unwrap();

        let activity = gw.fetch_recent_activity(&priya).await.unwrap();
        assert_eq!(activity[0].kind, ActivityKind::StatusChange);
        assert_eq!(activity[0].project_name, "Harbour Point Tower");
        assert_eq!(activity[0].deep_link(), Link::in_project("proj-1", Route::task_detail("task-3")));

        let comment = gw
            .add_comment_to_task("task-3", "Signed off.", vec![], &priya)
            .await
            .unwrap();
        let stored: Task = gw.fetch_by_id("task-3").await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Done);
        assert_eq!(stored.comments.last(), Some(&comment));
    }

    #[tokio::test]
    async fn mutations_on_missing_ids_are_not_found() {
        let gw = gateway().await;
        let casey = user(&gw, "user-ca").await;
        let err = gw
            .add_comment_to_task("task-404", "hello", vec![], &casey)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { kind: EntityKind::Task, .. }));
        assert!(matches!(
            gw.answer_rfi("rfi-404", "n/a", vec![], &casey).await,
            Err(GatewayError::NotFound { kind: EntityKind::Rfi, .. })
        ));
        assert!(matches!(
            gw.update_daywork_sheet_status("dws-404", DayworkStatus::Approved, &casey).await,
            Err(GatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn punch_items_are_gated_and_comments_reach_activity() {
        let gw = gateway().await;
        let owen = user(&gw, "user-oo").await;
        let priya = user(&gw, "user-ss").await;
        let data = CreatePunchListItem {
            project_id: "proj-1".into(),
            title: "Chipped skirting in corridor".into(),
            description: String::new(),
            location: "Level 3 east".into(),
            assignee: "Owen Hale".into(),
            photos: vec![],
        };
        assert!(matches!(
            gw.create_punch_list_item(&data, &owen).await,
            Err(GatewayError::Permission(_))
        ));

        let item = gw.create_punch_list_item(&data, &priya).await.unwrap();
        assert_eq!(item.status, PunchListStatus::Open);
        let items = gw.fetch_punch_list_items_for_project("proj-1").await.unwrap();
        assert!(items.iter().any(|i| i.id == item.id));

        gw.add_comment_to_punch_list_item(&item.id, "Filler ordered.", &owen)
            .await
            .unwrap();
        let activity = gw.fetch_recent_activity(&owen).await.unwrap();
        assert_eq!(activity[0].kind, ActivityKind::Comment);
        assert_eq!(
            activity[0].deep_link(),
            Link::in_project("proj-1", Route::punch_list_item_detail(&item.id))
        );
    }

    #[tokio::test]
    async fn site_lists_and_project_documents_load() {
        let gw = gateway().await;
        assert_eq!(gw.fetch_documents_for_project("proj-1").await.unwrap().len(), 2);
        assert_eq!(gw.fetch_site_instructions().await.unwrap().len(), 2);
        assert_eq!(gw.fetch_delivery_items().await.unwrap().len(), 3);
        assert!(
            gw.fetch_users_by_company("comp-2")
                .await
                .unwrap()
                .iter()
                .all(|u| u.company_id.as_deref() == Some("comp-2"))
        );
    }

    #[tokio::test]
    async fn unknown_task_update_leaves_activity_untouched() {
        let gw = gateway().await;
        let priya = user(&gw, "user-ss").await;
        let before = gw.fetch_recent_activity(&priya).await.unwrap().len();

        let mut ghost: Task = gw.fetch_by_id("task-3").await.unwrap().unwrap();
        ghost.id = "task-404".into();
        ghost.status = TaskStatus::Done;
        assert!(matches!(
            gw.update_task(&ghost, &priya).await,
            Err(GatewayError::NotFound { kind: EntityKind::Task, .. })
        ));
        assert_eq!(gw.fetch_recent_activity(&priya).await.unwrap().len(), before);

        let mut task: Task = gw.fetch_by_id("task-3").await.unwrap().unwrap();
        task.title = "Review curtain wall shop drawings (rev B)".into();
        gw.update_task(&task, &priya).await.unwrap();
        assert_eq!(gw.fetch_recent_activity(&priya).await.unwrap().len(), before);
        let stored: Task = gw.fetch_by_id("task-3").await.unwrap().unwrap();
        assert_eq!(stored.title, task.title);
    }

    #[tokio::test]
    async fn answering_rfi_closes_it_and_notifies_creator() {
        let gw = gateway().await;
        let casey = user(&gw, "user-ca").await;
        let rfi = gw
            .answer_rfi("rfi-1", "Use S-110, 203x133 UB.", vec![], &casey)
            .await
            .unwrap();
        assert_eq!(rfi.status, RfiStatus::Closed);
        assert_eq!(rfi.answered_by.as_deref(), Some("Casey Morgan"));
        assert_eq!(
            rfi.history.last().map(|h| h.change.as_str()),
            Some("Answered RFI and changed status to Closed.")
        );

        let notifications = gw.fetch_notifications(&casey).await.unwrap();
        assert_eq!(notifications[0].message, "Your RFI \"Lintel over door D4\" has been answered.");
    }

    #[tokio::test]
    async fn created_rfi_starts_with_history() {
        let gw = gateway().await;
        let priya = user(&gw, "user-ss").await;
        let rfi = gw
            .create_rfi(
                &CreateRfi {
                    project_id: "proj-2".into(),
                    subject: "Kerb radius".into(),
                    question: "Which radius at the car park entry?".into(),
                    status: None,
                    assignee: "Civil Engineer".into(),
                    due_date: days_from_today(-7),
                    attachments: vec![],
                },
                &priya,
            )
            .await
            .unwrap();
        assert_eq!(rfi.status, RfiStatus::Open);
        assert_eq!(rfi.created_by, "user-ss");
        assert_eq!(rfi.history.len(), 1);
        assert_eq!(rfi.history[0].change, "Created RFI.");
        assert_eq!(gw.fetch_rfis_for_project("proj-2").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn only_editors_close_punch_list_items() {
        let gw = gateway().await;
        let owen = user(&gw, "user-oo").await;
        let mut item: PunchListItem = gw.fetch_by_id("pl-1").await.unwrap().unwrap();

        item.status = PunchListStatus::ReadyForReview;
        gw.update_punch_list_item(&item, &owen).await.unwrap();

        item.status = PunchListStatus::Closed;
        assert!(matches!(
            gw.update_punch_list_item(&item, &owen).await,
            Err(GatewayError::Permission(_))
        ));

        let priya = user(&gw, "user-ss").await;
        gw.update_punch_list_item(&item, &priya).await.unwrap();
        let stored: PunchListItem = gw.fetch_by_id("pl-1").await.unwrap().unwrap();
        assert_eq!(stored.status, PunchListStatus::Closed);
    }

    #[tokio::test]
    async fn new_drawings_are_listed_first() {
        let gw = gateway().await;
        let priya = user(&gw, "user-ss").await;
        let drawing = gw
            .create_drawing(
                "proj-1",
                &CreateDrawing {
                    number: "A-202".into(),
                    title: "Level 5 general arrangement".into(),
                    revision: 1,
                    date: days_from_today(0),
                    file_name: "A-202.pdf".into(),
                },
                &priya,
            )
            .await
            .unwrap();
        let drawings = gw.fetch_drawings_for_project("proj-1").await.unwrap();
        assert_eq!(drawings[0], drawing);
        assert_eq!(drawing.url, SAMPLE_DRAWING_URL);
    }

    #[tokio::test]
    async fn daywork_tickets_number_per_project_and_approval_hits_ledger() {
        let gw = gateway().await;
        let casey = user(&gw, "user-ca").await;
        let sheet = gw
            .create_daywork_sheet(
                &CreateDayworkSheet {
                    project_id: "proj-1".into(),
                    date: days_from_today(0),
                    contractor: "Apex Groundworks".into(),
                    description: "Pump out flooded excavation".into(),
                },
                &casey,
            )
            .await
            .unwrap();
        assert_eq!(sheet.ticket_number, "T&M-002");
        assert_eq!(sheet.status, DayworkStatus::Pending);

        let approved = gw
            .update_daywork_sheet_status(&sheet.id, DayworkStatus::Approved, &casey)
            .await
            .unwrap();
        assert_eq!(approved.approved_by.as_deref(), Some("Casey Morgan"));
        let ledger = gw.fetch_daywork_ledger("proj-1").await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].sheet.id, sheet.id);

        gw.update_daywork_sheet_status("dws-1", DayworkStatus::Rejected, &casey)
            .await
            .unwrap();
        assert_eq!(gw.fetch_daywork_ledger("proj-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn daily_log_is_findable_by_user_and_date() {
        let gw = gateway().await;
        let owen = user(&gw, "user-oo").await;
        let date = days_from_today(0);
        assert!(gw.fetch_daily_log_for_user("user-oo", date).await.unwrap().is_none());

        let log = gw
            .create_daily_log(
                &CreateDailyLog {
                    project_id: "proj-2".into(),
                    user_id: owen.id.clone(),
                    date,
                    weather: "Sunny".into(),
                    notes: "Grid lines checked.".into(),
                    photos: vec![],
                    labor: vec![],
                    equipment: vec![],
                    materials: vec![],
                },
                &owen,
            )
            .await
            .unwrap();
        assert_eq!(
            gw.fetch_daily_log_for_user("user-oo", date).await.unwrap(),
            Some(log.clone())
        );
        let activity = gw.fetch_recent_activity(&owen).await.unwrap();
        assert_eq!(activity[0].kind, ActivityKind::LogSubmitted);
        assert_eq!(
            activity[0].link,
            Route::DailyLog {
                log_id: Some(log.id)
            }
        );
    }

    #[tokio::test]
    async fn due_date_reminders_fire_once() {
        let gw = gateway().await;
        let priya = user(&gw, "user-ss").await;
        let created = gw.check_due_date_notifications(&priya).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].link, Link::in_project("proj-1", Route::rfi_detail("rfi-1")));
        assert!(gw.check_due_date_notifications(&priya).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn notifications_can_be_marked_read() {
        let gw = gateway().await;
        let casey = user(&gw, "user-ca").await;
        gw.mark_notifications_read(&["notif-1".to_string()], &casey)
            .await
            .unwrap();
        let notifications = gw.fetch_notifications(&casey).await.unwrap();
        let unread: Vec<_> = notifications.iter().filter(|n| !n.read).map(|n| n.id.as_str()).collect();
        assert_eq!(unread, vec!["notif-2"]);
    }

    #[tokio::test]
    async fn feedback_is_stored_per_user() {
        let gw = gateway().await;
        let owen = user(&gw, "user-oo").await;
        let suggestion = AiSuggestion {
            title: "Your most urgent action".into(),
            reason: "Overdue".into(),
            action: SuggestionAction {
                label: "View Task".into(),
                link: Link::in_project("proj-1", Route::task_detail("task-1")),
            },
        };
        gw.submit_ai_feedback(&suggestion, FeedbackVote::Down, &owen)
            .await
            .unwrap();
        let feedback = gw.fetch_ai_feedback_for_user("user-oo").await.unwrap();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].feedback, FeedbackVote::Down);
        assert!(gw.fetch_ai_feedback_for_user("user-ol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_resolves_projects_for_navigation() {
        let gw = gateway().await;
        assert_eq!(
            gw.fetch_project("proj-3").await.map(|p| p.name),
            Some("St. Anne's Clinic Extension".to_string())
        );
        assert!(gw.fetch_project("proj-404").await.is_none());
    }
}
