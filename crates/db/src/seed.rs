//! Demo tenant loaded into a fresh store.
//!
//! Dates are relative to today so overdue and due-soon states stay meaningful.

use chrono::Utc;
use tracing::info;
use utils::date::{days_from_today, hours_ago};

use crate::{
    DBService,
    models::{
        comment::{Attachment, Comment},
        daily_log::{DailyLog, LogItem},
        daywork_sheet::{DayworkSheet, DayworkSheetItem, DayworkStatus},
        drawing::{Document, Drawing, SAMPLE_DRAWING_URL},
        notification::{ActivityEvent, ActivityKind, Notification},
        project::{Project, ProjectContact, ProjectSnapshot},
        punch_list::{PunchListItem, PunchListStatus},
        rfi::{Rfi, RfiHistoryEvent, RfiStatus},
        route::{Link, Route},
        site::{DeliveryItem, SiteInstruction},
        task::{Task, TaskStatus},
        user::{Company, Role, User},
    },
    store::StoreError,
};

pub async fn seed(db: &DBService) -> Result<(), StoreError> {
    for company in companies() {
        db.insert(&company).await?;
    }
    for user in users() {
        db.insert(&user).await?;
    }
    for project in projects() {
        db.insert(&project).await?;
    }
    for task in tasks() {
        db.insert(&task).await?;
    }
    for rfi in rfis() {
        db.insert(&rfi).await?;
    }
    for item in punch_list_items() {
        db.insert(&item).await?;
    }
    for drawing in drawings() {
        db.insert(&drawing).await?;
    }
    for document in documents() {
        db.insert(&document).await?;
    }
    for sheet in daywork_sheets() {
        db.insert(&sheet).await?;
    }
    for log in daily_logs() {
        db.insert(&log).await?;
    }
    for instruction in site_instructions() {
        db.insert(&instruction).await?;
    }
    for item in delivery_items() {
        db.insert(&item).await?;
    }
    for notification in notifications() {
        db.insert(&notification).await?;
    }
    for event in activity() {
        db.insert(&event).await?;
    }
    info!("seeded demo tenant");
    Ok(())
}

fn avatar(seed: &str) -> String {
    format!("https://i.pravatar.cc/150?u={seed}")
}

fn companies() -> Vec<Company> {
    vec![
        Company {
            id: "comp-1".into(),
            name: "Northgate Builders".into(),
        },
        Company {
            id: "comp-2".into(),
            name: "Keystone Civil".into(),
        },
    ]
}

fn users() -> Vec<User> {
    let user = |id: &str, name: &str, email: &str, role: Role, company: Option<&str>| User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        role,
        avatar: avatar(id),
        company_id: company.map(Into::into),
    };
    vec![
        user("user-sa", "Sasha Rowe", "sasha@sitedesk.dev", Role::SuperAdmin, None),
        user("user-ca", "Casey Morgan", "casey@northgate.dev", Role::CompanyAdmin, Some("comp-1")),
        user("user-ss", "Priya Shah", "priya@northgate.dev", Role::Supervisor, Some("comp-1")),
        user("user-oo", "Owen Hale", "owen@northgate.dev", Role::Operative, Some("comp-1")),
        user("user-ol", "Lena Ortiz", "lena@northgate.dev", Role::Operative, Some("comp-1")),
        user("user-kc", "Ken Adeyemi", "ken@keystone.dev", Role::CompanyAdmin, Some("comp-2")),
    ]
}

fn projects() -> Vec<Project> {
    let project = |id: &str,
                   company: &str,
                   name: &str,
                   location: &str,
                   description: &str,
                   snapshot: (u32, u32, u32, &str)| Project {
        id: id.into(),
        company_id: company.into(),
        name: name.into(),
        location: location.into(),
        image: format!("https://picsum.photos/seed/{id}/800/600"),
        description: description.into(),
        contacts: vec![
            ProjectContact {
                role: "Project Manager".into(),
                name: "Casey Morgan".into(),
            },
            ProjectContact {
                role: "Site Supervisor".into(),
                name: "Priya Shah".into(),
            },
        ],
        snapshot: ProjectSnapshot {
            open_rfis: snapshot.0,
            overdue_tasks: snapshot.1,
            pending_tm_tickets: snapshot.2,
            ai_risk_level: snapshot.3.into(),
        },
    };
    vec![
        project(
            "proj-1",
            "comp-1",
            "Harbour Point Tower",
            "Quayside, Bristol",
            "Twenty-two storey residential tower with podium retail.",
            (1, 2, 1, "Medium"),
        ),
        project(
            "proj-2",
            "comp-1",
            "Eastfield Business Park",
            "Eastfield, Leeds",
            "Three steel-frame office blocks and shared parking deck.",
            (1, 1, 1, "Low"),
        ),
        project(
            "proj-3",
            "comp-2",
            "St. Anne's Clinic Extension",
            "Harrow, London",
            "Two-storey outpatient wing tied into the existing clinic.",
            (0, 1, 1, "High"),
        ),
    ]
}

fn tasks() -> Vec<Task> {
    let task = |id: &str,
                project: &str,
                title: &str,
                status: TaskStatus,
                assignee: Option<&str>,
                days_ago: i64| Task {
        id: id.into(),
        project_id: project.into(),
        title: title.into(),
        description: String::new(),
        status,
        assignee: assignee.map(Into::into),
        target_roles: Vec::new(),
        due_date: days_from_today(days_ago),
        attachments: Vec::new(),
        comments: Vec::new(),
    };

    let mut formwork = task(
        "task-1",
        "proj-1",
        "Strike level 4 slab formwork",
        TaskStatus::InProgress,
        Some("Owen Hale"),
        -2,
    );
    formwork.description = "Cube results are in; strike bays A to C first.".into();
    formwork.comments.push(Comment {
        id: "c-1".into(),
        author: "Priya Shah".into(),
        timestamp: hours_ago(1, 3),
        text: "Crane booked for Thursday morning.".into(),
        attachments: Vec::new(),
    });

    let mut toolbox_talk = task(
        "task-7",
        "proj-2",
        "Toolbox talk: working at height",
        TaskStatus::Todo,
        None,
        -3,
    );
    toolbox_talk.target_roles = vec![Role::Operative];

    vec![
        formwork,
        task(
            "task-2",
            "proj-1",
            "Install firestopping to riser 2",
            TaskStatus::Todo,
            Some("Lena Ortiz"),
            5,
        ),
        task(
            "task-3",
            "proj-1",
            "Review curtain wall shop drawings",
            TaskStatus::Todo,
            Some("Priya Shah"),
            2,
        ),
        task(
            "task-4",
            "proj-2",
            "Set out block B grid lines",
            TaskStatus::Done,
            Some("Owen Hale"),
            6,
        ),
        task(
            "task-5",
            "proj-2",
            "Close out snagging on parking deck",
            TaskStatus::InProgress,
            Some("Priya Shah"),
            3,
        ),
        task(
            "task-6",
            "proj-3",
            "Confirm medical gas pipework route",
            TaskStatus::Todo,
            Some("Ken Adeyemi"),
            1,
        ),
        toolbox_talk,
    ]
}

fn rfis() -> Vec<Rfi> {
    let rfi = |id: &str, project: &str, subject: &str, question: &str, days_ago: i64| Rfi {
        id: id.into(),
        project_id: project.into(),
        subject: subject.into(),
        question: question.into(),
        status: RfiStatus::Open,
        assignee: "Design Team".into(),
        due_date: days_from_today(days_ago),
        attachments: Vec::new(),
        comments: Vec::new(),
        response: None,
        answered_by: None,
        response_attachments: Vec::new(),
        created_by: "user-ss".into(),
        due_date_notified: false,
        history: vec![RfiHistoryEvent {
            timestamp: hours_ago(days_ago.abs() + 4, 0),
            author: "Priya Shah".into(),
            change: "Created RFI.".into(),
        }],
    };

    let mut answered = rfi(
        "rfi-2",
        "proj-1",
        "Balcony drainage outlet",
        "Can the outlet move 150mm east to clear the steel?",
        4,
    );
    answered.status = RfiStatus::Closed;
    answered.response = Some("Yes, keep the fall at 1:80.".into());
    answered.answered_by = Some("Design Team".into());
    answered.history.push(RfiHistoryEvent {
        timestamp: hours_ago(3, 0),
        author: "Design Team".into(),
        change: "Answered and closed RFI.".into(),
    });

    let mut lintel = rfi(
        "rfi-1",
        "proj-1",
        "Lintel over door D4",
        "Drawing A-201 and S-110 disagree on the lintel size. Which governs?",
        -1,
    );
    lintel.attachments.push(Attachment {
        name: "D4-markup.pdf".into(),
        url: SAMPLE_DRAWING_URL.into(),
    });

    vec![
        lintel,
        answered,
        rfi(
            "rfi-3",
            "proj-2",
            "Parking deck expansion joint",
            "Please confirm the joint product for the level 2 deck.",
            2,
        ),
    ]
}

fn punch_list_items() -> Vec<PunchListItem> {
    let item = |id: &str, project: &str, title: &str, location: &str, status, assignee: &str| {
        PunchListItem {
            id: id.into(),
            project_id: project.into(),
            title: title.into(),
            description: String::new(),
            location: location.into(),
            status,
            assignee: assignee.into(),
            photos: Vec::new(),
            comments: Vec::new(),
        }
    };
    vec![
        item(
            "pl-1",
            "proj-1",
            "Chipped paint on stair core door",
            "Level 3, stair core 1",
            PunchListStatus::Open,
            "Lena Ortiz",
        ),
        item(
            "pl-2",
            "proj-1",
            "Missing skirting in flat 402",
            "Level 4, flat 402",
            PunchListStatus::ReadyForReview,
            "Owen Hale",
        ),
        item(
            "pl-3",
            "proj-2",
            "Bollard not plumb",
            "Parking deck entrance",
            PunchListStatus::Closed,
            "Owen Hale",
        ),
    ]
}

fn drawings() -> Vec<Drawing> {
    let drawing = |id: &str, project: &str, number: &str, title: &str, revision, days_ago| Drawing {
        id: id.into(),
        project_id: project.into(),
        number: number.into(),
        title: title.into(),
        revision,
        date: days_from_today(days_ago),
        url: SAMPLE_DRAWING_URL.into(),
    };
    vec![
        drawing("dwg-1", "proj-1", "A-201", "Level 4 general arrangement", 3, 12),
        drawing("dwg-2", "proj-1", "S-110", "Level 4 slab reinforcement", 2, 20),
        drawing("dwg-3", "proj-2", "C-001", "Site drainage layout", 1, 40),
    ]
}

fn documents() -> Vec<Document> {
    let document = |id: &str, project: &str, name: &str, days_ago| Document {
        id: id.into(),
        project_id: project.into(),
        name: name.into(),
        url: format!("/docs/{id}.pdf"),
        uploaded_at: days_from_today(days_ago),
    };
    vec![
        document("doc-1", "proj-1", "Construction phase plan.pdf", 30),
        document("doc-2", "proj-1", "Fire strategy rev C.pdf", 14),
        document("doc-3", "proj-2", "Ground investigation report.pdf", 60),
    ]
}

fn daywork_sheets() -> Vec<DayworkSheet> {
    let line = |id: &str, description: &str, quantity, unit: &str, rate| DayworkSheetItem {
        id: id.into(),
        description: description.into(),
        quantity,
        unit: unit.into(),
        rate,
    };
    vec![
        DayworkSheet {
            id: "dws-1".into(),
            project_id: "proj-1".into(),
            ticket_number: DayworkSheet::ticket_number(0),
            date: days_from_today(3),
            contractor: "Apex Groundworks".into(),
            description: "Break out obstruction found in lift pit".into(),
            status: DayworkStatus::Pending,
            items: vec![
                line("i-1", "Labourer", 16.0, "hr", 28.5),
                line("i-2", "Breaker hire", 1.0, "day", 95.0),
            ],
            approved_by: None,
            approved_date: None,
        },
        DayworkSheet {
            id: "dws-2".into(),
            project_id: "proj-2".into(),
            ticket_number: DayworkSheet::ticket_number(0),
            date: days_from_today(8),
            contractor: "Brightline Electrical".into(),
            description: "Temporary lighting to parking deck".into(),
            status: DayworkStatus::Approved,
            items: vec![line("i-3", "Electrician", 6.0, "hr", 42.0)],
            approved_by: Some("Casey Morgan".into()),
            approved_date: Some(Utc::now() - chrono::Duration::days(6)),
        },
        DayworkSheet {
            id: "dws-3".into(),
            project_id: "proj-3".into(),
            ticket_number: DayworkSheet::ticket_number(0),
            date: days_from_today(2),
            contractor: "Keystone Civil".into(),
            description: "Divert live water main".into(),
            status: DayworkStatus::Pending,
            items: vec![line("i-4", "Pipe fitter", 10.0, "hr", 38.0)],
            approved_by: None,
            approved_date: None,
        },
    ]
}

fn daily_logs() -> Vec<DailyLog> {
    vec![DailyLog {
        id: "log-1".into(),
        project_id: "proj-1".into(),
        user_id: "user-ss".into(),
        date: days_from_today(1),
        submitted_at: hours_ago(1, 0),
        weather: "Overcast, 14C".into(),
        notes: "Level 4 formwork complete. Rebar delivery late by two hours.".into(),
        photos: Vec::new(),
        labor: vec![LogItem {
            id: 1,
            item: "Carpenters".into(),
            quantity: "6".into(),
            unit_cost: "32".into(),
        }],
        equipment: vec![LogItem {
            id: 1,
            item: "Tower crane".into(),
            quantity: "1".into(),
            unit_cost: "850".into(),
        }],
        materials: Vec::new(),
    }]
}

fn site_instructions() -> Vec<SiteInstruction> {
    vec![
        SiteInstruction {
            id: "si-1".into(),
            text: "Hard hats and hi-vis beyond the welfare cabins at all times.".into(),
            author: "Casey Morgan".into(),
        },
        SiteInstruction {
            id: "si-2".into(),
            text: "Gate 2 closed for crane erection until Friday.".into(),
            author: "Priya Shah".into(),
        },
    ]
}

fn delivery_items() -> Vec<DeliveryItem> {
    let item = |id: &str, name: &str, ordered, received| DeliveryItem {
        id: id.into(),
        name: name.into(),
        ordered,
        received,
    };
    vec![
        item("del-1", "Rebar bundles (16mm)", 40, 32),
        item("del-2", "Plasterboard sheets", 300, 300),
        item("del-3", "Fire doors", 24, 10),
    ]
}

fn notifications() -> Vec<Notification> {
    let notification = |id: &str, message: &str, read, link, hours| Notification {
        id: id.into(),
        message: message.into(),
        timestamp: hours_ago(0, hours),
        read,
        link,
    };
    vec![
        notification(
            "notif-1",
            "Priya Shah raised RFI \"Lintel over door D4\".",
            false,
            Link::in_project("proj-1", Route::rfi_detail("rfi-1")),
            2,
        ),
        notification(
            "notif-2",
            "Task \"Set out block B grid lines\" was marked Done.",
            false,
            Link::in_project("proj-2", Route::task_detail("task-4")),
            5,
        ),
        notification(
            "notif-3",
            "Weekly safety stand-down on Monday.",
            true,
            Link::global(Route::GlobalDashboard),
            30,
        ),
    ]
}

fn activity() -> Vec<ActivityEvent> {
    let event = |id: &str,
                 kind,
                 author: &str,
                 description: &str,
                 project: (&str, &str),
                 link,
                 hours| ActivityEvent {
        id: id.into(),
        kind,
        author: author.into(),
        description: description.into(),
        timestamp: hours_ago(0, hours),
        project_id: project.0.into(),
        project_name: project.1.into(),
        link,
    };
    let tower = ("proj-1", "Harbour Point Tower");
    let park = ("proj-2", "Eastfield Business Park");
    vec![
        event(
            "ae-1",
            ActivityKind::StatusChange,
            "Owen Hale",
            "marked \"Set out block B grid lines\" as Done",
            park,
            Route::task_detail("task-4"),
            5,
        ),
        event(
            "ae-2",
            ActivityKind::Comment,
            "Priya Shah",
            "commented on \"Strike level 4 slab formwork\"",
            tower,
            Route::task_detail("task-1"),
            27,
        ),
        event(
            "ae-3",
            ActivityKind::LogSubmitted,
            "Priya Shah",
            "submitted the daily log",
            tower,
            Route::DailyLog {
                log_id: Some("log-1".into()),
            },
            24,
        ),
        event(
            "ae-4",
            ActivityKind::Photo,
            "Lena Ortiz",
            "added a photo to \"Chipped paint on stair core door\"",
            tower,
            Route::punch_list_item_detail("pl-1"),
            48,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use utils::date::today;

    use super::*;

    #[tokio::test]
    async fn only_open_rfi_due_soon_needs_a_reminder() {
        let db = DBService::seeded().await.unwrap();
        let rfis: Vec<Rfi> = db.find_all().await.unwrap();
        let due: Vec<_> = rfis
            .iter()
            .filter(|rfi| rfi.needs_due_reminder(today(), 2))
            .map(|rfi| rfi.id.as_str())
            .collect();
        assert_eq!(due, vec!["rfi-1"]);
    }

    #[tokio::test]
    async fn owen_has_no_overdue_work() {
        let db = DBService::seeded().await.unwrap();
        let owen: User = db.find_by_id("user-oo").await.unwrap().unwrap();
        let tasks = Task::find_for_user(&db, &owen).await.unwrap();
        assert!(!tasks.is_empty());
        assert!(tasks.iter().all(|t| !t.is_overdue(today())));
    }
}
