pub mod ai_feedback;
pub mod comment;
pub mod daily_log;
pub mod daywork_sheet;
pub mod drawing;
pub mod notification;
pub mod project;
pub mod punch_list;
pub mod rfi;
pub mod route;
pub mod site;
pub mod task;
pub mod user;
