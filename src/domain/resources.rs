// Tableau REST resources as seen by this tool
use chrono::{DateTime, NaiveTime, Utc};

/// Credentials returned by a successful sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub site_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub product_version: String,
    pub rest_api_version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub id: String,
    pub name: String,
    pub content_url: Option<String>,
    pub show_tabs: bool,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub site_role: Option<String>,
}

/// What gets sent alongside the workbook file when publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkbook {
    pub name: String,
    pub project_id: String,
    pub show_tabs: bool,
    pub hidden_views: Vec<String>,
}

impl NewWorkbook {
    pub fn new(name: String, project_id: String, show_tabs: bool, hidden_views: Vec<String>) -> Self {
        Self {
            name,
            project_id,
            show_tabs,
            hidden_views,
        }
    }
}

/// A server schedule that runs every `interval_hours` inside a daily window.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub name: String,
    pub priority: u8,
    pub schedule_type: String,
    pub execution_order: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_hours: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub next_run_at: Option<DateTime<Utc>>,
}

/// Sign-in credentials from the command line; the password never shows up in `Debug`.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
