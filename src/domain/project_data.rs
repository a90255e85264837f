// Job configuration passed on the command line as a JSON blob
use chrono::NaiveTime;
use serde::Deserialize;

use crate::domain::permission::{Capability, CapabilityMode};
use crate::domain::resources::NewSchedule;
use crate::infrastructure::error::TableauError;

const VALID_INTERVAL_HOURS: [u8; 6] = [1, 2, 4, 6, 8, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    QueryWorkbooks,
    Publish,
    AddPermission,
    DeletePermission,
    UpdateDefaultPermissions,
    CreateSchedule,
}

/// One entry of `--project_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectData {
    pub server_url: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub is_site_default: bool,
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub show_tabs: bool,
    #[serde(default)]
    pub hidden_views: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub permission_name: Option<String>,
    #[serde(default)]
    pub permission_mode: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub schedule: Option<ScheduleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleSpec {
    pub name: String,
    pub priority: u8,
    pub schedule_type: String,
    pub execution_order: String,
    pub start_time: String,
    pub end_time: String,
    pub interval_hours: u8,
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self {
            name: "Hourly-Schedule".to_string(),
            priority: 50,
            schedule_type: "Extract".to_string(),
            execution_order: "Parallel".to_string(),
            start_time: "02:30:00".to_string(),
            end_time: "23:00:00".to_string(),
            interval_hours: 2,
        }
    }
}

impl ScheduleSpec {
    pub fn to_new_schedule(&self) -> Result<NewSchedule, TableauError> {
        if !VALID_INTERVAL_HOURS.contains(&self.interval_hours) {
            return Err(TableauError::InvalidSchedule(format!(
                "interval_hours must be one of {:?}, got {}",
                VALID_INTERVAL_HOURS, self.interval_hours
            )));
        }

        let start_time = parse_time(&self.start_time)?;
        let end_time = parse_time(&self.end_time)?;
        if end_time <= start_time {
            return Err(TableauError::InvalidSchedule(format!(
                "end_time {} must be after start_time {}",
                self.end_time, self.start_time
            )));
        }

        Ok(NewSchedule {
            name: self.name.clone(),
            priority: self.priority,
            schedule_type: self.schedule_type.clone(),
            execution_order: self.execution_order.clone(),
            start_time,
            end_time,
            interval_hours: self.interval_hours,
        })
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, TableauError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| TableauError::InvalidSchedule(format!("invalid time of day: {}", value)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectDataBlob {
    Many(Vec<ProjectData>),
    One(Box<ProjectData>),
}

/// Parse the `--project_data` blob: an array of entries or a single entry.
pub fn parse_project_data(json: &str) -> Result<Vec<ProjectData>, serde_json::Error> {
    match serde_json::from_str::<ProjectDataBlob>(json)? {
        ProjectDataBlob::Many(entries) => Ok(entries),
        ProjectDataBlob::One(entry) => Ok(vec![*entry]),
    }
}

impl ProjectData {
    /// Content URL used at sign-in; the default site is addressed by an empty string.
    pub fn site_content_url(&self) -> &str {
        if self.is_site_default {
            ""
        } else {
            &self.site_name
        }
    }

    /// Human readable site label for log lines and the report.
    pub fn site_label(&self) -> &str {
        if self.is_site_default || self.site_name.is_empty() {
            "Default"
        } else {
            &self.site_name
        }
    }

    pub fn require_project_path(&self) -> Result<&str, TableauError> {
        required(&self.project_path, "project_path")
    }

    pub fn require_file_path(&self) -> Result<&str, TableauError> {
        required(&self.file_path, "file_path")
    }

    pub fn require_workbook_name(&self) -> Result<&str, TableauError> {
        required(&self.name, "name")
    }

    pub fn require_user_name(&self) -> Result<&str, TableauError> {
        required(&self.user_name, "user_name")
    }

    pub fn require_capability(&self) -> Result<Capability, TableauError> {
        required(&self.permission_name, "permission_name")?.parse()
    }

    pub fn require_mode(&self) -> Result<CapabilityMode, TableauError> {
        required(&self.permission_mode, "permission_mode")?.parse()
    }

    /// Workbook name to publish under; falls back to the file stem.
    pub fn publish_name(&self) -> Result<String, TableauError> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Ok(name.to_string());
        }
        let file_path = self.require_file_path()?;
        std::path::Path::new(file_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| TableauError::InvalidWorkbookFile(file_path.to_string()))
    }

    pub fn schedule_spec(&self) -> ScheduleSpec {
        self.schedule.clone().unwrap_or_default()
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, TableauError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(TableauError::MissingField(field))
}
