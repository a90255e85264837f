// In-memory TableauApi used by the service tests
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::application::tableau_api::{ApiResult, TableauApi};
use crate::domain::permission::{Capability, CapabilityMode, PermissionRule};
use crate::domain::resources::{NewSchedule, NewWorkbook, Project, Schedule, ServerInfo, Session, User, Workbook};
use crate::infrastructure::error::TableauError;

#[derive(Default)]
pub struct FakeApi {
    pub projects: Mutex<Vec<Project>>,
    pub workbooks: Mutex<Vec<Workbook>>,
    pub users: Mutex<Vec<User>>,
    pub workbook_rules: Mutex<Vec<PermissionRule>>,
    pub default_rules: Mutex<Vec<PermissionRule>>,
    pub published: Mutex<Vec<(NewWorkbook, PathBuf)>>,
    pub deleted: Mutex<Vec<(String, String, Capability, CapabilityMode)>>,
    pub schedules: Mutex<Vec<NewSchedule>>,
    /// Name of the call that should fail with a 500.
    pub fail_on: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeApi {
    pub fn failing_on(call: &'static str) -> Self {
        let api = Self::default();
        *api.fail_on.lock().unwrap() = Some(call);
        api
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        if *self.fail_on.lock().unwrap() == Some(call) {
            return Err(TableauError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                expected: StatusCode::OK,
                api_error: None,
            });
        }
        Ok(())
    }
}

pub fn session() -> Session {
    Session {
        token: "tok".to_string(),
        site_id: "site-1".to_string(),
        user_id: "admin-1".to_string(),
    }
}

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        parent_id: None,
    }
}

pub fn workbook(id: &str, name: &str, project_name: &str) -> Workbook {
    Workbook {
        id: id.to_string(),
        name: name.to_string(),
        content_url: None,
        show_tabs: false,
        project_id: None,
        project_name: Some(project_name.to_string()),
        tags: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        site_role: Some("Viewer".to_string()),
    }
}

#[async_trait]
impl TableauApi for FakeApi {
    async fn server_info(&self) -> ApiResult<ServerInfo> {
        self.record("server_info")?;
        Ok(ServerInfo {
            product_version: "2024.1.0".to_string(),
            rest_api_version: "3.22".to_string(),
        })
    }

    async fn sign_in(&self, _username: &str, _password: &str, _site_content_url: &str) -> ApiResult<Session> {
        self.record("sign_in")?;
        Ok(session())
    }

    async fn sign_out(&self, _session: &Session) -> ApiResult<()> {
        self.record("sign_out")
    }

    async fn find_projects(&self, _session: &Session, _name: &str) -> ApiResult<Vec<Project>> {
        self.record("find_projects")?;
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn list_workbooks(&self, _session: &Session) -> ApiResult<Vec<Workbook>> {
        self.record("list_workbooks")?;
        Ok(self.workbooks.lock().unwrap().clone())
    }

    async fn find_workbooks(&self, _session: &Session, _name: &str) -> ApiResult<Vec<Workbook>> {
        self.record("find_workbooks")?;
        Ok(self.workbooks.lock().unwrap().clone())
    }

    async fn find_users(&self, _session: &Session, _name: &str) -> ApiResult<Vec<User>> {
        self.record("find_users")?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn publish_workbook(&self, _session: &Session, new_workbook: &NewWorkbook, file: &Path) -> ApiResult<Workbook> {
        self.record("publish_workbook")?;
        self.published
            .lock()
            .unwrap()
            .push((new_workbook.clone(), file.to_path_buf()));
        let mut stored = workbook("wb-new", &new_workbook.name, "");
        stored.project_id = Some(new_workbook.project_id.clone());
        Ok(stored)
    }

    async fn add_workbook_tags(&self, _session: &Session, _workbook_id: &str, tags: &[String]) -> ApiResult<Vec<String>> {
        self.record("add_workbook_tags")?;
        Ok(tags.to_vec())
    }

    async fn query_workbook_permissions(&self, _session: &Session, _workbook_id: &str) -> ApiResult<Vec<PermissionRule>> {
        self.record("query_workbook_permissions")?;
        Ok(self.workbook_rules.lock().unwrap().clone())
    }

    async fn add_workbook_permissions(
        &self,
        _session: &Session,
        _workbook_id: &str,
        rules: &[PermissionRule],
    ) -> ApiResult<Vec<PermissionRule>> {
        self.record("add_workbook_permissions")?;
        self.workbook_rules.lock().unwrap().extend(rules.iter().cloned());
        // Tableau echoes only the grants just added
        Ok(rules.to_vec())
    }

    async fn delete_workbook_permission(
        &self,
        _session: &Session,
        workbook_id: &str,
        user_id: &str,
        capability: Capability,
        mode: CapabilityMode,
    ) -> ApiResult<()> {
        self.record("delete_workbook_permission")?;
        self.deleted
            .lock()
            .unwrap()
            .push((workbook_id.to_string(), user_id.to_string(), capability, mode));
        Ok(())
    }

    async fn query_default_workbook_permissions(
        &self,
        _session: &Session,
        _project_id: &str,
    ) -> ApiResult<Vec<PermissionRule>> {
        self.record("query_default_workbook_permissions")?;
        Ok(self.default_rules.lock().unwrap().clone())
    }

    async fn update_default_workbook_permissions(
        &self,
        _session: &Session,
        _project_id: &str,
        rules: &[PermissionRule],
    ) -> ApiResult<Vec<PermissionRule>> {
        self.record("update_default_workbook_permissions")?;
        *self.default_rules.lock().unwrap() = rules.to_vec();
        Ok(rules.to_vec())
    }

    async fn create_schedule(&self, _session: &Session, schedule: &NewSchedule) -> ApiResult<Schedule> {
        self.record("create_schedule")?;
        self.schedules.lock().unwrap().push(schedule.clone());
        Ok(Schedule {
            id: "sched-1".to_string(),
            name: schedule.name.clone(),
            state: Some("Active".to_string()),
            next_run_at: None,
        })
    }
}
