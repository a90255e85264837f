// Seam between the job flow and Tableau Server
use async_trait::async_trait;
use std::path::Path;

use crate::domain::permission::{Capability, CapabilityMode, PermissionRule};
use crate::domain::resources::{NewSchedule, NewWorkbook, Project, Schedule, ServerInfo, Session, User, Workbook};
use crate::infrastructure::error::TableauError;

pub type ApiResult<T> = Result<T, TableauError>;

#[async_trait]
pub trait TableauApi: Send + Sync {
    /// Server product and REST API versions; needs no session.
    async fn server_info(&self) -> ApiResult<ServerInfo>;

    async fn sign_in(&self, username: &str, password: &str, site_content_url: &str) -> ApiResult<Session>;

    async fn sign_out(&self, session: &Session) -> ApiResult<()>;

    /// First page of projects whose name equals `name`.
    async fn find_projects(&self, session: &Session, name: &str) -> ApiResult<Vec<Project>>;

    /// First page of workbooks on the signed-in site.
    async fn list_workbooks(&self, session: &Session) -> ApiResult<Vec<Workbook>>;

    /// First page of workbooks whose name equals `name`, across all projects.
    async fn find_workbooks(&self, session: &Session, name: &str) -> ApiResult<Vec<Workbook>>;

    /// First page of users whose name equals `name`.
    async fn find_users(&self, session: &Session, name: &str) -> ApiResult<Vec<User>>;

    /// Publish `file` in overwrite mode.
    async fn publish_workbook(&self, session: &Session, workbook: &NewWorkbook, file: &Path) -> ApiResult<Workbook>;

    async fn add_workbook_tags(&self, session: &Session, workbook_id: &str, tags: &[String]) -> ApiResult<Vec<String>>;

    async fn query_workbook_permissions(&self, session: &Session, workbook_id: &str) -> ApiResult<Vec<PermissionRule>>;

    async fn add_workbook_permissions(
        &self,
        session: &Session,
        workbook_id: &str,
        rules: &[PermissionRule],
    ) -> ApiResult<Vec<PermissionRule>>;

    async fn delete_workbook_permission(
        &self,
        session: &Session,
        workbook_id: &str,
        user_id: &str,
        capability: Capability,
        mode: CapabilityMode,
    ) -> ApiResult<()>;

    async fn query_default_workbook_permissions(
        &self,
        session: &Session,
        project_id: &str,
    ) -> ApiResult<Vec<PermissionRule>>;

    async fn update_default_workbook_permissions(
        &self,
        session: &Session,
        project_id: &str,
        rules: &[PermissionRule],
    ) -> ApiResult<Vec<PermissionRule>>;

    async fn create_schedule(&self, session: &Session, schedule: &NewSchedule) -> ApiResult<Schedule>;
}
