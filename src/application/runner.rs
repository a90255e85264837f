// Job runner - sign in, perform one action, sign out
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::permission_service::{PermissionChange, PermissionService};
use crate::application::schedule_service::ScheduleService;
use crate::application::tableau_api::TableauApi;
use crate::application::workbook_service::{PublishedWorkbook, WorkbookService};
use crate::domain::permission::PermissionRule;
use crate::domain::project_data::{Action, ProjectData};
use crate::domain::resources::{Credentials, Schedule, Session, Workbook};

/// What one entry of the project data produced.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Workbooks(Vec<Workbook>),
    Published(PublishedWorkbook),
    PermissionAdded(PermissionChange),
    PermissionDeleted(PermissionChange),
    DefaultPermissionsUpdated { project: String, rules: Vec<PermissionRule> },
    ScheduleCreated(Schedule),
}

#[derive(Clone)]
pub struct JobRunner {
    api: Arc<dyn TableauApi>,
    workbooks: WorkbookService,
    permissions: PermissionService,
    schedules: ScheduleService,
    workbooks_dir: PathBuf,
}

impl JobRunner {
    pub fn new(api: Arc<dyn TableauApi>, workbooks_dir: PathBuf) -> Self {
        Self {
            workbooks: WorkbookService::new(api.clone()),
            permissions: PermissionService::new(api.clone()),
            schedules: ScheduleService::new(api.clone()),
            api,
            workbooks_dir,
        }
    }

    /// Run one entry. Sign-out is attempted whether or not the action succeeded.
    pub async fn run(&self, data: &ProjectData, credentials: &Credentials) -> anyhow::Result<ActionOutcome> {
        // Step 1: Sign in to Tableau server.
        let session = self
            .api
            .sign_in(&credentials.username, &credentials.password, data.site_content_url())
            .await
            .with_context(|| format!("Could not sign in to {} (site {})", data.server_url, data.site_label()))?;
        tracing::info!("Signed in to {} site {}", data.server_url, data.site_label());

        // Step 2: Perform the requested action.
        let outcome = self.dispatch(&session, data).await;

        // Step 3: Sign out, even after a failed action.
        match self.api.sign_out(&session).await {
            Ok(()) => tracing::debug!("Signed out of {}", data.server_url),
            Err(e) if outcome.is_ok() => return Err(e).context("Could not sign out of Tableau Server"),
            Err(e) => tracing::warn!("Sign out after failed action also failed: {}", e),
        }

        outcome
    }

    async fn dispatch(&self, session: &Session, data: &ProjectData) -> anyhow::Result<ActionOutcome> {
        tracing::debug!("Running {:?} on site {}", data.action, data.site_label());

        match data.action {
            Action::QueryWorkbooks => Ok(ActionOutcome::Workbooks(self.workbooks.list_workbooks(session).await?)),
            Action::Publish => Ok(ActionOutcome::Published(
                self.workbooks.publish(session, data, &self.workbooks_dir).await?,
            )),
            Action::AddPermission => Ok(ActionOutcome::PermissionAdded(
                self.permissions.add_user_permission(session, data).await?,
            )),
            Action::DeletePermission => Ok(ActionOutcome::PermissionDeleted(
                self.permissions.delete_user_permission(session, data).await?,
            )),
            Action::UpdateDefaultPermissions => {
                let rules = self.permissions.update_default_permissions(session, data).await?;
                Ok(ActionOutcome::DefaultPermissionsUpdated {
                    project: data.require_project_path()?.to_string(),
                    rules,
                })
            }
            Action::CreateSchedule => Ok(ActionOutcome::ScheduleCreated(
                self.schedules.create_schedule(session, &data.schedule_spec()).await?,
            )),
        }
    }
}
