// Workbook service - project lookup, workbook queries and publishing
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use crate::application::tableau_api::TableauApi;
use crate::domain::project_data::ProjectData;
use crate::domain::resources::{NewWorkbook, Session, Workbook};
use crate::infrastructure::error::TableauError;

/// Result of a publish: the stored workbook and the tags it ended up with.
#[derive(Debug, Clone)]
pub struct PublishedWorkbook {
    pub workbook: Workbook,
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct WorkbookService {
    api: Arc<dyn TableauApi>,
}

impl WorkbookService {
    pub fn new(api: Arc<dyn TableauApi>) -> Self {
        Self { api }
    }

    pub async fn find_project_id(&self, session: &Session, project_name: &str) -> anyhow::Result<String> {
        let projects = self.api.find_projects(session, project_name).await?;
        projects
            .into_iter()
            .find(|p| p.name == project_name)
            .map(|p| p.id)
            .ok_or_else(|| TableauError::not_found("project", project_name).into())
    }

    pub async fn list_workbooks(&self, session: &Session) -> anyhow::Result<Vec<Workbook>> {
        Ok(self.api.list_workbooks(session).await?)
    }

    /// Exact-name lookup, narrowed to `project` when given.
    pub async fn find_workbook(
        &self,
        session: &Session,
        name: &str,
        project: Option<&str>,
    ) -> anyhow::Result<Workbook> {
        let workbooks = self.api.find_workbooks(session, name).await?;
        workbooks
            .into_iter()
            .filter(|w| w.name == name)
            .find(|w| match project {
                Some(project) => w.project_name.as_deref() == Some(project),
                None => true,
            })
            .ok_or_else(|| TableauError::not_found("workbook", name).into())
    }

    pub async fn publish(
        &self,
        session: &Session,
        data: &ProjectData,
        workbooks_dir: &Path,
    ) -> anyhow::Result<PublishedWorkbook> {
        let project_path = data.require_project_path()?;
        let file_path = data.require_file_path()?;

        let project_id = self
            .find_project_id(session, project_path)
            .await
            .with_context(|| format!("The project for {} workbook could not be found", file_path))?;

        let new_workbook = NewWorkbook::new(
            data.publish_name()?,
            project_id,
            data.show_tabs,
            data.hidden_views.clone(),
        );
        let file = workbooks_dir.join(file_path);

        let workbook = self
            .api
            .publish_workbook(session, &new_workbook, &file)
            .await
            .with_context(|| format!("{} workbook is not published", file_path))?;

        tracing::info!(
            "Published {} as workbook {} in project {}",
            file_path,
            workbook.id,
            project_path
        );

        let tags = if data.tags.is_empty() {
            workbook.tags.clone()
        } else {
            let tags = self
                .api
                .add_workbook_tags(session, &workbook.id, &data.tags)
                .await
                .with_context(|| format!("Could not tag workbook {}", workbook.name))?;
            tracing::info!("Tagged workbook {} with {:?}", workbook.id, tags);
            tags
        };

        Ok(PublishedWorkbook { workbook, tags })
    }
}
