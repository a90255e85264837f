// Permission service - per-user workbook grants and project default permissions
use anyhow::Context;
use std::sync::Arc;

use crate::application::tableau_api::TableauApi;
use crate::application::workbook_service::WorkbookService;
use crate::domain::permission::{Capability, CapabilityMode, Grantee, PermissionRule};
use crate::domain::project_data::ProjectData;
use crate::domain::resources::{Session, User, Workbook};
use crate::infrastructure::error::TableauError;

/// Capability applied to project defaults when the entry names none.
const DEFAULT_CAPABILITY: Capability = Capability::AddComment;
const DEFAULT_MODE: CapabilityMode = CapabilityMode::Deny;

#[derive(Debug, Clone)]
pub struct PermissionChange {
    pub workbook: Workbook,
    pub user: User,
    pub capability: Capability,
    pub mode: CapabilityMode,
    /// Rules on the workbook after the change (empty for deletions).
    pub rules: Vec<PermissionRule>,
}

#[derive(Clone)]
pub struct PermissionService {
    api: Arc<dyn TableauApi>,
    workbooks: WorkbookService,
}

impl PermissionService {
    pub fn new(api: Arc<dyn TableauApi>) -> Self {
        let workbooks = WorkbookService::new(api.clone());
        Self { api, workbooks }
    }

    async fn find_user(&self, session: &Session, name: &str) -> anyhow::Result<User> {
        let users = self.api.find_users(session, name).await?;
        users
            .into_iter()
            .find(|u| u.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| TableauError::not_found("user", name).into())
    }

    async fn resolve(
        &self,
        session: &Session,
        data: &ProjectData,
    ) -> anyhow::Result<(Workbook, User, Capability, CapabilityMode)> {
        let workbook_name = data.require_workbook_name()?;
        let user_name = data.require_user_name()?;
        let capability = data.require_capability()?;
        let mode = data.require_mode()?;

        let workbook = self
            .workbooks
            .find_workbook(session, workbook_name, data.project_path.as_deref())
            .await?;
        let user = self.find_user(session, user_name).await?;

        tracing::debug!(
            "Resolved workbook {} ({}) and user {} ({})",
            workbook.name,
            workbook.id,
            user.name,
            user.id
        );
        Ok((workbook, user, capability, mode))
    }

    pub async fn add_user_permission(&self, session: &Session, data: &ProjectData) -> anyhow::Result<PermissionChange> {
        let (workbook, user, capability, mode) = self.resolve(session, data).await?;

        let grantee = Grantee::user(user.id.clone());
        let rule = PermissionRule::new(grantee.clone()).with(capability, mode);
        self.api
            .add_workbook_permissions(session, &workbook.id, &[rule])
            .await
            .with_context(|| format!("Could not grant {} {} to {} on {}", capability, mode, user.name, workbook.name))?;

        tracing::info!("Granted {}={} on workbook {} to user {}", capability, mode, workbook.name, user.name);

        // The PUT only echoes the new grants
        let rules = self
            .api
            .query_workbook_permissions(session, &workbook.id)
            .await
            .with_context(|| format!("Could not read permissions of workbook {}", workbook.name))?;

        let effective = rules
            .iter()
            .find(|r| r.grantee == grantee)
            .and_then(|r| r.mode_of(capability));
        if effective != Some(mode) {
            tracing::warn!(
                "Workbook {} reports {:?} for {} of user {} after granting {}",
                workbook.name,
                effective,
                capability,
                user.name,
                mode
            );
        }

        Ok(PermissionChange {
            workbook,
            user,
            capability,
            mode,
            rules,
        })
    }

    pub async fn delete_user_permission(&self, session: &Session, data: &ProjectData) -> anyhow::Result<PermissionChange> {
        let (workbook, user, capability, mode) = self.resolve(session, data).await?;

        self.api
            .delete_workbook_permission(session, &workbook.id, &user.id, capability, mode)
            .await
            .with_context(|| format!("Could not remove {} {} from {} on {}", capability, mode, user.name, workbook.name))?;

        tracing::info!("Removed {}={} on workbook {} from user {}", capability, mode, workbook.name, user.name);
        Ok(PermissionChange {
            workbook,
            user,
            capability,
            mode,
            rules: Vec::new(),
        })
    }

    /// Set one capability for every grantee of the project's default workbook permissions.
    pub async fn update_default_permissions(
        &self,
        session: &Session,
        data: &ProjectData,
    ) -> anyhow::Result<Vec<PermissionRule>> {
        let project_name = data.require_project_path()?;
        let capability = match data.permission_name.as_deref() {
            Some(_) => data.require_capability()?,
            None => DEFAULT_CAPABILITY,
        };
        let mode = match data.permission_mode.as_deref() {
            Some(_) => data.require_mode()?,
            None => DEFAULT_MODE,
        };

        let project_id = self.workbooks.find_project_id(session, project_name).await?;
        tracing::info!("project name:{} and id: {}", project_name, project_id);

        let existing = self
            .api
            .query_default_workbook_permissions(session, &project_id)
            .await?;
        if existing.is_empty() {
            tracing::warn!("Project {} has no default workbook permissions to update", project_name);
            return Ok(Vec::new());
        }

        let rules: Vec<PermissionRule> = existing
            .into_iter()
            .map(|rule| PermissionRule::new(rule.grantee).with(capability, mode))
            .collect();

        let updated = self
            .api
            .update_default_workbook_permissions(session, &project_id, &rules)
            .await
            .with_context(|| format!("Could not update default permissions of project {}", project_name))?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{project, session, user, workbook, FakeApi};
    use crate::domain::project_data::parse_project_data;

    fn grant_data(mode: &str) -> ProjectData {
        let json = format!(
            r#"{{"server_url": "http://tableau", "name": "Revenue", "user_name": "jdoe",
                "permission_name": "AddComment", "permission_mode": "{}", "action": "add_permission"}}"#,
            mode
        );
        parse_project_data(&json).unwrap().remove(0)
    }

    fn seeded_api() -> Arc<FakeApi> {
        let api = FakeApi::default();
        api.workbooks.lock().unwrap().push(workbook("wb-1", "Revenue", "Quarterly"));
        api.users.lock().unwrap().push(user("user-7", "JDoe"));
        Arc::new(api)
    }

    #[tokio::test]
    async fn test_add_user_permission_grants_single_capability() {
        let api = seeded_api();
        let service = PermissionService::new(api.clone());

        let change = service.add_user_permission(&session(), &grant_data("Allow")).await.unwrap();

        assert_eq!(change.workbook.id, "wb-1");
        assert_eq!(change.user.id, "user-7");
        assert_eq!(change.rules.len(), 1);
        assert_eq!(change.rules[0].grantee, Grantee::user("user-7"));
        assert_eq!(change.rules[0].mode_of(Capability::AddComment), Some(CapabilityMode::Allow));
    }

    #[tokio::test]
    async fn test_add_user_permission_returns_all_workbook_rules() {
        let api = seeded_api();
        api.workbook_rules
            .lock()
            .unwrap()
            .push(PermissionRule::new(Grantee::group("g-1")).with(Capability::Read, CapabilityMode::Allow));
        let service = PermissionService::new(api.clone());

        let change = service.add_user_permission(&session(), &grant_data("Deny")).await.unwrap();

        assert_eq!(change.rules.len(), 2);
        assert_eq!(change.rules[0].grantee, Grantee::group("g-1"));
        assert_eq!(change.rules[1].grantee, Grantee::user("user-7"));
        assert_eq!(change.rules[1].mode_of(Capability::AddComment), Some(CapabilityMode::Deny));
        assert!(
            api.calls()
                .ends_with(&["add_workbook_permissions", "query_workbook_permissions"])
        );
    }

    #[tokio::test]
    async fn test_delete_user_permission_targets_user_grant() {
        let api = seeded_api();
        let service = PermissionService::new(api.clone());

        service.delete_user_permission(&session(), &grant_data("Deny")).await.unwrap();

        let deleted = api.deleted.lock().unwrap();
        assert_eq!(
            deleted.as_slice(),
            &[(
                "wb-1".to_string(),
                "user-7".to_string(),
                Capability::AddComment,
                CapabilityMode::Deny
            )]
        );
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let api = FakeApi::default();
        api.workbooks.lock().unwrap().push(workbook("wb-1", "Revenue", "Quarterly"));
        let service = PermissionService::new(Arc::new(api));

        let err = service.add_user_permission(&session(), &grant_data("Allow")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TableauError>(),
            Some(TableauError::NotFound { kind: "user", .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_mode_fails_before_any_call() {
        let api = seeded_api();
        let service = PermissionService::new(api.clone());

        let err = service.add_user_permission(&session(), &grant_data("Sometimes")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<TableauError>(), Some(TableauError::InvalidMode(_))));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_default_permissions_rewrites_every_grantee() {
        let api = FakeApi::default();
        api.projects.lock().unwrap().push(project("proj-1", "Quarterly"));
        api.default_rules.lock().unwrap().extend([
            PermissionRule::new(Grantee::group("g-1")).with(Capability::Read, CapabilityMode::Allow),
            PermissionRule::new(Grantee::user("u-2")).with(Capability::AddComment, CapabilityMode::Allow),
        ]);
        let api = Arc::new(api);
        let service = PermissionService::new(api.clone());

        let data = parse_project_data(r#"{"server_url": "http://tableau", "project_path": "Quarterly"}"#)
            .unwrap()
            .remove(0);
        let updated = service.update_default_permissions(&session(), &data).await.unwrap();

        assert_eq!(updated.len(), 2);
        for rule in &updated {
            assert_eq!(rule.capabilities.len(), 1);
            assert_eq!(rule.mode_of(Capability::AddComment), Some(CapabilityMode::Deny));
        }
        assert_eq!(updated[0].grantee, Grantee::group("g-1"));
    }

    #[tokio::test]
    async fn test_update_default_permissions_without_grantees_is_noop() {
        let api = FakeApi::default();
        api.projects.lock().unwrap().push(project("proj-1", "Quarterly"));
        let api = Arc::new(api);
        let service = PermissionService::new(api.clone());

        let data = parse_project_data(r#"{"server_url": "http://tableau", "project_path": "Quarterly"}"#)
            .unwrap()
            .remove(0);
        let updated = service.update_default_permissions(&session(), &data).await.unwrap();

        assert!(updated.is_empty());
        assert!(!api.calls().contains(&"update_default_workbook_permissions"));
    }
}
