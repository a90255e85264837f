// Console report for finished jobs
use crate::application::runner::ActionOutcome;
use crate::domain::permission::PermissionRule;
use crate::domain::project_data::ProjectData;

/// Render the outcome of one entry the way it is printed to stdout.
pub fn render_outcome(data: &ProjectData, outcome: &ActionOutcome) -> String {
    let mut out = String::new();

    match outcome {
        ActionOutcome::Workbooks(workbooks) => {
            out.push_str(&format!("Workbooks on site {}:\n", data.site_label()));
            for workbook in workbooks {
                out.push_str(&format!(
                    "\t{}\t{}\t{}",
                    workbook.id,
                    workbook.name,
                    workbook.project_name.as_deref().unwrap_or("-")
                ));
                if let Some(updated_at) = workbook.updated_at {
                    out.push_str(&format!("\tupdated {}", updated_at.format("%Y-%m-%d %H:%M")));
                }
                out.push('\n');
            }
        }
        ActionOutcome::Published(published) => {
            out.push_str(&format!(
                "\nSuccessfully published {} Workbook in {} project in {} site.\n",
                data.file_path.as_deref().unwrap_or(&published.workbook.name),
                data.project_path.as_deref().unwrap_or("-"),
                data.site_label()
            ));
            if !data.tags.is_empty() {
                out.push_str(&format!(
                    "\nUpdate Workbook Successfully and set Tags: {}\n",
                    published.tags.join(", ")
                ));
            }
        }
        ActionOutcome::PermissionAdded(change) => {
            out.push_str(&format!(
                "Set {} to {} for user {} ({}) on workbook {}.\n",
                change.capability,
                change.mode,
                change.user.name,
                change.user.site_role.as_deref().unwrap_or("unknown role"),
                change.workbook.name
            ));
            render_rules(&mut out, &change.rules);
        }
        ActionOutcome::PermissionDeleted(change) => {
            out.push_str(&format!(
                "Removed {} {} for user {} on workbook {}.\n",
                change.capability, change.mode, change.user.name, change.workbook.name
            ));
        }
        ActionOutcome::DefaultPermissionsUpdated { project, rules } => {
            out.push_str(&format!("Default workbook permissions of project {}:\n", project));
            render_rules(&mut out, rules);
        }
        ActionOutcome::ScheduleCreated(schedule) => {
            out.push_str(&format!("Created schedule {} ({}).\n", schedule.name, schedule.id));
            if let Some(state) = &schedule.state {
                out.push_str(&format!("\tstate: {}\n", state));
            }
            if let Some(next_run_at) = &schedule.next_run_at {
                out.push_str(&format!("\tnext run: {}\n", next_run_at.to_rfc3339()));
            }
        }
    }

    out
}

fn render_rules(out: &mut String, rules: &[PermissionRule]) {
    for rule in rules {
        out.push_str(&format!(
            "\nCapabilities for {} {}:\n",
            rule.grantee.kind.tag_name(),
            rule.grantee.id
        ));
        for (capability, mode) in &rule.capabilities {
            out.push_str(&format!("\t{} - {}\n", capability, mode));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::workbook_service::PublishedWorkbook;
    use crate::domain::permission::{Capability, CapabilityMode, Grantee};
    use crate::domain::project_data::parse_project_data;
    use crate::domain::resources::Workbook;

    fn stored_workbook() -> Workbook {
        Workbook {
            id: "wb-1".to_string(),
            name: "Revenue".to_string(),
            content_url: None,
            show_tabs: false,
            project_id: Some("proj-1".to_string()),
            project_name: Some("Quarterly".to_string()),
            tags: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_render_publish() {
        let data = parse_project_data(
            r#"{"server_url": "x", "site_name": "finance", "project_path": "Quarterly", "file_path": "Revenue.twbx", "tags": ["a", "b"]}"#,
        )
        .unwrap()
        .remove(0);
        let outcome = ActionOutcome::Published(PublishedWorkbook {
            workbook: stored_workbook(),
            tags: vec!["a".to_string(), "b".to_string()],
        });

        let text = render_outcome(&data, &outcome);
        assert!(text.contains("Successfully published Revenue.twbx Workbook in Quarterly project in finance site."));
        assert!(text.contains("set Tags: a, b"));
    }

    #[test]
    fn test_render_default_permissions() {
        let data = parse_project_data(r#"{"server_url": "x"}"#).unwrap().remove(0);
        let outcome = ActionOutcome::DefaultPermissionsUpdated {
            project: "Quarterly".to_string(),
            rules: vec![PermissionRule::new(Grantee::group("g-1")).with(Capability::AddComment, CapabilityMode::Deny)],
        };

        let text = render_outcome(&data, &outcome);
        assert!(text.contains("Capabilities for group g-1:"));
        assert!(text.contains("\tAddComment - Deny\n"));
    }

    #[test]
    fn test_render_workbook_list() {
        let data = parse_project_data(r#"{"server_url": "x", "is_site_default": true}"#).unwrap().remove(0);
        let text = render_outcome(&data, &ActionOutcome::Workbooks(vec![stored_workbook()]));
        assert_eq!(text, "Workbooks on site Default:\n\twb-1\tRevenue\tQuarterly\n");
    }
}
