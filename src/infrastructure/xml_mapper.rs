// Mapper between domain models and tsRequest/tsResponse types
use chrono::{DateTime, Utc};

use crate::domain::permission::{Capability, CapabilityMode, Grantee, GranteeKind, PermissionRule};
use crate::domain::resources::{NewSchedule, NewWorkbook, Project, Schedule, ServerInfo, Session, User, Workbook};
use crate::infrastructure::error::{ApiError, TableauError};
use crate::infrastructure::ts_xml::{
    CapabilitiesXml, CapabilityXml, CredentialsRequestXml, CredentialsXml, ErrorXml, FrequencyDetailsXml,
    GranteeCapabilitiesXml, IdRef, IntervalXml, IntervalsXml, PermissionsXml, ProjectXml, ScheduleRequestXml,
    ScheduleXml, ServerInfoXml, SiteRequestXml, TagXml, TagsXml, TsRequest, UserXml, ViewXml, ViewsXml,
    WorkbookRequestXml, WorkbookXml,
};

pub fn api_error_from_xml(error: ErrorXml) -> ApiError {
    ApiError {
        code: error.code,
        summary: error.summary.unwrap_or_default(),
        detail: error.detail.unwrap_or_default(),
    }
}

pub fn session_from_xml(credentials: CredentialsXml) -> Session {
    Session {
        token: credentials.token,
        site_id: credentials.site.id,
        user_id: credentials.user.id,
    }
}

pub fn server_info_from_xml(info: ServerInfoXml) -> ServerInfo {
    ServerInfo {
        product_version: info.product_version.value,
        rest_api_version: info.rest_api_version,
    }
}

pub fn project_from_xml(project: ProjectXml) -> Project {
    Project {
        id: project.id,
        name: project.name,
        description: project.description.filter(|d| !d.is_empty()),
        parent_id: project.parent_project_id,
    }
}

pub fn workbook_from_xml(workbook: WorkbookXml) -> Workbook {
    let (project_id, project_name) = match workbook.project {
        Some(project) => (Some(project.id), project.name),
        None => (None, None),
    };

    Workbook {
        id: workbook.id,
        name: workbook.name,
        content_url: workbook.content_url,
        show_tabs: workbook.show_tabs.unwrap_or(false),
        project_id,
        project_name,
        tags: workbook
            .tags
            .map(|tags| tags.items.into_iter().map(|t| t.label).collect())
            .unwrap_or_default(),
        created_at: workbook.created_at.as_deref().and_then(parse_timestamp),
        updated_at: workbook.updated_at.as_deref().and_then(parse_timestamp),
    }
}

pub fn user_from_xml(user: UserXml) -> User {
    User {
        id: user.id,
        name: user.name,
        site_role: user.site_role,
    }
}

pub fn schedule_from_xml(schedule: ScheduleXml) -> Schedule {
    Schedule {
        id: schedule.id,
        name: schedule.name,
        state: schedule.state,
        next_run_at: schedule.next_run_at.as_deref().and_then(parse_timestamp),
    }
}

/// Server rules become domain rules; capabilities this tool doesn't know are skipped.
pub fn rules_from_xml(permissions: PermissionsXml) -> Vec<PermissionRule> {
    permissions
        .grantees
        .into_iter()
        .filter_map(|entry| {
            let grantee = match (entry.user, entry.group) {
                (Some(user), _) => Grantee::user(user.id),
                (None, Some(group)) => Grantee::group(group.id),
                (None, None) => {
                    tracing::warn!("Skipping permission entry without a grantee");
                    return None;
                }
            };

            let mut rule = PermissionRule::new(grantee);
            for capability in entry.capabilities.items {
                match (capability.name.parse::<Capability>(), capability.mode.parse::<CapabilityMode>()) {
                    (Ok(c), Ok(m)) => {
                        rule.capabilities.insert(c, m);
                    }
                    _ => {
                        tracing::debug!(
                            "Ignoring capability {}={} for grantee {}",
                            capability.name,
                            capability.mode,
                            rule.grantee.id
                        );
                    }
                }
            }
            Some(rule)
        })
        .collect()
}

fn rule_to_xml(rule: &PermissionRule) -> GranteeCapabilitiesXml {
    let grantee = IdRef::new(rule.grantee.id.clone());
    let (user, group) = match rule.grantee.kind {
        GranteeKind::User => (Some(grantee), None),
        GranteeKind::Group => (None, Some(grantee)),
    };

    GranteeCapabilitiesXml {
        user,
        group,
        capabilities: CapabilitiesXml {
            items: rule
                .capabilities
                .iter()
                .map(|(capability, mode)| CapabilityXml {
                    name: capability.to_string(),
                    mode: mode.to_string(),
                })
                .collect(),
        },
    }
}

pub fn sign_in_request(username: &str, password: &str, site_content_url: &str) -> TsRequest {
    TsRequest {
        credentials: Some(CredentialsRequestXml {
            name: username.to_string(),
            password: password.to_string(),
            site: SiteRequestXml {
                content_url: site_content_url.to_string(),
            },
        }),
        ..TsRequest::default()
    }
}

pub fn publish_request(workbook: &NewWorkbook) -> TsRequest {
    let views = if workbook.hidden_views.is_empty() {
        None
    } else {
        Some(ViewsXml {
            items: workbook
                .hidden_views
                .iter()
                .map(|name| ViewXml {
                    name: name.clone(),
                    hidden: true,
                })
                .collect(),
        })
    };

    TsRequest {
        workbook: Some(WorkbookRequestXml {
            name: workbook.name.clone(),
            show_tabs: workbook.show_tabs,
            project: IdRef::new(workbook.project_id.clone()),
            views,
        }),
        ..TsRequest::default()
    }
}

pub fn tags_request(tags: &[String]) -> TsRequest {
    TsRequest {
        tags: Some(TagsXml {
            items: tags.iter().map(|label| TagXml { label: label.clone() }).collect(),
        }),
        ..TsRequest::default()
    }
}

pub fn workbook_permissions_request(workbook_id: &str, rules: &[PermissionRule]) -> TsRequest {
    TsRequest {
        permissions: Some(PermissionsXml {
            workbook: Some(IdRef::new(workbook_id)),
            project: None,
            grantees: rules.iter().map(rule_to_xml).collect(),
        }),
        ..TsRequest::default()
    }
}

pub fn default_permissions_request(rules: &[PermissionRule]) -> TsRequest {
    TsRequest {
        permissions: Some(PermissionsXml {
            workbook: None,
            project: None,
            grantees: rules.iter().map(rule_to_xml).collect(),
        }),
        ..TsRequest::default()
    }
}

pub fn schedule_request(schedule: &NewSchedule) -> TsRequest {
    TsRequest {
        schedule: Some(ScheduleRequestXml {
            name: schedule.name.clone(),
            priority: schedule.priority,
            schedule_type: schedule.schedule_type.clone(),
            frequency: "Hourly".to_string(),
            execution_order: schedule.execution_order.clone(),
            frequency_details: FrequencyDetailsXml {
                start: schedule.start_time.format("%H:%M:%S").to_string(),
                end: schedule.end_time.format("%H:%M:%S").to_string(),
                intervals: IntervalsXml {
                    items: vec![IntervalXml {
                        hours: schedule.interval_hours,
                    }],
                },
            },
        }),
        ..TsRequest::default()
    }
}

/// Pull a required section out of a response, naming it in the error.
pub fn require<T>(section: Option<T>, name: &str) -> Result<T, TableauError> {
    section.ok_or_else(|| TableauError::Xml(format!("response is missing <{}>", name)))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ts_xml::{parse_response, to_request_xml};
    use chrono::NaiveTime;

    #[test]
    fn test_workbook_mapping() {
        let body = r#"<tsResponse>
  <workbook id="wb-1" name="Revenue" contentUrl="Revenue" showTabs="true"
            createdAt="2024-03-01T10:15:00Z" updatedAt="not-a-date">
    <project id="proj-1" name="Quarterly"/>
    <owner id="user-1"/>
    <tags><tag label="finance"/><tag label="q3"/></tags>
  </workbook>
</tsResponse>"#;
        let workbook = workbook_from_xml(parse_response(body).unwrap().workbook.unwrap());

        assert_eq!(workbook.id, "wb-1");
        assert!(workbook.show_tabs);
        assert_eq!(workbook.project_id.as_deref(), Some("proj-1"));
        assert_eq!(workbook.project_name.as_deref(), Some("Quarterly"));
        assert_eq!(workbook.tags, vec!["finance".to_string(), "q3".to_string()]);
        assert_eq!(workbook.created_at.unwrap().to_rfc3339(), "2024-03-01T10:15:00+00:00");
        assert!(workbook.updated_at.is_none());
    }

    #[test]
    fn test_rules_skip_unknown_capabilities() {
        let body = r#"<tsResponse><permissions>
  <granteeCapabilities>
    <group id="g-1"/>
    <capabilities>
      <capability name="Read" mode="Allow"/>
      <capability name="SomeFutureThing" mode="Allow"/>
    </capabilities>
  </granteeCapabilities>
</permissions></tsResponse>"#;
        let rules = rules_from_xml(parse_response(body).unwrap().permissions.unwrap());

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].grantee.kind, GranteeKind::Group);
        assert_eq!(rules[0].capabilities.len(), 1);
        assert_eq!(rules[0].mode_of(Capability::Read), Some(CapabilityMode::Allow));
    }

    #[test]
    fn test_publish_request_lists_hidden_views() {
        let workbook = NewWorkbook::new(
            "Revenue".to_string(),
            "proj-1".to_string(),
            false,
            vec!["Scratch".to_string()],
        );
        let xml = to_request_xml(&publish_request(&workbook)).unwrap();

        assert!(xml.contains(r#"<workbook name="Revenue" showTabs="false">"#));
        assert!(xml.contains(r#"<project id="proj-1"/>"#));
        assert!(xml.contains(r#"<view name="Scratch" hidden="true"/>"#));
    }

    #[test]
    fn test_publish_request_without_hidden_views_has_no_views_element() {
        let workbook = NewWorkbook::new("Revenue".to_string(), "proj-1".to_string(), true, vec![]);
        let xml = to_request_xml(&publish_request(&workbook)).unwrap();
        assert!(!xml.contains("<views"));
    }

    #[test]
    fn test_schedule_request_formats_window() {
        let schedule = NewSchedule {
            name: "Hourly-Schedule".to_string(),
            priority: 50,
            schedule_type: "Extract".to_string(),
            execution_order: "Parallel".to_string(),
            start_time: NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            interval_hours: 2,
        };
        let xml = to_request_xml(&schedule_request(&schedule)).unwrap();

        assert!(xml.contains(r#"frequency="Hourly""#));
        assert!(xml.contains(r#"type="Extract""#));
        assert!(xml.contains(r#"<frequencyDetails start="02:30:00" end="23:00:00">"#));
        assert!(xml.contains(r#"<interval hours="2"/>"#));
    }

    #[test]
    fn test_require_names_missing_section() {
        let err = require::<()>(None, "credentials").unwrap_err();
        assert_eq!(err.to_string(), "Malformed XML: response is missing <credentials>");
    }
}
