// tsRequest / tsResponse wire types for the Tableau REST API
//
// Attribute fields are prefixed with `@` and must come before child elements.
use serde::{Deserialize, Serialize};

use crate::infrastructure::error::TableauError;

#[derive(Debug, Default, Deserialize)]
pub struct TsResponse {
    #[serde(default)]
    pub error: Option<ErrorXml>,
    #[serde(default)]
    pub credentials: Option<CredentialsXml>,
    #[serde(rename = "serverInfo", default)]
    pub server_info: Option<ServerInfoXml>,
    #[serde(default)]
    pub pagination: Option<PaginationXml>,
    #[serde(default)]
    pub projects: Option<ProjectsXml>,
    #[serde(default)]
    pub workbooks: Option<WorkbooksXml>,
    #[serde(default)]
    pub workbook: Option<WorkbookXml>,
    #[serde(default)]
    pub users: Option<UsersXml>,
    #[serde(default)]
    pub permissions: Option<PermissionsXml>,
    #[serde(default)]
    pub tags: Option<TagsXml>,
    #[serde(default)]
    pub schedule: Option<ScheduleXml>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorXml {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsXml {
    #[serde(rename = "@token")]
    pub token: String,
    pub site: IdRef,
    pub user: IdRef,
}

#[derive(Debug, Deserialize)]
pub struct ServerInfoXml {
    #[serde(rename = "productVersion")]
    pub product_version: TextXml,
    #[serde(rename = "restApiVersion")]
    pub rest_api_version: String,
}

#[derive(Debug, Deserialize)]
pub struct TextXml {
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PaginationXml {
    #[serde(rename = "@pageSize")]
    pub page_size: u32,
    #[serde(rename = "@totalAvailable")]
    pub total_available: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsXml {
    #[serde(rename = "project", default)]
    pub items: Vec<ProjectXml>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectXml {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@description", default)]
    pub description: Option<String>,
    #[serde(rename = "@parentProjectId", default)]
    pub parent_project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkbooksXml {
    #[serde(rename = "workbook", default)]
    pub items: Vec<WorkbookXml>,
}

#[derive(Debug, Deserialize)]
pub struct WorkbookXml {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@contentUrl", default)]
    pub content_url: Option<String>,
    #[serde(rename = "@showTabs", default)]
    pub show_tabs: Option<bool>,
    #[serde(rename = "@createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "@updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub project: Option<IdRef>,
    #[serde(default)]
    pub tags: Option<TagsXml>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersXml {
    #[serde(rename = "user", default)]
    pub items: Vec<UserXml>,
}

#[derive(Debug, Deserialize)]
pub struct UserXml {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@siteRole", default)]
    pub site_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleXml {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@state", default)]
    pub state: Option<String>,
    #[serde(rename = "@nextRunAt", default)]
    pub next_run_at: Option<String>,
}

/// Reference to another resource, e.g. `<project id="..." name="..."/>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsXml {
    #[serde(rename = "tag", default)]
    pub items: Vec<TagXml>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagXml {
    #[serde(rename = "@label")]
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsXml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<IdRef>,
    #[serde(rename = "granteeCapabilities", default)]
    pub grantees: Vec<GranteeCapabilitiesXml>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GranteeCapabilitiesXml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<IdRef>,
    #[serde(default)]
    pub capabilities: CapabilitiesXml,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitiesXml {
    #[serde(rename = "capability", default)]
    pub items: Vec<CapabilityXml>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@mode")]
    pub mode: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename = "tsRequest")]
pub struct TsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialsRequestXml>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook: Option<WorkbookRequestXml>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsXml>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsXml>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleRequestXml>,
}

#[derive(Debug, Serialize)]
pub struct CredentialsRequestXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@password")]
    pub password: String,
    pub site: SiteRequestXml,
}

#[derive(Debug, Serialize)]
pub struct SiteRequestXml {
    #[serde(rename = "@contentUrl")]
    pub content_url: String,
}

#[derive(Debug, Serialize)]
pub struct WorkbookRequestXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@showTabs")]
    pub show_tabs: bool,
    pub project: IdRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<ViewsXml>,
}

#[derive(Debug, Serialize)]
pub struct ViewsXml {
    #[serde(rename = "view")]
    pub items: Vec<ViewXml>,
}

#[derive(Debug, Serialize)]
pub struct ViewXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@hidden")]
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct ScheduleRequestXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@priority")]
    pub priority: u8,
    #[serde(rename = "@type")]
    pub schedule_type: String,
    #[serde(rename = "@frequency")]
    pub frequency: String,
    #[serde(rename = "@executionOrder")]
    pub execution_order: String,
    #[serde(rename = "frequencyDetails")]
    pub frequency_details: FrequencyDetailsXml,
}

#[derive(Debug, Serialize)]
pub struct FrequencyDetailsXml {
    #[serde(rename = "@start")]
    pub start: String,
    #[serde(rename = "@end")]
    pub end: String,
    pub intervals: IntervalsXml,
}

#[derive(Debug, Serialize)]
pub struct IntervalsXml {
    #[serde(rename = "interval")]
    pub items: Vec<IntervalXml>,
}

#[derive(Debug, Serialize)]
pub struct IntervalXml {
    #[serde(rename = "@hours")]
    pub hours: u8,
}

pub fn parse_response(body: &str) -> Result<TsResponse, TableauError> {
    quick_xml::de::from_str(body).map_err(|e| TableauError::Xml(e.to_string()))
}

pub fn to_request_xml(request: &TsRequest) -> Result<String, TableauError> {
    quick_xml::se::to_string(request).map_err(|e| TableauError::Xml(e.to_string()))
}
