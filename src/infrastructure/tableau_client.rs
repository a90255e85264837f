// Tableau REST API client
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode};
use std::path::Path;

use crate::application::tableau_api::{ApiResult, TableauApi};
use crate::domain::permission::{Capability, CapabilityMode, PermissionRule};
use crate::domain::resources::{NewSchedule, NewWorkbook, Project, Schedule, ServerInfo, Session, User, Workbook};
use crate::infrastructure::config::ClientSettings;
use crate::infrastructure::error::TableauError;
use crate::infrastructure::multipart::{publish_body, workbook_file_name};
use crate::infrastructure::ts_xml::{parse_response, to_request_xml, TsRequest, TsResponse};
use crate::infrastructure::xml_mapper::{self, require};

const AUTH_HEADER: &str = "X-Tableau-Auth";

/// Oldest REST version that serves `serverinfo`.
const SERVER_INFO_API_VERSION: &str = "2.4";

/// Largest file Tableau accepts in a single publish request.
pub const MAX_SINGLE_PUBLISH_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct TableauClient {
    server_url: String,
    api_version: String,
    page_size: u32,
    http: reqwest::Client,
}

impl TableauClient {
    pub fn new(server_url: &str, api_version: impl Into<String>, settings: &ClientSettings) -> Result<Self, TableauError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            page_size: settings.page_size,
            http,
        })
    }

    /// Build a client, asking the server for its REST API version when configured to.
    pub async fn connect(server_url: &str, settings: &ClientSettings) -> Result<Self, TableauError> {
        let mut client = Self::new(server_url, settings.api_version.clone(), settings)?;

        if settings.use_server_version {
            match client.server_info().await {
                Ok(info) => {
                    tracing::info!(
                        "Tableau Server {} speaks REST API {}",
                        info.product_version,
                        info.rest_api_version
                    );
                    client.api_version = info.rest_api_version;
                }
                Err(e) => {
                    tracing::warn!(
                        "Could not determine server REST API version, using {}: {}",
                        settings.api_version,
                        e
                    );
                }
            }
        }

        Ok(client)
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}/{}", self.server_url, self.api_version, path)
    }

    fn site_url(&self, session: &Session, path: &str) -> String {
        self.api_url(&format!("sites/{}/{}", session.site_id, path))
    }

    fn name_filter(&self, name: &str) -> String {
        format!("pageSize={}&filter=name:eq:{}", self.page_size, urlencoding::encode(name))
    }

    fn authed(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.header(AUTH_HEADER, &session.token)
    }

    fn with_xml(request: RequestBuilder, payload: &TsRequest) -> Result<RequestBuilder, TableauError> {
        let xml = to_request_xml(payload)?;
        Ok(request.header(CONTENT_TYPE, "text/xml").body(xml))
    }

    /// Send a request and insist on one status code; anything else carries the server's `<error>`.
    async fn execute(&self, request: RequestBuilder, expected: StatusCode) -> Result<String, TableauError> {
        let response = request.send().await?;
        let status = response.status();

        if status != expected {
            let body = response.text().await.unwrap_or_default();
            let api_error = parse_response(&body)
                .ok()
                .and_then(|r| r.error)
                .map(xml_mapper::api_error_from_xml);
            tracing::debug!("Tableau request failed with status {}: {}", status, body);
            return Err(TableauError::UnexpectedStatus {
                status,
                expected,
                api_error,
            });
        }

        Ok(response.text().await?)
    }

    async fn execute_xml(&self, request: RequestBuilder, expected: StatusCode) -> Result<TsResponse, TableauError> {
        let body = self.execute(request, expected).await?;
        parse_response(&body)
    }
}

#[async_trait]
impl TableauApi for TableauClient {
    async fn server_info(&self) -> ApiResult<ServerInfo> {
        let url = format!("{}/api/{}/serverinfo", self.server_url, SERVER_INFO_API_VERSION);
        let response = self.execute_xml(self.http.get(&url), StatusCode::OK).await?;
        Ok(xml_mapper::server_info_from_xml(require(response.server_info, "serverInfo")?))
    }

    async fn sign_in(&self, username: &str, password: &str, site_content_url: &str) -> ApiResult<Session> {
        let payload = xml_mapper::sign_in_request(username, password, site_content_url);
        let request = Self::with_xml(self.http.post(self.api_url("auth/signin")), &payload)?;

        let response = self.execute_xml(request, StatusCode::OK).await?;
        let session = xml_mapper::session_from_xml(require(response.credentials, "credentials")?);
        tracing::debug!("Signed in to site {} as user {}", session.site_id, session.user_id);
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> ApiResult<()> {
        let request = self.authed(self.http.post(self.api_url("auth/signout")), session);
        self.execute(request, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    async fn find_projects(&self, session: &Session, name: &str) -> ApiResult<Vec<Project>> {
        let url = self.site_url(session, &format!("projects?{}", self.name_filter(name)));
        let response = self.execute_xml(self.authed(self.http.get(&url), session), StatusCode::OK).await?;

        Ok(response
            .projects
            .unwrap_or_default()
            .items
            .into_iter()
            .map(xml_mapper::project_from_xml)
            .collect())
    }

    async fn list_workbooks(&self, session: &Session) -> ApiResult<Vec<Workbook>> {
        let url = self.site_url(session, &format!("workbooks?pageSize={}", self.page_size));
        let response = self.execute_xml(self.authed(self.http.get(&url), session), StatusCode::OK).await?;

        if let Some(pagination) = &response.pagination {
            if pagination.total_available > pagination.page_size {
                tracing::warn!(
                    "Site has {} workbooks; only the first {} are listed",
                    pagination.total_available,
                    pagination.page_size
                );
            }
        }

        Ok(response
            .workbooks
            .unwrap_or_default()
            .items
            .into_iter()
            .map(xml_mapper::workbook_from_xml)
            .collect())
    }

    async fn find_workbooks(&self, session: &Session, name: &str) -> ApiResult<Vec<Workbook>> {
        let url = self.site_url(session, &format!("workbooks?{}", self.name_filter(name)));
        let response = self.execute_xml(self.authed(self.http.get(&url), session), StatusCode::OK).await?;

        Ok(response
            .workbooks
            .unwrap_or_default()
            .items
            .into_iter()
            .map(xml_mapper::workbook_from_xml)
            .collect())
    }

    async fn find_users(&self, session: &Session, name: &str) -> ApiResult<Vec<User>> {
        let url = self.site_url(session, &format!("users?{}", self.name_filter(name)));
        let response = self.execute_xml(self.authed(self.http.get(&url), session), StatusCode::OK).await?;

        Ok(response
            .users
            .unwrap_or_default()
            .items
            .into_iter()
            .map(xml_mapper::user_from_xml)
            .collect())
    }

    async fn publish_workbook(&self, session: &Session, workbook: &NewWorkbook, file: &Path) -> ApiResult<Workbook> {
        let file_name = workbook_file_name(file)?;
        let size = tokio::fs::metadata(file).await?.len();
        if size > MAX_SINGLE_PUBLISH_BYTES {
            return Err(TableauError::InvalidWorkbookFile(format!(
                "{} is {} bytes, over the {} byte limit of a single publish request",
                file.display(),
                size,
                MAX_SINGLE_PUBLISH_BYTES
            )));
        }
        let file_bytes = tokio::fs::read(file).await?;
        let request_xml = to_request_xml(&xml_mapper::publish_request(workbook))?;
        let multipart = publish_body(&request_xml, &file_name, &file_bytes);

        tracing::info!(
            "Publishing {} ({} bytes) as '{}'",
            file.display(),
            file_bytes.len(),
            workbook.name
        );

        let url = self.site_url(session, "workbooks?overwrite=true");
        let request = self
            .authed(self.http.post(&url), session)
            .header(CONTENT_TYPE, multipart.content_type)
            .body(multipart.body);

        let response = self.execute_xml(request, StatusCode::CREATED).await?;
        Ok(xml_mapper::workbook_from_xml(require(response.workbook, "workbook")?))
    }

    async fn add_workbook_tags(&self, session: &Session, workbook_id: &str, tags: &[String]) -> ApiResult<Vec<String>> {
        let url = self.site_url(session, &format!("workbooks/{}/tags", workbook_id));
        let request = Self::with_xml(self.authed(self.http.put(&url), session), &xml_mapper::tags_request(tags))?;

        let response = self.execute_xml(request, StatusCode::OK).await?;
        Ok(response
            .tags
            .map(|t| t.items.into_iter().map(|tag| tag.label).collect())
            .unwrap_or_default())
    }

    async fn query_workbook_permissions(&self, session: &Session, workbook_id: &str) -> ApiResult<Vec<PermissionRule>> {
        let url = self.site_url(session, &format!("workbooks/{}/permissions", workbook_id));
        let response = self.execute_xml(self.authed(self.http.get(&url), session), StatusCode::OK).await?;
        Ok(xml_mapper::rules_from_xml(response.permissions.unwrap_or_default()))
    }

    async fn add_workbook_permissions(
        &self,
        session: &Session,
        workbook_id: &str,
        rules: &[PermissionRule],
    ) -> ApiResult<Vec<PermissionRule>> {
        let url = self.site_url(session, &format!("workbooks/{}/permissions", workbook_id));
        let payload = xml_mapper::workbook_permissions_request(workbook_id, rules);
        let request = Self::with_xml(self.authed(self.http.put(&url), session), &payload)?;

        let response = self.execute_xml(request, StatusCode::OK).await?;
        Ok(xml_mapper::rules_from_xml(response.permissions.unwrap_or_default()))
    }

    async fn delete_workbook_permission(
        &self,
        session: &Session,
        workbook_id: &str,
        user_id: &str,
        capability: Capability,
        mode: CapabilityMode,
    ) -> ApiResult<()> {
        let url = self.site_url(
            session,
            &format!("workbooks/{}/permissions/users/{}/{}/{}", workbook_id, user_id, capability, mode),
        );
        self.execute(self.authed(self.http.delete(&url), session), StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    async fn query_default_workbook_permissions(
        &self,
        session: &Session,
        project_id: &str,
    ) -> ApiResult<Vec<PermissionRule>> {
        let url = self.site_url(session, &format!("projects/{}/default-permissions/workbooks", project_id));
        let response = self.execute_xml(self.authed(self.http.get(&url), session), StatusCode::OK).await?;
        Ok(xml_mapper::rules_from_xml(response.permissions.unwrap_or_default()))
    }

    async fn update_default_workbook_permissions(
        &self,
        session: &Session,
        project_id: &str,
        rules: &[PermissionRule],
    ) -> ApiResult<Vec<PermissionRule>> {
        let url = self.site_url(session, &format!("projects/{}/default-permissions/workbooks", project_id));
        let payload = xml_mapper::default_permissions_request(rules);
        let request = Self::with_xml(self.authed(self.http.put(&url), session), &payload)?;

        let response = self.execute_xml(request, StatusCode::OK).await?;
        Ok(xml_mapper::rules_from_xml(response.permissions.unwrap_or_default()))
    }

    async fn create_schedule(&self, session: &Session, schedule: &NewSchedule) -> ApiResult<Schedule> {
        let payload = xml_mapper::schedule_request(schedule);
        let request = Self::with_xml(self.authed(self.http.post(self.api_url("schedules")), session), &payload)?;

        let response = self.execute_xml(request, StatusCode::CREATED).await?;
        Ok(xml_mapper::schedule_from_xml(require(response.schedule, "schedule")?))
    }
}
