// Permission domain model - capabilities, modes and grantee rules
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::infrastructure::error::TableauError;

/// A named permission on a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    AddComment,
    ChangeHierarchy,
    ChangePermissions,
    CreateRefreshMetrics,
    Delete,
    ExportData,
    ExportImage,
    ExportXml,
    Filter,
    Read,
    RunExplainData,
    ShareView,
    ViewComments,
    ViewUnderlyingData,
    WebAuthoring,
    Write,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::AddComment,
        Capability::ChangeHierarchy,
        Capability::ChangePermissions,
        Capability::CreateRefreshMetrics,
        Capability::Delete,
        Capability::ExportData,
        Capability::ExportImage,
        Capability::ExportXml,
        Capability::Filter,
        Capability::Read,
        Capability::RunExplainData,
        Capability::ShareView,
        Capability::ViewComments,
        Capability::ViewUnderlyingData,
        Capability::WebAuthoring,
        Capability::Write,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::AddComment => "AddComment",
            Capability::ChangeHierarchy => "ChangeHierarchy",
            Capability::ChangePermissions => "ChangePermissions",
            Capability::CreateRefreshMetrics => "CreateRefreshMetrics",
            Capability::Delete => "Delete",
            Capability::ExportData => "ExportData",
            Capability::ExportImage => "ExportImage",
            Capability::ExportXml => "ExportXml",
            Capability::Filter => "Filter",
            Capability::Read => "Read",
            Capability::RunExplainData => "RunExplainData",
            Capability::ShareView => "ShareView",
            Capability::ViewComments => "ViewComments",
            Capability::ViewUnderlyingData => "ViewUnderlyingData",
            Capability::WebAuthoring => "WebAuthoring",
            Capability::Write => "Write",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = TableauError;

    /// Matches case-insensitively so hand-written JSON templates can say `addcomment`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TableauError::InvalidCapability(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityMode {
    Allow,
    Deny,
}

impl CapabilityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityMode::Allow => "Allow",
            CapabilityMode::Deny => "Deny",
        }
    }
}

impl fmt::Display for CapabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityMode {
    type Err = TableauError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(CapabilityMode::Allow),
            "deny" => Ok(CapabilityMode::Deny),
            _ => Err(TableauError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranteeKind {
    User,
    Group,
}

impl GranteeKind {
    /// Element name used for the grantee in permission payloads.
    pub fn tag_name(&self) -> &'static str {
        match self {
            GranteeKind::User => "user",
            GranteeKind::Group => "group",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grantee {
    pub kind: GranteeKind,
    pub id: String,
}

impl Grantee {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: GranteeKind::User,
            id: id.into(),
        }
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self {
            kind: GranteeKind::Group,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionRule {
    pub grantee: Grantee,
    pub capabilities: BTreeMap<Capability, CapabilityMode>,
}

impl PermissionRule {
    pub fn new(grantee: Grantee) -> Self {
        Self {
            grantee,
            capabilities: BTreeMap::new(),
        }
    }

    pub fn with(mut self, capability: Capability, mode: CapabilityMode) -> Self {
        self.capabilities.insert(capability, mode);
        self
    }

    pub fn mode_of(&self, capability: Capability) -> Option<CapabilityMode> {
        self.capabilities.get(&capability).copied()
    }
}
