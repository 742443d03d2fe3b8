//! Administrative account, invitation, and approval lifecycle models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an administrative account.
///
/// Accounts are created in `PendingApproval` and may only act once `Active`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    PendingApproval,
    Active,
    Rejected,
    Suspended,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::PendingApproval => "pending_approval",
            AdminStatus::Active => "active",
            AdminStatus::Rejected => "rejected",
            AdminStatus::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_approval" => Some(AdminStatus::PendingApproval),
            "active" => Some(AdminStatus::Active),
            "rejected" => Some(AdminStatus::Rejected),
            "suspended" => Some(AdminStatus::Suspended),
            _ => None,
        }
    }

    /// Legal transitions of the approval state machine
    pub fn can_transition_to(&self, next: AdminStatus) -> bool {
        matches!(
            (self, next),
            (AdminStatus::PendingApproval, AdminStatus::Active)
                | (AdminStatus::PendingApproval, AdminStatus::Rejected)
                | (AdminStatus::Active, AdminStatus::Suspended)
                | (AdminStatus::Suspended, AdminStatus::Active)
        )
    }
}

impl std::fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities an administrative account may hold.
///
/// A closed enumeration: an unknown capability string fails at the
/// deserialization boundary instead of passing membership checks silently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    ApproveAdmins,
    ManageSecurity,
    ManageListings,
    ManageAccounts,
    ViewReports,
}

impl AdminPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminPermission::ApproveAdmins => "approve_admins",
            AdminPermission::ManageSecurity => "manage_security",
            AdminPermission::ManageListings => "manage_listings",
            AdminPermission::ManageAccounts => "manage_accounts",
            AdminPermission::ViewReports => "view_reports",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve_admins" => Some(AdminPermission::ApproveAdmins),
            "manage_security" => Some(AdminPermission::ManageSecurity),
            "manage_listings" => Some(AdminPermission::ManageListings),
            "manage_accounts" => Some(AdminPermission::ManageAccounts),
            "view_reports" => Some(AdminPermission::ViewReports),
            _ => None,
        }
    }
}

/// Administrative role named on an invitation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Support,
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Support => "support",
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "support" => Some(AdminRole::Support),
            "admin" => Some(AdminRole::Admin),
            "super_admin" => Some(AdminRole::SuperAdmin),
            _ => None,
        }
    }
}

/// Default permission sets granted per administrative role
pub fn default_permissions(role: AdminRole) -> Vec<AdminPermission> {
    match role {
        AdminRole::Support => vec![AdminPermission::ViewReports],
        AdminRole::Admin => vec![
            AdminPermission::ManageListings,
            AdminPermission::ManageAccounts,
            AdminPermission::ViewReports,
        ],
        AdminRole::SuperAdmin => vec![
            AdminPermission::ApproveAdmins,
            AdminPermission::ManageSecurity,
            AdminPermission::ManageListings,
            AdminPermission::ManageAccounts,
            AdminPermission::ViewReports,
        ],
    }
}

/// An administrative account, separate from marketplace identity records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: AdminStatus,
    pub permissions: Vec<AdminPermission>,
    pub mfa_enabled: bool,
    /// The invitation consumed to create this account
    pub invitation_id: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAccount {
    pub fn has_permission(&self, permission: AdminPermission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// A single-use invitation authorizing creation of one admin account.
///
/// `token_digest` holds the SHA-256 digest of the issued token; the raw
/// token is shown once at creation and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminInvitation {
    pub id: Uuid,
    pub token_digest: String,
    pub email: String,
    pub role: AdminRole,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AdminInvitation {
    /// Whether a redemption attempt at `now` must be rejected
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

/// The approval decision taken on a pending admin account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    pub fn target_status(&self) -> AdminStatus {
        match self {
            ApprovalDecision::Approve => AdminStatus::Active,
            ApprovalDecision::Reject => AdminStatus::Rejected,
        }
    }
}
