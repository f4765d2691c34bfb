//! Role definitions and the allow-lists used by the issue routes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Caller role carried in the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Role {
    /// Regular user who reports issues.
    #[serde(rename = "lietotājs")]
    #[strum(serialize = "lietotājs", serialize = "lietotajs")]
    Lietotajs,
    /// Lab technician who resolves issues.
    #[serde(rename = "laborants")]
    #[strum(serialize = "laborants")]
    Laborants,
    /// Administrator. Not granted anything by the current allow-lists.
    #[serde(rename = "administrators")]
    #[strum(serialize = "administrators")]
    Administrators,
    /// Manager. Not granted anything by the current allow-lists.
    #[serde(rename = "pārvaldnieks")]
    #[strum(serialize = "pārvaldnieks", serialize = "parvaldnieks")]
    Parvaldnieks,
}

/// Roles allowed to report new issues.
pub const ISSUE_REPORTERS: &[Role] = &[Role::Lietotajs];

/// Roles allowed to change issue and issue-computer status.
pub const ISSUE_RESOLVERS: &[Role] = &[Role::Laborants];

impl Role {
    /// Whether this role is in `allowed`.
    pub fn is_allowed(self, allowed: &[Role]) -> bool {
        allowed.contains(&self)
    }
}
