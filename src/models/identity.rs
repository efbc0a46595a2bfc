// SPDX-License-Identifier: MIT

//! Caller identity and roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Access role. Ordered from most to least privileged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Staff,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Verified caller, attached to the request by the auth middleware.
///
/// The role comes from the token's custom claims and is the one used for
/// authorization decisions. The `role` stored on the user profile is display
/// data only and may disagree with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Identity {
    /// Role used for authorization; tokens without a role claim are staff.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.effective_role() == Role::Admin
    }
}
