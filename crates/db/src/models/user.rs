use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;

use crate::store::{Entity, EntityKind};

/// Privilege labels, ordered from least to most privileged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Operative,
    Supervisor,
    CompanyAdmin,
    /// Sees and may do everything regardless of per-item role lists.
    SuperAdmin,
}

impl Role {
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: String,
    /// Platform-level accounts are not tied to a company.
    pub company_id: Option<String>,
}

impl User {
    pub fn belongs_to(&self, company_id: &str) -> bool {
        self.company_id.as_deref() == Some(company_id)
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
}

impl Entity for Company {
    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> &str {
        &self.id
    }

    fn scope_id(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub company_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_totally_ordered_by_privilege() {
        assert!(Role::Operative < Role::Supervisor);
        assert!(Role::Supervisor < Role::CompanyAdmin);
        assert!(Role::CompanyAdmin < Role::SuperAdmin);
        assert_eq!(Role::CompanyAdmin.to_string(), "company_admin");
    }
}
