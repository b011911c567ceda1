//! Role hierarchy and total order.
//!
//! The five staff roles form a strict linear order. Authorization checks
//! compare privilege levels, never role names, so the ordering lives in
//! exactly one place: [`Role::level`].
//!
//! An unrecognized *required* role deliberately maps to the maximum
//! level (fail-safe toward maximum privilege): a typo in a role check
//! must deny everyone rather than admit everyone. See
//! [`Role::required_level`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest privilege level in the hierarchy.
pub const MAX_LEVEL: u8 = 5;

/// Staff roles, declared in ascending privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    DepartmentHead,
    HrManager,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Privilege level in the fixed table
    /// `{employee: 1, department_head: 2, hr_manager: 3, admin: 4, super_admin: 5}`.
    pub fn level(&self) -> u8 {
        match self {
            Self::Employee => 1,
            Self::DepartmentHead => 2,
            Self::HrManager => 3,
            Self::Admin => 4,
            Self::SuperAdmin => 5,
        }
    }

    /// The canonical wire/storage name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::DepartmentHead => "department_head",
            Self::HrManager => "hr_manager",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Resolve the level a *required* role name demands.
    ///
    /// Unknown names resolve to [`MAX_LEVEL`]. This is the fail-safe
    /// branch: a check against a role that does not exist can never be
    /// satisfied by anyone below the top of the hierarchy.
    pub fn required_level(name: &str) -> u8 {
        match name.parse::<Role>() {
            Ok(role) => role.level(),
            Err(_) => MAX_LEVEL,
        }
    }

    /// Whether this role may read data belonging to any location.
    ///
    /// Admin and super-admin span both business units; everyone else is
    /// confined to their own location.
    pub fn spans_all_locations(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "department_head" => Ok(Self::DepartmentHead),
            "hr_manager" => Ok(Self::HrManager),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_match_fixed_table() {
        assert_eq!(Role::Employee.level(), 1);
        assert_eq!(Role::DepartmentHead.level(), 2);
        assert_eq!(Role::HrManager.level(), 3);
        assert_eq!(Role::Admin.level(), 4);
        assert_eq!(Role::SuperAdmin.level(), 5);
    }

    #[test]
    fn test_total_order() {
        assert!(Role::Employee < Role::DepartmentHead);
        assert!(Role::DepartmentHead < Role::HrManager);
        assert!(Role::HrManager < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn test_parse_round_trip() {
        for role in [
            Role::Employee,
            Role::DepartmentHead,
            Role::HrManager,
            Role::Admin,
            Role::SuperAdmin,
        ] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_parse_unknown_role() {
        let err = "janitor".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("janitor".to_string()));
    }

    #[test]
    fn test_unknown_required_role_is_fail_safe() {
        // The explicit fallback: an unrecognized required role demands
        // the maximum privilege level.
        assert_eq!(Role::required_level("owner"), MAX_LEVEL);
        assert_eq!(Role::required_level(""), MAX_LEVEL);
        // Even the super admin only *equals* the fallback level.
        assert!(Role::SuperAdmin.level() >= Role::required_level("owner"));
        assert!(Role::Admin.level() < Role::required_level("owner"));
    }

    #[test]
    fn test_known_required_roles() {
        assert_eq!(Role::required_level("employee"), 1);
        assert_eq!(Role::required_level("super_admin"), 5);
    }

    #[test]
    fn test_location_span() {
        assert!(Role::Admin.spans_all_locations());
        assert!(Role::SuperAdmin.spans_all_locations());
        assert!(!Role::HrManager.spans_all_locations());
        assert!(!Role::DepartmentHead.spans_all_locations());
        assert!(!Role::Employee.spans_all_locations());
    }
}
