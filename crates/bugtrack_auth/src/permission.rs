use crate::error::AuthError;
use bugtrack_types::Role;

/// Minimum project role a handler needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    Membership,
    Admin,
    Owner,
}

impl RoleRequirement {
    pub fn check(&self, role: Option<Role>) -> Result<Role, AuthError> {
        let role = role.ok_or(AuthError::NotAMember)?;

        let allowed = match self {
            RoleRequirement::Membership => true,
            RoleRequirement::Admin => role.is_admin(),
            RoleRequirement::Owner => role.is_owner(),
        };

        if allowed {
            Ok(role)
        } else {
            Err(AuthError::InsufficientRole {
                actual: role,
                required: self.name(),
            })
        }
    }

    fn name(&self) -> &'static str {
        match self {
            RoleRequirement::Membership => "member",
            RoleRequirement::Admin => "admin",
            RoleRequirement::Owner => "owner",
        }
    }
}

/// Passes for any role on the project
pub fn membership_required(role: Option<Role>) -> Result<Role, AuthError> {
    RoleRequirement::Membership.check(role)
}

/// Passes for owners and admins
pub fn admin_login_required(role: Option<Role>) -> Result<Role, AuthError> {
    RoleRequirement::Admin.check(role)
}

/// Passes only for the owner
pub fn owner_login_required(role: Option<Role>) -> Result<Role, AuthError> {
    RoleRequirement::Owner.check(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_role_is_denied_everywhere() {
        assert!(matches!(membership_required(None), Err(AuthError::NotAMember)));
        assert!(admin_login_required(None).is_err());
        assert!(owner_login_required(None).is_err());
    }

    #[test]
    fn test_admin_role() {
        assert_eq!(membership_required(Some(Role::Admin)).unwrap(), Role::Admin);
        assert_eq!(admin_login_required(Some(Role::Admin)).unwrap(), Role::Admin);

        let err = owner_login_required(Some(Role::Admin)).unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(err.to_string(), "Role admin is not allowed, owner required");
    }

    #[test]
    fn test_member_and_owner_roles() {
        assert!(membership_required(Some(Role::Member)).is_ok());
        assert!(admin_login_required(Some(Role::Member)).is_err());
        assert!(owner_login_required(Some(Role::Member)).is_err());

        assert!(membership_required(Some(Role::Owner)).is_ok());
        assert!(admin_login_required(Some(Role::Owner)).is_ok());
        assert!(owner_login_required(Some(Role::Owner)).is_ok());
    }
}
