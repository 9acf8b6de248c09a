//! Caller identity primitives.
//!
//! Authentication happens outside this service: every operation receives an
//! already-authenticated caller carrying a user id and a role. The domain
//! only performs role and ownership checks against that identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when constructing identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// Identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a canonical UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Role string did not name a known role.
    #[error("role must be admin or rep")]
    UnknownRole,
}

/// Stable user identifier stored as a UUID.
///
/// Keeps the caller-provided string representation so serialisation round
/// trips byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    /// Construct a [`UserId`] from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, IdentityValidationError> {
        if id.is_empty() {
            return Err(IdentityValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(IdentityValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| IdentityValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Privileged user able to create cases and override any field.
    Admin,
    /// Field user executing check-in, invoicing, and completion steps.
    Rep,
}

impl Role {
    /// Stable string form used in sessions and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Rep => "rep",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "rep" => Ok(Self::Rep),
            _ => Err(IdentityValidationError::UnknownRole),
        }
    }
}

/// Authenticated caller identity passed into every domain operation.
///
/// # Examples
/// ```
/// use backend::domain::{Caller, Role, UserId};
///
/// let rep_id = UserId::random();
/// let caller = Caller::new(rep_id.clone(), Role::Rep);
/// assert!(caller.owns(&rep_id));
/// assert!(!caller.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    role: Role,
}

impl Caller {
    /// Bundle a user id and role into a caller identity.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Identifier of the authenticated user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role granted to the caller.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller is the given user.
    pub fn owns(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Whether the caller may act on a case assigned to `assigned_rep_id`.
    ///
    /// Normal-flow mutations are restricted to the assigned rep; admins may
    /// act on any case.
    pub fn may_act_on(&self, assigned_rep_id: &UserId) -> bool {
        self.is_admin() || self.owns(assigned_rep_id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", IdentityValidationError::EmptyId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", IdentityValidationError::InvalidId)]
    #[case("not-a-uuid", IdentityValidationError::InvalidId)]
    fn user_id_rejects_invalid_input(
        #[case] raw: &str,
        #[case] expected: IdentityValidationError,
    ) {
        let err = UserId::new(raw).expect_err("invalid id must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn user_id_preserves_raw_form() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id = UserId::new(raw).expect("valid id");
        assert_eq!(id.as_ref(), raw);
        assert_eq!(id.to_string(), raw);
    }

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("rep", Role::Rep)]
    fn role_parses_known_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn role_rejects_unknown_values() {
        let err = "supervisor".parse::<Role>().expect_err("unknown role");
        assert_eq!(err, IdentityValidationError::UnknownRole);
    }

    #[test]
    fn admin_may_act_on_any_case() {
        let admin = Caller::new(UserId::random(), Role::Admin);
        assert!(admin.may_act_on(&UserId::random()));
    }

    #[test]
    fn rep_may_only_act_on_own_cases() {
        let rep_id = UserId::random();
        let rep = Caller::new(rep_id.clone(), Role::Rep);
        assert!(rep.may_act_on(&rep_id));
        assert!(!rep.may_act_on(&UserId::random()));
    }
}
