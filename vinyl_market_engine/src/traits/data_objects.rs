use crate::db_types::Role;

/// The authenticated caller of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub role: Role,
}

impl Requester {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: i64) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on anything. Everyone else only on their own records.
    pub fn may_modify(&self, owner_id: i64) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}
