//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_users.sql`.

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_ADMIN: &str = "admin";
