//! Entity models and DTOs.
//!
//! Row structs derive `sqlx::FromRow` and serialize directly into API
//! responses; `Create*`/`Review*` structs are the request DTOs.

pub mod attendance;
pub mod leave;
pub mod notification;
pub mod recognition;
pub mod report;
pub mod session;
pub mod subject;
pub mod user;
