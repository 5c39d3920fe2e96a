mod models;
mod principal;
mod role;

pub use models::*;
pub use principal::Principal;
pub use role::{RequestStatus, Role, TimeValue};
