pub mod dto;
pub mod extract;
mod handlers;
pub mod response;
mod router;
pub mod validation;

pub use router::{AppState, create_router};
