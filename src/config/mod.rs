mod server;

pub use server::{PasswordPolicy, ServerConfig};
