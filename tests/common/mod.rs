#![allow(dead_code)]

mod test_server;

pub use test_server::{ADMIN_PASSWORD, ADMIN_SCHOOL_ID, TestServer};
