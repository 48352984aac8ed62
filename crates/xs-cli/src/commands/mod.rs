pub mod admin;
pub mod gentoken;
