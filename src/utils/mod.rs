pub mod auth;
pub mod time;
pub mod token;
