pub mod assess;
pub mod config;
pub mod profile;
pub mod questions;
pub mod route;
pub mod score;
