pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod password;
pub mod poll;
pub mod response;
pub mod routes;
pub mod state;
pub mod user;
