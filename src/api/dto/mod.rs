//! Data Transfer Objects for HTTP responses.

pub mod health;
