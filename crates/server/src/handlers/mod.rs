//! HTTP request handlers.

pub mod citations;
pub mod health;
