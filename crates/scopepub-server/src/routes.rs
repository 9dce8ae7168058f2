//! HTTP routes

pub mod publish;
