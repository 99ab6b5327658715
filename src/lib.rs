//! MediConnect client: role dashboards, appointment actions and an
//! assistant chat widget over the MediConnect REST backend.

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod models;
pub mod notify;
pub mod render;
pub mod shell;
pub mod state;
