//! Inbound adapters driving the dashboard.

pub mod cli;
