//! Types shared between the banter UI and its host application.
//!
//! This crate is deliberately small: it carries the data model the UI
//! consumes (the chat command registry) and nothing else, so hosts can
//! depend on it without pulling in any UI machinery.

pub mod commands;
