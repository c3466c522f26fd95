//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parser, store, scheduler and snooze logic into
//!   use-case level APIs.
//! - Keep UI and audio layers decoupled from store details.

pub mod alarm_service;
