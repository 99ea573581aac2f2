//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate neighbor lookup, key generation and persistence into
//!   list-edit operations.
//! - Keep callers decoupled from storage and key encoding details.

pub mod task_service;
