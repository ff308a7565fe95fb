//! Core domain types
//!
//! This module contains the structures a client works with while a generation
//! job is in flight. They are transient: created per request and dropped once
//! polling ends.

pub mod job;
pub mod vanity;
