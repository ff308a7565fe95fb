//! Vanity Core
//!
//! Core types for talking to a vanity address generation service.
//!
//! This crate contains:
//! - Domain types: requests, job handles, statuses and results
//! - DTOs: the JSON bodies exchanged with the service

pub mod domain;
pub mod dto;
