//! Data Transfer Objects for the generation API
//!
//! Wire shapes of the request and response bodies. Domain types are built from
//! these at the boundary so that nothing past the client sees raw field checks.

pub mod health;
pub mod job;
