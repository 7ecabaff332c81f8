//! API endpoint integration tests
//!
//! Conversation and message endpoints, driven through the composed router
//! against the in-memory store.

#![allow(dead_code)]

mod common;
mod conversations;
mod messages;
