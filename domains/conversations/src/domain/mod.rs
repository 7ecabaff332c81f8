//! Domain types for conversations and messages

pub mod entities;
