//! Yatube: a small community blog.
//!
//! Authors publish short text posts, optionally filed under a group; readers
//! browse paginated feeds by group, by author, or everything at once.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
