#![allow(warnings)]

pub mod ai; // Prompt building, response normalization, deal scoring
pub mod apis;
pub mod config;
pub mod database; // Deal and source persistence
pub mod global;
pub mod logger;
pub mod paths; // Centralized file path management
pub mod types; // Core deal type definitions
