//! External API clients

pub mod llm;
