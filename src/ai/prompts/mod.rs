/// Prompt construction for deal scoring
pub mod builder;

// Re-exports
pub use builder::PromptBuilder;
