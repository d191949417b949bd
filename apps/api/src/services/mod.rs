pub mod search_history;

// Re-export public types
pub use search_history::SearchHistoryService;
