pub mod health;
pub mod search_history;

pub use health::{health_check, ping};
pub use search_history::search_config;
