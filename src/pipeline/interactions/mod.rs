pub mod types;
pub mod sanitize;
pub mod prompt;
pub mod ollama;
pub mod parser;
pub mod classifier;
pub mod aggregator;

pub use types::*;
pub use sanitize::*;
pub use prompt::*;
pub use ollama::*;
pub use parser::*;
pub use classifier::*;
pub use aggregator::*;
