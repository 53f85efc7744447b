pub mod types;
pub mod openfda;
pub mod resolver;
pub mod normalizer;

pub use types::*;
pub use openfda::*;
pub use resolver::*;
pub use normalizer::*;
