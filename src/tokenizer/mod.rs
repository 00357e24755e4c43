pub mod bloom;

pub use bloom::CausalTokenizer;
