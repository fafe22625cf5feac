pub mod aggregator;
pub mod classifier;
pub mod grouper;
pub mod normalizer;
pub mod title_parser;

pub use title_parser::TitleParser;
