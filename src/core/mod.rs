// Core modules implementing the stats tree, report parsing, filtering, and error modeling.
pub mod error;
pub mod filter;
pub mod parse;
pub mod tree;
