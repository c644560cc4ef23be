pub mod board;
pub mod config;
pub mod error;
pub mod form;
pub mod scorer;
// cmd and reports belong to the binary (main.rs).
