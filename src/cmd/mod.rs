pub mod export;
pub mod report;
pub mod set;
pub mod summarize;
