pub mod handlers;
pub mod heuristics;
pub mod pdf;
pub mod prompts;
pub mod srs;
