pub mod feasibility;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod render;
pub mod schema;
