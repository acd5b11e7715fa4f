pub mod provider;
pub mod rfp;
