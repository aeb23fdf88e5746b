pub mod client_cache;
pub mod submission;
