/// Resolve command handler
pub mod resolve;
