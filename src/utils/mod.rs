pub mod input;
pub mod token_estimate;
