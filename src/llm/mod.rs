pub mod assistant;
pub mod client;
pub mod vision;
