pub mod config;
pub mod data;
pub mod loop_points;
pub mod plan;
pub mod risk;
