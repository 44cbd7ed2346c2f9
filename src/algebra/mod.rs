pub mod generator;
pub mod group;
