// Repository layer for dataset queries

pub mod climate;
pub mod queries;

pub use climate::ClimateRepository;
