pub mod settings;

pub use settings::HealthConfig;
