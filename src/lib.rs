pub mod categories;
pub mod confidence;
pub mod config;
pub mod development;
pub mod engine;
pub mod error;
pub mod input;
pub mod persist;
pub mod rating;
pub mod recommendations;
pub mod report;
pub mod roles;
pub mod stats;
pub mod style;

pub use config::{EngineConfig, load_engine_config};
pub use engine::{Engine, global_engine};
pub use error::{AnalysisWarning, ComputeError, ConfigError, ValidationError};
pub use input::{PlayerInput, parse_player_input_json};
pub use report::AnalysisReport;
