use std::env;
use std::path::PathBuf;

/// Where and how to run the scoring script. Built from the environment at
/// startup and handed to the service explicitly, so tests can point it at a
/// fake scorer.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Directory the scoring script expects to run from (its model and data
    /// files are resolved relative to it).
    pub work_dir: PathBuf,
    pub interpreter: String,
    pub script: String,
    pub supported_model: String,
}

pub const DEFAULT_MODEL: &str = "euh-immunology-v1.0";

impl ScorerConfig {
    pub fn from_env() -> Self {
        ScorerConfig {
            work_dir: env::var("SCREEN_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    PathBuf::from("/home/ec2-user/spep-paraprotein-frequency-screen")
                }),
            interpreter: env::var("SCREEN_INTERPRETER").unwrap_or_else(|_| "python3".to_string()),
            script: env::var("SCREEN_SCRIPT").unwrap_or_else(|_| "paraprotein_screen.py".to_string()),
            supported_model: env::var("SCREEN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}
