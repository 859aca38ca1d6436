// nanoglass - glass/metal illustration generator
// Configure a render, fan it out to a hosted image model, remix results and
// export them, optionally recovering transparency from black-background renders.

pub mod config;
pub mod error;
pub mod export;
pub mod gemini;
pub mod generate;
pub mod prompt;
pub mod session;
pub mod transparency;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use export::{ExportOutcome, export_image};
pub use gemini::{GeminiClient, ImageBackend, ImageRequest};
pub use generate::generate_batch;
pub use session::Session;
pub use types::*;
