//! AI Copilot client library (config, backend HTTP client, message rendering,
//! conversation state). Used by the `copilot` terminal front end.

pub mod client;
pub mod config;
pub mod conversation;
pub mod messages;
pub mod render;

pub use client::{ApiClient, ClientError, ErrorKind, PageScheme, RequestDefaults};
pub use config::{default_config_path, ApiSection, Config, ConfigError, PageSection};
pub use conversation::{Conversation, Message, Role, Submission};
pub use messages::{HealthStatus, Mode, RequestResult};
pub use render::{render_blocks, Block};
