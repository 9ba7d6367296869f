pub mod api;
pub mod client;
pub mod error;
pub mod settings;
pub mod types;

pub use api::WorkspaceApi;
pub use client::NotionClient;
pub use error::ApiError;
pub use settings::{
    SettingSource, SettingSources, Settings, config_path, save_to_file, setting_sources,
};
pub use types::{BotUser, Database, QueryPage};
