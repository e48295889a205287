use std::{
    fs,
    path::PathBuf,
};

use clap::Parser;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

// CLI
#[derive(Parser, Debug, Default)]
#[command(name = "studio")]
#[command(version = "0.1.0")]
#[command(about = "Record-keeping backend for model studio: models, pipelines, datasets and jobs.",
          long_about = None)
]
pub struct Cli {
    /// Optional TOML file with any of the settings below
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database that holds the collections
    #[arg(long, env = "DATABASE_NAME")]
    pub database_name: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Keep records in process memory instead of MongoDB
    #[arg(long, action)]
    pub in_memory: bool,
}

// settings as read from disk
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub database_url: Option<String>,

    pub database_name: Option<String>,

    pub host: Option<String>,

    pub port: Option<u16>,
}

// what the store was (or wasn't) configured with, also reported by `/test`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    pub database_url: Option<String>,

    pub database_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreSettings,

    pub host: String,

    pub port: u16,

    pub in_memory: bool,
}

impl Settings {
    // command line and environment win over the config file
    pub fn resolve(cli: Cli) -> anyhow::Result<Settings> {
        let file = match &cli.config {
            Some(path) => toml::from_str::<FileConfig>(
                &fs::read_to_string(path)?
            )?,
            None => FileConfig::default(),
        };
        Ok(Settings::merge(cli, file))
    }

    fn merge(cli: Cli, file: FileConfig) -> Settings {
        Settings {
            store: StoreSettings {
                database_url: non_empty(cli.database_url)
                    .or_else(|| non_empty(file.database_url)),
                database_name: non_empty(cli.database_name)
                    .or_else(|| non_empty(file.database_name)),
            },
            host: non_empty(cli.host)
                .or_else(|| non_empty(file.host))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
            in_memory: cli.in_memory,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// an empty variable counts as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| false == v.trim().is_empty())
}
