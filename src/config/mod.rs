use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Filesystem resources read at request time: the Word certificate template,
/// the optional stamp image overlaid on certificates, and the static index
/// page served at `/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub template_path: String,
    pub stamp_path: String,
    pub index_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("RECORDS_SERVER_HOST")
                    .unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("RECORDS_SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: std::env::var("RECORDS_DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:school.db".to_string()),
            },
            export: ExportConfig {
                template_path: std::env::var("RECORDS_TEMPLATE_PATH")
                    .unwrap_or_else(|_| "certificate_template.docx".to_string()),
                stamp_path: std::env::var("RECORDS_STAMP_PATH")
                    .unwrap_or_else(|_| "stamp.png".to_string()),
                index_path: std::env::var("RECORDS_INDEX_PATH")
                    .unwrap_or_else(|_| "index.html".to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RECORDS"))
            .build()?;

        config.try_deserialize()
    }
}
