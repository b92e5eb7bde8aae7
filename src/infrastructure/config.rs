use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub server: ServerSettings,
}

/// Remote chart and Dasha computation service
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(config::File::with_name("config/dasha").required(false))
}

/// Defaults, then the given file source, then `DASHA__SECTION__KEY` environment variables
pub fn load_app_config_from<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("service.base_url", "http://localhost:5001")?
        .set_default("service.timeout_secs", 10)?
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .add_source(file)
        .add_source(config::Environment::with_prefix("DASHA").separator("__"))
        .build()?;

    let mut app: AppConfig = settings.try_deserialize()?;
    app.service.base_url = app.service.base_url.trim_end_matches('/').to_string();
    Ok(app)
}
