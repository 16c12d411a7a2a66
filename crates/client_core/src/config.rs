use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "planner.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub backend_endpoint: String,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub session_jwt: Option<String>,
    pub database_id: String,
    pub users_collection: String,
    pub trips_collection: String,
    pub countries_url: String,
    pub trip_api_url: String,
    pub http_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_endpoint: "https://cloud.appwrite.io/v1".into(),
            project_id: None,
            api_key: None,
            session_jwt: None,
            database_id: "travel".into(),
            users_collection: "users".into(),
            trips_collection: "trips".into(),
            countries_url: "https://restcountries.com/v3.1/all?fields=name,flag,latlng,maps".into(),
            trip_api_url: "http://localhost:5173/api/create-trip".into(),
            http_timeout_seconds: 30,
        }
    }
}

impl Settings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds.max(1))
    }
}

/// Defaults, then `planner.toml` in the working directory, then the environment.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(%error, "ignoring malformed settings file");
            return;
        }
    };
    let get = |key: &str| -> Option<String> {
        match file_cfg.get(key)? {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    };
    apply(settings, get);
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| -> Option<String> {
        let prefixed = format!("APP__{}", key.to_ascii_uppercase());
        lookup(&prefixed).or_else(|| env_alias(key).and_then(&lookup))
    };
    apply(settings, get);
}

fn env_alias(key: &str) -> Option<&'static str> {
    Some(match key {
        "backend_endpoint" => "APPWRITE_API_ENDPOINT",
        "project_id" => "APPWRITE_PROJECT_ID",
        "api_key" => "APPWRITE_API_KEY",
        "session_jwt" => "APPWRITE_JWT",
        "database_id" => "APPWRITE_DATABASE_ID",
        "users_collection" => "APPWRITE_USERS_COLLECTION",
        "trips_collection" => "APPWRITE_TRIPS_COLLECTION",
        _ => return None,
    })
}

fn apply(settings: &mut Settings, get: impl Fn(&str) -> Option<String>) {
    if let Some(v) = get("backend_endpoint") {
        settings.backend_endpoint = v;
    }
    if let Some(v) = get("project_id") {
        settings.project_id = Some(v);
    }
    if let Some(v) = get("api_key") {
        settings.api_key = Some(v);
    }
    if let Some(v) = get("session_jwt") {
        settings.session_jwt = Some(v);
    }
    if let Some(v) = get("database_id") {
        settings.database_id = v;
    }
    if let Some(v) = get("users_collection") {
        settings.users_collection = v;
    }
    if let Some(v) = get("trips_collection") {
        settings.trips_collection = v;
    }
    if let Some(v) = get("countries_url") {
        settings.countries_url = v;
    }
    if let Some(v) = get("trip_api_url") {
        settings.trip_api_url = v;
    }
    if let Some(v) = get("http_timeout_seconds") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.http_timeout_seconds = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric http_timeout_seconds"),
        }
    }
}
