// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;

/// Persona prompt seeded as the first message of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an intelligent virtual mentor, designed to \
provide personalized guidance, answer questions and help the user reach their learning goals. \
Be helpful, clear and motivating in your answers.";

const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Identity provider / document store ---
    /// Firebase Web API key used for the Auth REST endpoints
    pub firebase_api_key: String,
    /// Base URL of the identity REST API (overridable for the emulator)
    pub identity_base_url: String,
    /// GCP project holding the Firestore database
    pub gcp_project_id: String,

    // --- Completion API ---
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Default `max_tokens` when a request does not set one
    pub completion_max_tokens: u32,
    /// Default sampling temperature when a request does not set one
    pub completion_temperature: f32,

    // --- Mentor ---
    /// System message that seeds new conversations
    pub system_prompt: String,

    // --- Local runtime ---
    /// Directory for the on-device state snapshots
    pub data_dir: PathBuf,
    /// UI shell origin allowed by CORS
    pub frontend_url: String,
    /// Listen address; loopback unless opened up explicitly
    pub bind_addr: IpAddr,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_api_key: required("FIREBASE_API_KEY")?,
            identity_base_url: env::var("IDENTITY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_BASE_URL.to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),

            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            completion_max_tokens: parsed("COMPLETION_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            completion_temperature: parsed("COMPLETION_TEMPERATURE", DEFAULT_TEMPERATURE)?,

            system_prompt: env::var("MENTOR_SYSTEM_PROMPT")
                .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            bind_addr: parsed("BIND_ADDR", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parsed("PORT", 8080)?,
        })
    }

    /// Fixed configuration for tests. Network endpoints point nowhere useful.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test_firebase_key".to_string(),
            identity_base_url: "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1"
                .to_string(),
            gcp_project_id: "test-project".to_string(),
            openai_api_key: "test_openai_key".to_string(),
            openai_base_url: "http://127.0.0.1:9/v1".to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            completion_max_tokens: DEFAULT_MAX_TOKENS,
            completion_temperature: DEFAULT_TEMPERATURE,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            data_dir: env::temp_dir().join("chat-mentor-test"),
            frontend_url: "http://localhost:8081".to_string(),
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("chat-mentor"))
        .unwrap_or_else(|| PathBuf::from(".chat-mentor"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
