use secrecy::SecretString;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub upload_dir: PathBuf,
    /// Backend API key, stored base64-encoded at rest and decoded only when
    /// the backend client is constructed.
    pub openai_api_key_encoded: SecretString,
    pub openai_model: String,
    pub web_server_host: String,
    pub web_server_port: u16,
}

/// Base64 of "dev_openai_key"; dev-only.
const DEV_API_KEY_ENCODED: &str = "ZGV2X29wZW5haV9rZXk=";

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "studyquiz-local".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/files")),
            openai_api_key_encoded: SecretString::from(
                env::var("OPENAI_API_KEY_ENCODED")
                    .unwrap_or_else(|_| DEV_API_KEY_ENCODED.to_string()),
            ),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        if self.openai_api_key_encoded.expose_secret() == DEV_API_KEY_ENCODED {
            panic!(
                "FATAL: OPENAI_API_KEY_ENCODED is using default value! Set OPENAI_API_KEY_ENCODED environment variable."
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "studyquiz-test".to_string(),
            upload_dir: std::env::temp_dir().join("studyquiz-test-uploads"),
            // base64 of "test_openai_key"
            openai_api_key_encoded: SecretString::from("dGVzdF9vcGVuYWlfa2V5".to_string()),
            openai_model: "gpt-4o-mini".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
        }
    }
}
