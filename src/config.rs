#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_base: String,
    pub openai_api_key: String,
    pub model_name: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            openai_api_base: std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .unwrap_or_default(),
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            host: std::env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn llm_configured(&self) -> bool {
        !self.openai_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_configured_requires_key() {
        let mut settings = Settings {
            openai_api_base: "https://api.openai.com/v1".to_string(),
            openai_api_key: String::new(),
            model_name: "gpt-4o".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
        };
        assert!(!settings.llm_configured());

        settings.openai_api_key = "sk-test".to_string();
        assert!(settings.llm_configured());
    }
}
