use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Host the service binds to
    pub host: String,
    /// Port the service listens on
    pub port: u16,
    /// Directory holding the persisted draft and its metadata sidecar
    pub data_dir: PathBuf,
    /// Generative-language model identifier used for all gateway calls
    pub model: String,
    /// Provider API key. A missing key is a provider failure at call time
    /// (gateway calls degrade), never a startup error.
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env_str("SCRIPTORIUM_HOST", "127.0.0.1"),
            port: env_parse("SCRIPTORIUM_PORT", 8090)?,
            data_dir: PathBuf::from(env_str("SCRIPTORIUM_DATA_DIR", "./scriptorium-data")),
            model: env_str("SCRIPTORIUM_MODEL", "gemini-2.0-flash"),
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Env vars are unlikely to be set under `cargo test`; only assert the
        // stable defaults.
        if std::env::var("SCRIPTORIUM_PORT").is_err() {
            let config = Config::from_env().unwrap();
            assert_eq!(config.port, 8090);
            assert_eq!(config.model, "gemini-2.0-flash");
        }
    }
}
