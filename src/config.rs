// Configuration loaded from the environment.
//
// `.env` in the working directory is read first, then
// `<config dir>/premiumize-cli/.env`; variables already set in the
// process environment always win.

use std::env;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "https://www.premiumize.me/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Url,
    pub api_key: String,
    pub verbose: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        if let Some(dir) = dirs::config_dir() {
            dotenvy::from_path(dir.join("premiumize-cli").join(".env")).ok();
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("PREMIUMIZE_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::Config("missing PREMIUMIZE_API_KEY".into()))?;

        let raw_url = lookup("PREMIUMIZE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_url = Url::parse(raw_url.trim())
            .map_err(|e| ApiError::Config(format!("invalid PREMIUMIZE_API_URL: {e}")))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "invalid PREMIUMIZE_API_URL: unsupported scheme {:?}",
                api_url.scheme()
            )));
        }

        let verbose = parse_flag("VERBOSE_LOGGING", lookup("VERBOSE_LOGGING"))?;
        let dry_run = parse_flag("DRYRUN", lookup("DRYRUN"))?;

        Ok(Self {
            api_url,
            api_key,
            verbose,
            dry_run,
        })
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool, ApiError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        other => Err(ApiError::Config(format!("invalid {name}: {other:?} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ApiError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = load(&[("PREMIUMIZE_API_KEY", "abc123")]).unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.api_url.as_str(), "https://www.premiumize.me/api");
        assert!(!config.verbose);
        assert!(!config.dry_run);
    }

    #[test]
    fn missing_or_blank_key_is_config_error() {
        assert_eq!(load(&[]).unwrap_err().kind(), ErrorKind::Config);
        assert_eq!(
            load(&[("PREMIUMIZE_API_KEY", "   ")]).unwrap_err().kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn flags_accept_common_spellings() {
        let config = load(&[
            ("PREMIUMIZE_API_KEY", "k"),
            ("VERBOSE_LOGGING", "Yes"),
            ("DRYRUN", "1"),
        ])
        .unwrap();
        assert!(config.verbose);
        assert!(config.dry_run);

        let err = load(&[("PREMIUMIZE_API_KEY", "k"), ("DRYRUN", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("DRYRUN"));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = load(&[
            ("PREMIUMIZE_API_KEY", "k"),
            ("PREMIUMIZE_API_URL", "ftp://example.com/api"),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = load(&[("PREMIUMIZE_API_KEY", "k"), ("PREMIUMIZE_API_URL", "not a url")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
