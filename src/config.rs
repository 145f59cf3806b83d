use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ytinfo-env";
pub const CONFIG_PATH_VAR: &str = "YTINFO_CONFIG";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";

const OVERRIDABLE_KEYS: [&str; 4] = ["PORT", "HOST", "YTDLP_PATH", "YTDLP_COOKIES"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub ytdlp_path: Option<String>,
    pub ytdlp_cookies: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub port: u16,
    pub host: String,
    pub ytdlp_path: String,
    pub ytdlp_cookies: Option<PathBuf>,
}

impl EnvConfig {
    /// Applies one `KEY=value` pair. Unknown keys are ignored; empty values
    /// leave the previous setting alone.
    fn apply(&mut self, key: &str, value: &str, origin: &str) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        match key {
            "PORT" => {
                let port: u16 = value
                    .parse()
                    .with_context(|| format!("Parsing PORT from {origin}"))?;
                self.port = Some(port);
            }
            "HOST" => self.host = Some(value.to_string()),
            "YTDLP_PATH" => self.ytdlp_path = Some(value.to_string()),
            "YTDLP_COOKIES" => self.ytdlp_cookies = Some(PathBuf::from(value)),
            _ => {}
        }
        Ok(())
    }
}

pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let origin = path.display().to_string();
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value_raw)) = trimmed.split_once('=') {
            let value = value_raw.trim().trim_matches('"');
            cfg.apply(key.trim(), value, &origin)?;
        }
    }
    Ok(Some(cfg))
}

/// Loads the optional config file (`$YTINFO_CONFIG` or
/// [`DEFAULT_CONFIG_PATH`]) and lets the process environment override it.
pub fn load_runtime_config() -> Result<RuntimeConfig> {
    let path = env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    load_runtime_config_from(&path, |key| env::var(key).ok())
}

pub fn load_runtime_config_from(
    path: impl AsRef<Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<RuntimeConfig> {
    let mut cfg = read_env_config(path.as_ref())?.unwrap_or_default();
    for key in OVERRIDABLE_KEYS {
        if let Some(value) = lookup(key) {
            cfg.apply(key, value.trim(), "environment")?;
        }
    }
    Ok(RuntimeConfig {
        port: cfg.port.unwrap_or(DEFAULT_PORT),
        host: cfg.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
        ytdlp_path: cfg
            .ytdlp_path
            .unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string()),
        ytdlp_cookies: cfg.ytdlp_cookies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn read_env_config_parses_known_keys() {
        let cfg = make_config(
            "# deployment\nPORT=\"4242\"\nHOST=127.0.0.1\nYTDLP_COOKIES=\"/srv/cookies.txt\"\nOTHER=1\n",
        );
        let parsed = read_env_config(cfg.path()).unwrap().unwrap();
        assert_eq!(parsed.port, Some(4242));
        assert_eq!(parsed.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(parsed.ytdlp_cookies, Some(PathBuf::from("/srv/cookies.txt")));
        assert_eq!(parsed.ytdlp_path, None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = load_runtime_config_from(dir.path().join("absent"), no_env).unwrap();
        assert_eq!(runtime.port, DEFAULT_PORT);
        assert_eq!(runtime.host, DEFAULT_HOST);
        assert_eq!(runtime.ytdlp_path, DEFAULT_YTDLP_PATH);
        assert_eq!(runtime.ytdlp_cookies, None);
    }

    #[test]
    fn environment_overrides_file() {
        let cfg = make_config("PORT=4242\nYTDLP_PATH=/opt/yt-dlp\n");
        let env: HashMap<&str, &str> = HashMap::from([("PORT", "10000"), ("HOST", "")]);
        let runtime =
            load_runtime_config_from(cfg.path(), |key| env.get(key).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(runtime.port, 10000);
        assert_eq!(runtime.host, DEFAULT_HOST);
        assert_eq!(runtime.ytdlp_path, "/opt/yt-dlp");
    }

    #[test]
    fn malformed_port_is_an_error() {
        let cfg = make_config("PORT=eighty\n");
        let err = load_runtime_config_from(cfg.path(), no_env).unwrap_err();
        assert!(format!("{err:#}").contains("Parsing PORT"));

        let dir = tempfile::tempdir().unwrap();
        let err = load_runtime_config_from(dir.path().join("absent"), |key| {
            (key == "PORT").then(|| "99999".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("environment"));
    }
}
