use std::{fs::File, io::BufReader, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::collector::IlmCollector;
use crate::targets::{self, TargetError};
use crate::Exporter;

const DEFAULT_NAMESPACE: &str = "elasticsearch";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to set up target: {0}")]
    Target(#[from] TargetError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Http {
        url: String,
        #[serde(default = "default_timeout")]
        timeout: u64,
    },
    File {
        path: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub target: Target,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_owned()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

pub fn parse(path: &str) -> Result<Config, ConfigError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    Ok(serde_yaml::from_reader(reader)?)
}

pub fn from_str(config: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(config)?)
}

impl Config {
    pub fn build(self) -> Result<Exporter, ConfigError> {
        let target = match self.target {
            Target::Http { url, timeout } => {
                let parsed = reqwest::Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

                targets::Target::Http(targets::http::Config::new(
                    parsed,
                    Duration::from_secs(timeout),
                )?)
            }
            Target::File { path } => targets::Target::File { path },
        };

        Ok(Exporter::new(vec![Box::new(IlmCollector::new(
            &self.namespace,
            target,
        ))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_target_with_defaults() {
        let config = from_str(
            r#"
target:
  http:
    url: http://localhost:9200
"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "elasticsearch");
        match &config.target {
            Target::Http { url, timeout } => {
                assert_eq!(url, "http://localhost:9200");
                assert_eq!(*timeout, 10);
            }
            other => panic!("unexpected target {:?}", other),
        }
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_file_target_and_namespace() {
        let config = from_str(
            r#"
namespace: es
target:
  file:
    path: explain.json
"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "es");
        assert!(matches!(config.target, Target::File { ref path } if path == "explain.json"));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let config = from_str(
            r#"
target:
  http:
    url: localhost:9200/es
    timeout: 3
"#,
        )
        .unwrap();

        assert!(matches!(
            config.build(),
            Err(ConfigError::InvalidUrl { .. }) | Err(ConfigError::Target(TargetError::InvalidUrl(_)))
        ));
    }

    #[test]
    fn test_missing_target() {
        assert!(matches!(
            from_str("namespace: es"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_parse_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "namespace: es\ntarget:\n  http:\n    url: https://es.internal:9200/prefix/\n    timeout: 2\n"
        )
        .unwrap();

        let config = parse(&file.path().to_string_lossy()).unwrap();

        assert_eq!(config.namespace, "es");
        assert!(matches!(
            config.target,
            Target::Http { ref url, timeout: 2 } if url == "https://es.internal:9200/prefix/"
        ));
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse("/nonexistent/config.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
