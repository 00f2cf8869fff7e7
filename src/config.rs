//! Process configuration, read once at startup from the environment (and a
//! `.env` file when present).

use anyhow::{anyhow, Context};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Signs password-reset tokens.
    pub secret_key: String,
    /// Uploaded files live under `<static_dir>/uploads` and are served at `/static`.
    pub static_dir: String,
    /// Base of the links put in outgoing mail.
    pub public_url: String,
    /// `None` when `SMTP_HOST` is unset; reset links are then only logged.
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{} not set", key));

        let mail = match get("SMTP_HOST") {
            Some(host) => {
                let port = match get("SMTP_PORT") {
                    Some(port) => port.trim().parse().context("SMTP_PORT")?,
                    None => DEFAULT_SMTP_PORT,
                };
                Some(MailConfig {
                    from: get("SMTP_FROM").unwrap_or_else(|| format!("noreply@{}", host)),
                    host,
                    port,
                    user: get("SMTP_USER"),
                    password: get("SMTP_PASSWORD"),
                })
            }
            None => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            secret_key: required("SECRET_KEY")?,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            public_url: get("PUBLIC_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
            mail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[
            ("DATABASE_URL", "mysql://root@localhost/medisoft"),
            ("SECRET_KEY", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.static_dir, DEFAULT_STATIC_DIR);
        assert_eq!(config.public_url, DEFAULT_PUBLIC_URL);
        assert!(config.mail.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = config_from(&[("DATABASE_URL", "mysql://root@localhost/medisoft")]).unwrap_err();
        assert!(err.to_string().contains("SECRET_KEY"));
    }

    #[test]
    fn smtp_settings() {
        let config = config_from(&[
            ("DATABASE_URL", "mysql://root@localhost/medisoft"),
            ("SECRET_KEY", "s3cret"),
            ("PUBLIC_URL", "https://clinic.example/"),
            ("SMTP_HOST", "smtp.example"),
            ("SMTP_PORT", "2525"),
        ])
        .unwrap();
        assert_eq!(config.public_url, "https://clinic.example");
        let mail = config.mail.unwrap();
        assert_eq!(mail.port, 2525);
        assert_eq!(mail.from, "noreply@smtp.example");
        assert!(mail.user.is_none());
    }

    #[test]
    fn bad_smtp_port_is_rejected() {
        assert!(config_from(&[
            ("DATABASE_URL", "mysql://root@localhost/medisoft"),
            ("SECRET_KEY", "s3cret"),
            ("SMTP_HOST", "smtp.example"),
            ("SMTP_PORT", "many"),
        ])
        .is_err());
    }
}
