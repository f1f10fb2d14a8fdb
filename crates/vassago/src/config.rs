//! Configuration management for the Vassago CLI.
//!
//! Configuration is loaded from (in order of precedence):
//! 1. Command-line arguments
//! 2. Environment variables (VASSAGO_*)
//! 3. Config file (~/.config/vassago/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use vassago_mail::SmtpSettings;

const ENV_PREFIX: &str = "VASSAGO_";

/// Keys whose environment values must not be type-inferred by `Env`.
const STRING_KEYS: &[&str] = &[
    "server_host",
    "public_url",
    "smtp_host",
    "email_user",
    "email_pass",
    "mail_from",
    "mail_subject",
];

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server host.
    #[serde(default = "default_host")]
    pub server_host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Externally reachable base URL for tracking links.
    /// Defaults to `http://localhost:{server_port}`.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Enable permissive CORS.
    #[serde(default = "default_cors")]
    pub cors: bool,

    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port (implicit TLS).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP account user.
    #[serde(default)]
    pub email_user: Option<String>,

    /// SMTP account secret.
    #[serde(default)]
    pub email_pass: Option<String>,

    /// Sender address; falls back to `email_user`.
    #[serde(default)]
    pub mail_from: Option<String>,

    /// Subject of tracking emails.
    #[serde(default = "default_subject")]
    pub mail_subject: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors() -> bool {
    true
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_subject() -> String {
    "Email Tracking Test".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: default_host(),
            server_port: default_port(),
            public_url: None,
            cors: default_cors(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            email_user: None,
            email_pass: None,
            mail_from: None,
            mail_subject: default_subject(),
        }
    }
}

impl Config {
    /// Loads configuration from all sources.
    ///
    /// Reports warnings for configuration errors but falls back to defaults.
    pub fn load() -> Self {
        let config_path = Self::config_path();

        match Self::figment(&config_path).extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("\x1b[33mWarning:\x1b[0m Configuration error, using defaults");
                eprintln!("  Config file: {}", config_path.display());
                eprintln!("  Error: {}", e);
                eprintln!();
                eprintln!("  To fix, edit or delete the config file:");
                eprintln!("    rm {}", config_path.display());
                eprintln!();
                Config::default()
            }
        }
    }

    /// Layers defaults, the file at `config_path` and `VASSAGO_*` variables.
    ///
    /// String keys are read from the environment verbatim, so a numeric
    /// secret such as `VASSAGO_EMAIL_PASS=0123` stays the string `"0123"`.
    pub fn figment(config_path: &Path) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(STRING_KEYS));

        for key in STRING_KEYS {
            let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Ok(value) = std::env::var(&var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        figment
    }

    /// Returns the path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Returns the path to the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vassago")
    }

    /// Writes this configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        std::fs::write(path, toml_str)
    }

    /// Base URL for tracking links.
    pub fn resolved_public_url(&self, port: u16) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", port))
    }

    /// Sender address for tracking emails.
    pub fn sender(&self) -> Option<&str> {
        self.mail_from.as_deref().or(self.email_user.as_deref())
    }

    /// SMTP relay settings; missing credentials become empty strings.
    pub fn smtp_settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.email_user.clone().unwrap_or_default(),
            password: self.email_pass.clone().unwrap_or_default(),
        }
    }
}

/// Writes a config file with default values unless one already exists.
pub fn init_config() -> Result<PathBuf, std::io::Error> {
    let config_path = Config::config_path();
    init_config_at(&config_path)?;
    Ok(config_path)
}

fn init_config_at(path: &Path) -> Result<(), std::io::Error> {
    if path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }

    Config::default().save_to(path)
}

/// Prints the current configuration and its sources.
pub fn show_config() {
    let config = Config::load();
    let config_path = Config::config_path();

    println!("Vassago Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_path.display());
    if config_path.exists() {
        println!("Status: Found\n");
    } else {
        println!("Status: Not found (using defaults)\n");
    }

    println!("Current settings:");
    println!("  server_host: {}", config.server_host);
    println!("  server_port: {}", config.server_port);
    println!(
        "  public_url: {}",
        config.resolved_public_url(config.server_port)
    );
    println!("  cors: {}", config.cors);
    println!("  smtp_host: {}", config.smtp_host);
    println!("  smtp_port: {}", config.smtp_port);
    println!(
        "  email_user: {}",
        config.email_user.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  email_pass: {}",
        if config.email_pass.is_some() { "********" } else { "(not set)" }
    );
    println!("  mail_from: {}", config.sender().unwrap_or("(not set)"));
    println!("  mail_subject: {}", config.mail_subject);

    println!("\nEnvironment variables:");
    for key in [
        "SERVER_HOST",
        "SERVER_PORT",
        "PUBLIC_URL",
        "CORS",
        "SMTP_HOST",
        "SMTP_PORT",
        "EMAIL_USER",
        "EMAIL_PASS",
        "MAIL_FROM",
        "MAIL_SUBJECT",
    ] {
        println!("  VASSAGO_{}", key);
    }
}
