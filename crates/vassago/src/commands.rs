//! CLI command implementations.

use std::net::SocketAddr;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};

use vassago_mail::SmtpMailer;
use vassago_server::{Server, ServerConfig};
use vassago_store::InMemoryStore;

use crate::config::Config;

/// Start the tracking server.
pub async fn serve(
    cfg: Config,
    host: Option<String>,
    port: Option<u16>,
    public_url: Option<String>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| cfg.server_host.clone());
    let port = port.unwrap_or(cfg.server_port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .wrap_err_with(|| format!("Invalid listen address {}:{}", host, port))?;
    let public_url = public_url.unwrap_or_else(|| cfg.resolved_public_url(port));

    if cfg.email_user.is_none() || cfg.email_pass.is_none() {
        tracing::warn!(
            "SMTP credentials not configured (VASSAGO_EMAIL_USER / VASSAGO_EMAIL_PASS); sends will fail"
        );
    }

    let mailer =
        SmtpMailer::new(&cfg.smtp_settings()).wrap_err("Failed to configure the SMTP mailer")?;

    let config = ServerConfig::builder()
        .addr(addr)
        .cors(cfg.cors)
        .public_url(public_url)
        .sender(cfg.sender().unwrap_or_default())
        .subject(cfg.mail_subject.clone())
        .build();

    tracing::info!(smtp_host = %cfg.smtp_host, smtp_port = cfg.smtp_port, "Starting Vassago server...");

    let server = Server::new(config, Arc::new(InMemoryStore::new()), Arc::new(mailer));
    server.run().await?;

    Ok(())
}

/// Display version information.
pub fn version() {
    println!("Vassago {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("What is hidden is found.");
    println!();
    println!("Endpoints:");
    println!("  POST /send-email       - Send a tracking email");
    println!("  GET  /track/{{id}}       - Tracking pixel");
    println!("  GET  /report/{{email}}   - Open report");
    println!();
    println!("Daemoniorum, LLC");
}
