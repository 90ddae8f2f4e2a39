use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use regex::Regex;
use rpassword::prompt_password;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber;

mod aggregator;
mod classifier;
mod diagnostics;
mod html_generator;
mod ldap_client;
mod models;
mod publisher;
mod report_data;
mod windows_auth;

use diagnostics::Diagnostics;
use ldap_client::LdapClient;
use report_data::ReportData;
use windows_auth::{get_default_ldap_server, should_use_gssapi, WindowsAuth};

#[derive(Parser, Debug)]
#[clap(
    name = "laps-report",
    version = "0.1.0",
    about = "Generate an HTML LAPS status report for domain-joined Windows computers",
    long_about = None
)]
struct Args {
    /// LDAP/AD server hostname or IP address (auto-detected on Windows if not provided)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Username for LDAP authentication (e.g., "DOMAIN\\username" or "username@domain.com")
    /// Optional when using Windows authentication
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Password for LDAP authentication (will prompt if not provided)
    #[arg(short = 'p', long, hide = true)]
    password: Option<String>,

    /// Output HTML file path (optional - will auto-generate if not provided)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Domain name for the report footer (derived from the directory if not provided)
    #[arg(short = 'd', long)]
    domain: Option<String>,

    /// Use TLS for LDAP connection
    #[arg(long, default_value = "true")]
    use_tls: bool,

    /// Use Kerberos/GSSAPI authentication (Windows integrated, no password required)
    /// Only works on domain-joined Windows machines
    #[arg(long)]
    use_gssapi: bool,

    /// Timeout in seconds for the directory connection and query
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Do not open the generated report in the default viewer
    #[arg(long)]
    no_open: bool,

    /// Run connection/permission diagnostics and exit
    #[arg(long)]
    diagnose: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting LAPS status report generation");

    // Handle diagnostics request
    if args.diagnose {
        info!("Running diagnostics...\n");

        let server = args.server.clone().unwrap_or_else(|| {
            get_default_ldap_server().unwrap_or_else(|| "dc01.example.com".to_string())
        });

        Diagnostics::run_preflight_checks(&server)?;
        Diagnostics::show_troubleshooting_guide();
        Diagnostics::show_auth_info();
        return Ok(());
    }

    // Determine server and authentication method
    let server = match args.server.clone().or_else(get_default_ldap_server) {
        Some(server) => server,
        None => {
            return Err(anyhow::anyhow!(
                "LDAP server must be provided with --server when not on a Windows domain"
            ))
        }
    };

    info!("Server: {}", server);

    if should_use_gssapi(args.use_gssapi) {
        // GSSAPI/Kerberos authentication (Windows integrated)
        info!("GSSAPI authentication requested");

        let server_fqdn = WindowsAuth::validate_server_dns(&server)
            .context("Invalid server FQDN for GSSAPI authentication")?;

        let (domain, username) = WindowsAuth::get_current_user()
            .context("Failed to get current user information")?;

        info!("Current user: {}\\{}", domain, username);
        info!("Authenticating using Kerberos/GSSAPI...");

        debug!("Connecting to LDAP server...");
        let mut client = LdapClient::connect(&server, args.use_tls, args.timeout_secs)
            .await
            .context("Failed to connect to LDAP server")?;

        info!("Connected to LDAP server");

        debug!("Attempting GSSAPI bind to: {}", server_fqdn);
        client.bind_gssapi(&server_fqdn)
            .await
            .context("GSSAPI authentication failed. Run with --diagnose for troubleshooting help")?;

        info!("Successfully authenticated with Kerberos/GSSAPI");

        run_report(&mut client, &server, &args).await?;
    } else {
        // Simple authentication (username/password)
        let username = args.username.clone().ok_or_else(|| {
            anyhow::anyhow!("Either --use-gssapi or --username must be provided")
        })?;
        let password = match args.password.clone() {
            Some(p) => p,
            None => prompt_password(&format!("Enter password for {}: ", username))
                .context("Failed to read password")?,
        };

        debug!("Connecting to LDAP server...");
        let mut client = LdapClient::connect(&server, args.use_tls, args.timeout_secs)
            .await
            .context("Failed to connect to LDAP server")?;

        info!("Connected to LDAP server");

        debug!("Authenticating with simple bind...");
        client.bind_simple(&username, &password)
            .await
            .context("Failed to authenticate with LDAP")?;

        info!("Successfully authenticated");

        run_report(&mut client, &server, &args).await?;
    }

    Ok(())
}

/// Run the full pipeline: query, classify, aggregate, render, publish.
async fn run_report(client: &mut LdapClient, server: &str, args: &Args) -> Result<()> {
    info!("Querying directory for Windows computer objects...");
    let records = client.fetch_computers()
        .await
        .context("Failed to retrieve computer inventory from the directory")?;

    info!("Retrieved {} computer objects", records.len());

    let computers: Vec<_> = records.iter().map(classifier::classify).collect();

    let domain_name = args.domain.clone().unwrap_or_else(|| {
        let derived = client.domain_name();
        if derived.is_empty() {
            WindowsAuth::get_current_domain().unwrap_or_else(|| server.to_string())
        } else {
            derived
        }
    });

    let generation_time = Utc::now();
    let report_data = ReportData::new(
        computers,
        domain_name,
        server.to_string(),
        generation_time,
    );

    debug!("Rendering HTML report...");
    let document = html_generator::render_report(&report_data);

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => PathBuf::from(generate_filename(&report_data.domain_name, &generation_time)),
    };

    publisher::publish(&output_path, &document)
        .context("Failed to publish report")?;

    info!("✓ Report saved: {}", output_path.display());

    publisher::print_summary(&report_data.summary);

    if !args.no_open {
        publisher::open_in_viewer(&output_path);
    }

    Ok(())
}

/// Generate a sanitized filename for the report based on the domain name
fn generate_filename(domain: &str, timestamp: &DateTime<Utc>) -> String {
    // Sanitize domain for filesystem compatibility
    let re = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
    let clean_domain = re.replace_all(domain, "_").to_string();

    let time_str = timestamp.format("%Y%m%d_%H%M%S");

    format!("laps_status_{}_{}.html", clean_domain, time_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_is_sanitized_and_stamped() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(
            generate_filename("corp.local", &ts),
            "laps_status_corp.local_20240601_083000.html"
        );
        assert_eq!(
            generate_filename("corp\\local", &ts),
            "laps_status_corp_local_20240601_083000.html"
        );
    }
}
