use anyhow::Result;
use tracing::{info, warn};

/// Preflight checks for the directory connection and the attribute read
/// rights this report depends on.
pub struct Diagnostics;

impl Diagnostics {
    /// Run pre-flight checks and exit without touching the directory.
    pub fn run_preflight_checks(server: &str) -> Result<()> {
        info!("Running preflight checks...\n");

        Self::check_platform();

        #[cfg(windows)]
        Self::check_domain_joined();

        Self::check_server_fqdn(server);
        Self::check_network_connectivity(server);
        Self::check_attribute_permissions();

        info!("Preflight checks completed.\n");
        Ok(())
    }

    fn check_platform() {
        info!("✓ Platform Check:");
        #[cfg(windows)]
        {
            info!("  Running on Windows - GSSAPI/Kerberos supported");
        }
        #[cfg(not(windows))]
        {
            warn!("  Not running on Windows - GSSAPI/Kerberos not available");
            info!("  Use explicit credentials (-u, -p) instead");
        }
        info!("");
    }

    #[cfg(windows)]
    fn check_domain_joined() {
        info!("✓ Domain Status Check:");
        match (std::env::var("USERDOMAIN"), std::env::var("USERDNSDOMAIN")) {
            (Ok(domain), Ok(dns_domain)) => {
                info!("  Domain: {} ({})", domain, dns_domain);
                info!("  ✓ Machine appears to be domain-joined");
            }
            _ => {
                warn!("  Unable to detect domain membership");
                warn!("  Provide --server explicitly on non-domain machines");
            }
        }
        info!("");
    }

    fn check_server_fqdn(server: &str) {
        info!("✓ Server FQDN Validation:");
        info!("  Server: {}", server);

        if server.chars().all(|c| c.is_numeric() || c == '.') {
            warn!("  Server appears to be an IP address");
            warn!("  GSSAPI authentication requires the server's FQDN");
        } else if server.contains('.') {
            info!("  ✓ Server appears to be fully qualified");
        } else {
            warn!("  Server does not appear to be fully qualified");
            warn!("  GSSAPI requires FQDN (e.g., 'dc01.corp.local', not 'dc01')");
        }
        info!("");
    }

    fn check_network_connectivity(server: &str) {
        info!("✓ Network Connectivity Check:");
        match std::net::ToSocketAddrs::to_socket_addrs(&format!("{}:389", server)) {
            Ok(addrs) => {
                let addrs: Vec<_> = addrs.collect();
                if let Some(addr) = addrs.first() {
                    info!("  ✓ Server resolved: {} ({})", server, addr.ip());
                } else {
                    warn!("  Could not resolve server address: {}", server);
                }
            }
            Err(_) => {
                warn!("  Could not resolve server: {}", server);
                warn!("  Check DNS configuration and verify the server FQDN");
            }
        }
        info!("");
    }

    fn check_attribute_permissions() {
        info!("✓ Attribute Permissions:");
        info!("  This report reads two protected attributes:");
        info!("    msLAPS-PasswordExpirationTime (Windows LAPS)");
        info!("    ms-Mcs-AdmPwdExpirationTime   (Legacy LAPS)");
        info!("  Both require delegated read rights on computer objects.");
        warn!("  Without them the attributes come back empty and every");
        warn!("  machine is reported as rotation not enabled.");
        info!("");
    }

    /// Display troubleshooting guidance
    pub fn show_troubleshooting_guide() {
        info!("\n=== Troubleshooting Guide ===\n");

        info!("1. Every computer reports \"Not Enabled\":");
        info!("   - The bound account likely lacks read rights on the");
        info!("     LAPS expiration attributes");
        info!("   - Verify with an account holding delegated LAPS read rights");
        info!("");

        info!("2. GSSAPI bind failures:");
        info!("   - Use the server's fully qualified domain name (FQDN)");
        info!("   - Only domain-joined Windows machines can use GSSAPI");
        info!("   - Kerberos tickets may have expired (gpupdate /force, or reboot)");
        info!("   - Or use explicit credentials: --username and --password");
        info!("");

        info!("3. \"Cannot reach domain controller\":");
        info!("   - Check firewall rules (LDAP port 389/636)");
        info!("   - Verify DNS resolution: nslookup <server_fqdn>");
        info!("");

        info!("4. Query hangs or times out:");
        info!("   - Raise --timeout-secs for large domains");
        info!("   - Point --server at a closer domain controller");
        info!("");
    }

    /// Display current authentication method info
    pub fn show_auth_info() {
        info!("Authentication Configuration:");
        #[cfg(all(windows, feature = "gssapi"))]
        {
            info!("✓ GSSAPI/Kerberos support: ENABLED");
            info!("  Use --use-gssapi to authenticate with current Windows user");
        }
        #[cfg(not(all(windows, feature = "gssapi")))]
        {
            info!("ℹ GSSAPI/Kerberos support: NOT AVAILABLE");
            info!("  (Requires Windows platform and 'gssapi' feature)");
        }
        info!("✓ Simple authentication: ALWAYS AVAILABLE");
        info!("  Use --username and --password for explicit credentials");
    }
}
