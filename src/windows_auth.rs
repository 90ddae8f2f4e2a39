use anyhow::Result;

/// Windows environment helpers: integrated-auth availability, current
/// domain discovery, and default domain-controller detection.
pub struct WindowsAuth;

impl WindowsAuth {
    /// Check if Kerberos integrated authentication is available on this platform
    pub fn is_available() -> bool {
        #[cfg(windows)]
        {
            // Domain-joined Windows machines expose both variables
            std::env::var("USERDOMAIN").is_ok() && std::env::var("USERNAME").is_ok()
        }
        #[cfg(not(windows))]
        {
            false
        }
    }

    /// Get current Windows user information
    pub fn get_current_user() -> Result<(String, String)> {
        #[cfg(windows)]
        {
            let username = std::env::var("USERNAME")
                .context("Failed to get current username from environment")?;
            let domain = std::env::var("USERDOMAIN")
                .context("Failed to get current user domain from environment")?;
            Ok((domain, username))
        }
        #[cfg(not(windows))]
        {
            Err(anyhow::anyhow!(
                "Kerberos integrated authentication is only available on Windows platforms"
            ))
        }
    }

    /// Get the current user's domain
    pub fn get_current_domain() -> Option<String> {
        #[cfg(windows)]
        {
            std::env::var("USERDNSDOMAIN")
                .or_else(|_| std::env::var("USERDOMAIN"))
                .ok()
        }
        #[cfg(not(windows))]
        {
            None
        }
    }

    /// Get default LDAP server from Windows environment
    pub fn get_default_ldap_server() -> Option<String> {
        #[cfg(windows)]
        {
            // Try to get domain controller from LOGONSERVER
            std::env::var("LOGONSERVER").ok()
                .map(|server| server.trim_start_matches("\\\\").to_string())
                .or_else(|| {
                    // Fallback: use DNS domain as server
                    std::env::var("USERDNSDOMAIN").ok()
                })
        }
        #[cfg(not(windows))]
        {
            None
        }
    }

    /// Validate that the server FQDN can be resolved
    pub fn validate_server_dns(server: &str) -> Result<String> {
        // GSSAPI needs a proper FQDN (contains at least one dot), not an
        // IP address or short hostname
        if server.contains('.') {
            Ok(server.to_string())
        } else {
            Err(anyhow::anyhow!(
                "Server '{}' does not appear to be a fully qualified domain name (FQDN). \
                 GSSAPI authentication requires the server's FQDN (e.g., 'dc01.corp.local'). \
                 Please provide the correct FQDN.",
                server
            ))
        }
    }
}

/// Helper function to determine if we should attempt Kerberos authentication
pub fn should_use_gssapi(use_gssapi_flag: bool) -> bool {
    // Explicitly requested AND the platform supports it (Windows currently)
    use_gssapi_flag && WindowsAuth::is_available()
}

/// Helper function to get the default LDAP server
pub fn get_default_ldap_server() -> Option<String> {
    WindowsAuth::get_default_ldap_server()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqdn_validation_accepts_dotted_names() {
        assert!(WindowsAuth::validate_server_dns("dc01.corp.local").is_ok());
        assert!(WindowsAuth::validate_server_dns("dc01").is_err());
    }

    #[test]
    fn gssapi_is_never_attempted_without_the_flag() {
        assert!(!should_use_gssapi(false));
    }
}
