use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use std::time::Duration;
use tracing::debug;
use crate::models::ComputerRecord;

/// Directory servers commonly cap result sets at 1000 entries; paging in
/// chunks below that keeps the bulk query one logical sequence.
const PAGE_SIZE: i32 = 500;

pub struct LdapClient {
    ldap: Ldap,
    base_dn: String,
    timeout: Duration,
}

impl LdapClient {
    pub async fn connect(server: &str, use_tls: bool, timeout_secs: u64) -> Result<Self> {
        let ldap_url = if use_tls {
            format!("ldaps://{}:636", server)
        } else {
            format!("ldap://{}:389", server)
        };

        let timeout = Duration::from_secs(timeout_secs);
        let settings = LdapConnSettings::new().set_conn_timeout(timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &ldap_url)
            .await
            .context("Failed to connect to LDAP server")?;

        ldap3::drive!(conn);

        // Get base DN from rootDSE (proper way to discover naming context)
        let base_dn = Self::get_base_dn_from_rootdse(&mut ldap)
            .await
            .unwrap_or_else(|_| Self::extract_base_dn(server));

        Ok(Self {
            ldap,
            base_dn,
            timeout,
        })
    }

    /// Bind using GSSAPI/Kerberos authentication (Windows integrated)
    /// Requires:
    /// - Windows domain-joined machine
    /// - Valid Kerberos ticket (automatically obtained)
    /// - Server FQDN (not IP address or short hostname)
    pub async fn bind_gssapi(&mut self, server_fqdn: &str) -> Result<()> {
        #[cfg(windows)]
        {
            // Perform SASL GSSAPI bind using current user's Kerberos credentials
            self.ldap
                .sasl_gssapi_bind(server_fqdn)
                .await
                .context(
                    "GSSAPI bind failed. This usually indicates:\n\
                     1. Server FQDN is incorrect (provide full domain name, not IP)\n\
                     2. Machine is not domain-joined\n\
                     3. Kerberos ticket unavailable (reboot or use 'kinit' on Unix)\n\
                     4. Service Principal Name (SPN) not registered in AD\n\
                     5. Network connectivity to domain controller lost"
                )?
                .success()
                .context("GSSAPI bind authentication failed")?;
            Ok(())
        }
        #[cfg(not(windows))]
        {
            let _ = server_fqdn;
            Err(anyhow::anyhow!(
                "GSSAPI/Kerberos authentication requires:\n\
                 - Windows platform\n\
                 - Domain-joined machine\n\
                 - Proper SPN registration in Active Directory\n\n\
                 Alternative: Use explicit credentials with --username and --password options"
            ))
        }
    }

    /// Bind using simple authentication (username/password)
    /// Fallback for non-Windows platforms or when GSSAPI is unavailable
    pub async fn bind_simple(&mut self, username: &str, password: &str) -> Result<()> {
        self.ldap
            .simple_bind(username, password)
            .await
            .context("Failed to connect for simple bind")?
            .success()
            .context("Simple bind authentication failed")?;
        Ok(())
    }

    /// Bulk query for every Windows computer object in the domain, with the
    /// fixed attribute projection the classifier needs. Pages server-side
    /// so directory result-size limits never truncate the inventory.
    ///
    /// Reading the two password-expiration attributes requires delegated
    /// read rights; without them both come back absent and every machine
    /// would report as not enabled.
    pub async fn fetch_computers(&mut self) -> Result<Vec<ComputerRecord>> {
        let filter = "(&(objectCategory=computer)(operatingSystem=*Windows*))";
        let attributes = vec![
            "name",
            "operatingSystem",
            "operatingSystemVersion",
            "msLAPS-PasswordExpirationTime",
            "ms-Mcs-AdmPwdExpirationTime",
            "userAccountControl",
            "lastLogonTimestamp",
            "distinguishedName",
        ];

        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(PAGE_SIZE)),
        ];

        let mut search = self
            .ldap
            .with_timeout(self.timeout)
            .streaming_search_with(adapters, &self.base_dn, Scope::Subtree, filter, attributes)
            .await
            .context("Failed to search for computer objects")?;

        let mut computers = Vec::new();
        while let Some(entry) = search
            .next()
            .await
            .context("Failed to read computer search results")?
        {
            let record = Self::parse_computer(SearchEntry::construct(entry));
            // Re-check the OS filter client-side; anything non-Windows is
            // silently excluded and counted nowhere.
            if record.is_windows() {
                computers.push(record);
            } else {
                debug!("Skipping non-Windows entry: {}", record.distinguished_name);
            }
        }

        search
            .finish()
            .await
            .success()
            .context("Computer search failed")?;

        debug!("Directory returned {} Windows computer objects", computers.len());
        Ok(computers)
    }

    /// Dotted domain name derived from the DC components of the base DN,
    /// e.g. "DC=corp,DC=local" -> "corp.local". Cosmetic, used in the
    /// report footer.
    pub fn domain_name(&self) -> String {
        Self::domain_from_base_dn(&self.base_dn)
    }

    fn parse_computer(entry: SearchEntry) -> ComputerRecord {
        let name = Self::get_attr(&entry, "name")
            .unwrap_or_else(|| Self::dn_leaf(&entry.dn));

        let mut record = ComputerRecord::new(name, entry.dn.clone());

        record.operating_system = Self::get_attr(&entry, "operatingSystem");
        record.operating_system_version = Self::get_attr(&entry, "operatingSystemVersion");
        record.modern_expiration = Self::get_attr(&entry, "msLAPS-PasswordExpirationTime");
        record.legacy_expiration = Self::get_attr(&entry, "ms-Mcs-AdmPwdExpirationTime");

        if let Some(uac_str) = Self::get_attr(&entry, "userAccountControl") {
            if let Ok(uac) = uac_str.parse::<u32>() {
                record.account_enabled = (uac & 0x2) == 0; // ADS_UF_ACCOUNTDISABLE
            }
        }

        record.last_logon = Self::parse_ad_timestamp(
            Self::get_attr(&entry, "lastLogonTimestamp").as_deref()
        );

        record
    }

    fn get_attr(entry: &SearchEntry, attr: &str) -> Option<String> {
        entry.attrs
            .get(attr)
            .and_then(|v| v.first())
            .cloned()
    }

    fn dn_leaf(dn: &str) -> String {
        dn.split(',')
            .next()
            .and_then(|leaf| leaf.split('=').nth(1))
            .unwrap_or(dn)
            .to_string()
    }

    /// Query rootDSE to get the proper base DN (naming context)
    async fn get_base_dn_from_rootdse(ldap: &mut Ldap) -> Result<String> {
        // Query rootDSE (empty DN with base scope)
        let (rs, _res) = ldap
            .search(
                "",
                Scope::Base,
                "(objectClass=*)",
                vec!["defaultNamingContext"],
            )
            .await
            .context("Failed to query rootDSE")?
            .success()
            .context("rootDSE query failed")?;

        let entry = rs
            .into_iter()
            .next()
            .context("rootDSE entry not found")?;

        let search_entry = SearchEntry::construct(entry);

        Self::get_attr(&search_entry, "defaultNamingContext")
            .context("defaultNamingContext not found in rootDSE")
    }

    fn extract_base_dn(server: &str) -> String {
        // Fallback: assumes the parts after the hostname are the domain
        let parts: Vec<&str> = server.split('.').collect();

        // Skip the first part (hostname) if there are more than 2 parts
        let domain_parts = if parts.len() > 2 {
            &parts[1..]
        } else {
            &parts
        };

        let dc_parts: Vec<String> = domain_parts.iter().map(|p| format!("DC={}", p)).collect();
        dc_parts.join(",")
    }

    fn domain_from_base_dn(base_dn: &str) -> String {
        base_dn
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                if part.len() > 3 && part[..3].eq_ignore_ascii_case("DC=") {
                    Some(&part[3..])
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn parse_ad_timestamp(timestamp: Option<&str>) -> Option<DateTime<Utc>> {
        timestamp.and_then(|ts| {
            ts.parse::<i64>().ok().and_then(|ticks| {
                // AD timestamp is in 100-nanosecond intervals since 1601-01-01
                let unix_ticks = ticks - 116444736000000000i64;
                let seconds = unix_ticks / 10000000;
                DateTime::from_timestamp(seconds, 0)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_timestamp_epoch_boundary() {
        let ts = LdapClient::parse_ad_timestamp(Some("116444736000000000")).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "1970-01-01 00:00:00");
    }

    #[test]
    fn ad_timestamp_recent_value() {
        let ts = LdapClient::parse_ad_timestamp(Some("133497293895000000")).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-14 18:09:49");
    }

    #[test]
    fn ad_timestamp_garbage_is_none() {
        assert!(LdapClient::parse_ad_timestamp(Some("not-a-number")).is_none());
        assert!(LdapClient::parse_ad_timestamp(None).is_none());
    }

    #[test]
    fn base_dn_fallback_skips_hostname() {
        assert_eq!(
            LdapClient::extract_base_dn("dc01.corp.example.com"),
            "DC=corp,DC=example,DC=com"
        );
        assert_eq!(LdapClient::extract_base_dn("corp.local"), "DC=corp,DC=local");
    }

    #[test]
    fn domain_name_from_dc_components() {
        assert_eq!(
            LdapClient::domain_from_base_dn("DC=corp,DC=local"),
            "corp.local"
        );
        assert_eq!(
            LdapClient::domain_from_base_dn("OU=Workstations,DC=corp,DC=local"),
            "corp.local"
        );
        assert_eq!(LdapClient::domain_from_base_dn("dc=corp,dc=local"), "corp.local");
    }

    #[test]
    fn dn_leaf_extraction() {
        assert_eq!(LdapClient::dn_leaf("CN=WS01,OU=Workstations,DC=corp,DC=local"), "WS01");
    }

    #[test]
    fn parse_computer_decodes_uac_and_attributes() {
        let mut attrs = std::collections::HashMap::new();
        attrs.insert("name".to_string(), vec!["SRV01".to_string()]);
        attrs.insert("operatingSystem".to_string(), vec!["Windows Server 2022 Standard".to_string()]);
        attrs.insert("userAccountControl".to_string(), vec!["4098".to_string()]); // disabled bit set
        attrs.insert(
            "msLAPS-PasswordExpirationTime".to_string(),
            vec!["133497293895000000".to_string()],
        );
        let entry = SearchEntry {
            dn: "CN=SRV01,OU=Servers,DC=corp,DC=local".to_string(),
            attrs,
            bin_attrs: std::collections::HashMap::new(),
        };

        let record = LdapClient::parse_computer(entry);
        assert_eq!(record.name, "SRV01");
        assert!(!record.account_enabled);
        assert!(record.modern_expiration.is_some());
        assert!(record.legacy_expiration.is_none());
        assert!(record.is_windows());
    }
}
