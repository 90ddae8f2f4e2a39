use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw computer object as returned by the directory query, before
/// classification. Attribute values are kept as-is; only
/// `userAccountControl` and `lastLogonTimestamp` are decoded at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputerRecord {
    pub name: String,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    /// Windows LAPS expiration attribute (msLAPS-PasswordExpirationTime)
    pub modern_expiration: Option<String>,
    /// Legacy LAPS expiration attribute (ms-Mcs-AdmPwdExpirationTime)
    pub legacy_expiration: Option<String>,
    pub account_enabled: bool,
    pub last_logon: Option<DateTime<Utc>>,
    pub distinguished_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsRole {
    Server,
    Client,
}

impl OsRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsRole::Server => "Windows Server",
            OsRole::Client => "Windows Client",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationState {
    Enabled,
    NotEnabled,
}

impl RotationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationState::Enabled => "Enabled",
            RotationState::NotEnabled => "Not Enabled",
        }
    }
}

/// Which password-rotation mechanism is active. Windows LAPS wins over the
/// legacy attribute when both are set on a machine mid-migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationType {
    Modern,
    Legacy,
    None,
}

impl RotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationType::Modern => "Windows LAPS",
            RotationType::Legacy => "Legacy LAPS",
            RotationType::None => "None",
        }
    }
}

/// Normalized per-computer status, one per raw record. Built once by the
/// classifier and immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputerStatus {
    pub computer_name: String,
    pub os_role: OsRole,
    pub operating_system: String,
    pub rotation_state: RotationState,
    pub rotation_type: RotationType,
    pub account_enabled: bool,
    /// "YYYY-MM-DD HH:mm:ss" or "Never"
    pub last_logon: String,
    /// Distinguished name with the object's own leaf component stripped
    pub organizational_unit: String,
}

impl ComputerRecord {
    pub fn new(name: String, dn: String) -> Self {
        Self {
            name,
            operating_system: None,
            operating_system_version: None,
            modern_expiration: None,
            legacy_expiration: None,
            account_enabled: true,
            last_logon: None,
            distinguished_name: dn,
        }
    }

    /// The upstream query filters on operatingSystem=*Windows*; this
    /// re-checks the same condition client-side so a lenient directory
    /// cannot leak non-Windows entries into the report.
    pub fn is_windows(&self) -> bool {
        self.operating_system
            .as_deref()
            .map(|os| os.to_lowercase().contains("windows"))
            .unwrap_or(false)
    }
}
