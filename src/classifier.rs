use chrono::{DateTime, Utc};
use crate::models::{ComputerRecord, ComputerStatus, OsRole, RotationState, RotationType};

/// Map a raw directory record to its normalized status. Total function:
/// missing attributes degrade to defaults instead of failing.
pub fn classify(record: &ComputerRecord) -> ComputerStatus {
    let (rotation_state, rotation_type) = classify_rotation(
        record.modern_expiration.as_deref(),
        record.legacy_expiration.as_deref(),
    );

    ComputerStatus {
        computer_name: record.name.clone(),
        os_role: classify_role(record.operating_system.as_deref()),
        operating_system: record.operating_system.clone().unwrap_or_default(),
        rotation_state,
        rotation_type,
        account_enabled: record.account_enabled,
        last_logon: format_last_logon(record.last_logon),
        organizational_unit: parent_container(&record.distinguished_name),
    }
}

/// Plain substring heuristic on the free-text OS name. Anything without
/// "server" in it is a client, including empty or unusual names.
fn classify_role(operating_system: Option<&str>) -> OsRole {
    match operating_system {
        Some(os) if os.to_lowercase().contains("server") => OsRole::Server,
        _ => OsRole::Client,
    }
}

/// Rotation mechanism priority: a set Windows LAPS expiration always wins,
/// even when the legacy attribute is still populated on a machine
/// mid-migration. Only when it is absent does the legacy attribute count.
fn classify_rotation(
    modern: Option<&str>,
    legacy: Option<&str>,
) -> (RotationState, RotationType) {
    if modern.is_some_and(|v| !v.is_empty()) {
        (RotationState::Enabled, RotationType::Modern)
    } else if legacy.is_some_and(|v| !v.is_empty()) {
        (RotationState::Enabled, RotationType::Legacy)
    } else {
        (RotationState::NotEnabled, RotationType::None)
    }
}

fn format_last_logon(last_logon: Option<DateTime<Utc>>) -> String {
    match last_logon {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Never".to_string(),
    }
}

/// Everything after the first comma of the distinguished name: the leading
/// CN=<name> component is dropped, the rest is kept verbatim.
fn parent_container(distinguished_name: &str) -> String {
    distinguished_name
        .split_once(',')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(os: Option<&str>, modern: Option<&str>, legacy: Option<&str>) -> ComputerRecord {
        let mut rec = ComputerRecord::new(
            "PC01".to_string(),
            "CN=PC01,OU=Workstations,DC=corp,DC=local".to_string(),
        );
        rec.operating_system = os.map(String::from);
        rec.modern_expiration = modern.map(String::from);
        rec.legacy_expiration = legacy.map(String::from);
        rec
    }

    #[test]
    fn modern_attribute_wins_over_legacy() {
        let status = classify(&record(
            Some("Windows Server 2022 Standard"),
            Some("133497293895000000"),
            Some("133497293895000000"),
        ));
        assert_eq!(status.rotation_state, RotationState::Enabled);
        assert_eq!(status.rotation_type, RotationType::Modern);
    }

    #[test]
    fn legacy_only_classifies_as_legacy() {
        let status = classify(&record(
            Some("Windows 10 Enterprise"),
            None,
            Some("133497293895000000"),
        ));
        assert_eq!(status.rotation_state, RotationState::Enabled);
        assert_eq!(status.rotation_type, RotationType::Legacy);
    }

    #[test]
    fn neither_attribute_means_not_enabled() {
        let status = classify(&record(Some("Windows 11 Pro"), None, None));
        assert_eq!(status.rotation_state, RotationState::NotEnabled);
        assert_eq!(status.rotation_type, RotationType::None);
    }

    #[test]
    fn empty_attribute_values_count_as_absent() {
        let status = classify(&record(Some("Windows 11 Pro"), Some(""), Some("")));
        assert_eq!(status.rotation_state, RotationState::NotEnabled);
        assert_eq!(status.rotation_type, RotationType::None);
    }

    #[test]
    fn server_substring_is_case_insensitive() {
        assert_eq!(classify_role(Some("Windows SERVER 2019 Datacenter")), OsRole::Server);
        assert_eq!(classify_role(Some("Windows 11 Pro")), OsRole::Client);
    }

    #[test]
    fn missing_or_empty_os_defaults_to_client() {
        assert_eq!(classify_role(None), OsRole::Client);
        assert_eq!(classify_role(Some("")), OsRole::Client);
    }

    #[test]
    fn server_with_modern_attribute_scenario() {
        let status = classify(&record(
            Some("Windows Server 2022 Standard"),
            Some("133497293895000000"),
            None,
        ));
        assert_eq!(status.os_role, OsRole::Server);
        assert_eq!(status.rotation_state, RotationState::Enabled);
        assert_eq!(status.rotation_type, RotationType::Modern);
    }

    #[test]
    fn client_without_attributes_never_logged_on() {
        let status = classify(&record(Some("Windows 11 Pro"), None, None));
        assert_eq!(status.os_role, OsRole::Client);
        assert_eq!(status.rotation_state, RotationState::NotEnabled);
        assert_eq!(status.last_logon, "Never");
    }

    #[test]
    fn last_logon_formatting() {
        let mut rec = record(Some("Windows 11 Pro"), None, None);
        rec.last_logon = Some(Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap());
        assert_eq!(classify(&rec).last_logon, "2024-03-07 14:05:09");
    }

    #[test]
    fn organizational_unit_drops_only_the_leaf() {
        assert_eq!(
            parent_container("CN=WS01,OU=Workstations,DC=corp,DC=local"),
            "OU=Workstations,DC=corp,DC=local"
        );
    }

    #[test]
    fn organizational_unit_of_comma_less_dn_is_empty() {
        assert_eq!(parent_container("CN=WS01"), "");
    }
}
