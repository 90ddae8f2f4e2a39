use chrono::{DateTime, Utc};
use crate::aggregator::{aggregate, ReportSummary};
use crate::models::ComputerStatus;

/// Everything the renderer needs, assembled once after classification.
/// Generation time and domain name are injected here so rendering stays a
/// pure function of its input.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub computers: Vec<ComputerStatus>,
    pub summary: ReportSummary,
    pub generation_time: DateTime<Utc>,
    pub domain_name: String,
    pub domain_controller: String,
}

impl ReportData {
    pub fn new(
        mut computers: Vec<ComputerStatus>,
        domain_name: String,
        domain_controller: String,
        generation_time: DateTime<Utc>,
    ) -> Self {
        // Rendered role string first ("Windows Client" < "Windows Server"),
        // computer name second.
        computers.sort_by(|a, b| {
            (a.os_role.as_str(), a.computer_name.to_lowercase())
                .cmp(&(b.os_role.as_str(), b.computer_name.to_lowercase()))
        });

        let summary = aggregate(&computers);

        Self {
            computers,
            summary,
            generation_time,
            domain_name,
            domain_controller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::models::{OsRole, RotationState, RotationType};

    fn status(name: &str, role: OsRole) -> ComputerStatus {
        ComputerStatus {
            computer_name: name.to_string(),
            os_role: role,
            operating_system: role.as_str().to_string(),
            rotation_state: RotationState::NotEnabled,
            rotation_type: RotationType::None,
            account_enabled: true,
            last_logon: "Never".to_string(),
            organizational_unit: "OU=Computers,DC=corp,DC=local".to_string(),
        }
    }

    #[test]
    fn rows_sort_clients_first_then_by_name() {
        let data = ReportData::new(
            vec![
                status("SRV02", OsRole::Server),
                status("ws10", OsRole::Client),
                status("SRV01", OsRole::Server),
                status("WS02", OsRole::Client),
            ],
            "corp.local".to_string(),
            "dc01.corp.local".to_string(),
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        );

        let names: Vec<&str> = data.computers.iter().map(|c| c.computer_name.as_str()).collect();
        assert_eq!(names, vec!["WS02", "ws10", "SRV01", "SRV02"]);
    }

    #[test]
    fn summary_reflects_sorted_rows() {
        let data = ReportData::new(
            vec![status("A", OsRole::Server), status("B", OsRole::Client)],
            "corp.local".to_string(),
            "dc01.corp.local".to_string(),
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        );
        assert_eq!(data.summary.total_computers, 2);
        assert_eq!(data.summary.server_count, 1);
        assert_eq!(data.summary.client_count, 1);
    }
}
