use serde::{Deserialize, Serialize};
use crate::models::{ComputerStatus, OsRole, RotationState, RotationType};

/// Aggregate counts and percentages over one classified inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_computers: usize,
    pub server_count: usize,
    pub client_count: usize,
    pub enabled_count: usize,
    pub not_enabled_count: usize,
    pub legacy_count: usize,
    pub modern_count: usize,
    pub server_enabled_count: usize,
    pub client_enabled_count: usize,
    /// Rotation-enabled share of all computers
    pub enabled_percentage: f64,
    /// Rotation-enabled share of servers
    pub server_enabled_percentage: f64,
    /// Rotation-enabled share of clients
    pub client_enabled_percentage: f64,
    /// Windows LAPS share of rotation-enabled computers
    pub modern_percentage: f64,
}

/// Single pass over the statuses; counts are commutative so input order
/// does not matter. Total on empty input: all zeros, no division by zero.
pub fn aggregate(computers: &[ComputerStatus]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_computers: computers.len(),
        server_count: 0,
        client_count: 0,
        enabled_count: 0,
        not_enabled_count: 0,
        legacy_count: 0,
        modern_count: 0,
        server_enabled_count: 0,
        client_enabled_count: 0,
        enabled_percentage: 0.0,
        server_enabled_percentage: 0.0,
        client_enabled_percentage: 0.0,
        modern_percentage: 0.0,
    };

    for computer in computers {
        let enabled = computer.rotation_state == RotationState::Enabled;

        match computer.os_role {
            OsRole::Server => {
                summary.server_count += 1;
                if enabled {
                    summary.server_enabled_count += 1;
                }
            }
            OsRole::Client => {
                summary.client_count += 1;
                if enabled {
                    summary.client_enabled_count += 1;
                }
            }
        }

        if enabled {
            summary.enabled_count += 1;
        } else {
            summary.not_enabled_count += 1;
        }

        match computer.rotation_type {
            RotationType::Modern => summary.modern_count += 1,
            RotationType::Legacy => summary.legacy_count += 1,
            RotationType::None => {}
        }
    }

    summary.enabled_percentage = percentage(summary.enabled_count, summary.total_computers);
    summary.server_enabled_percentage =
        percentage(summary.server_enabled_count, summary.server_count);
    summary.client_enabled_percentage =
        percentage(summary.client_enabled_count, summary.client_count);
    summary.modern_percentage = percentage(summary.modern_count, summary.enabled_count);

    summary
}

/// round(n / d * 100, 2); exactly 0 when the denominator is 0.
fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 100.0 * 100.0).round() / 100.0
}
