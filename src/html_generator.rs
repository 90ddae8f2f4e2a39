//! HTML report generation.
//!
//! Produces one self-contained document with embedded CSS and JavaScript;
//! sorting and filtering run entirely client-side over the rendered rows,
//! so the report works offline and never re-queries the directory.

use crate::aggregator::ReportSummary;
use crate::models::{ComputerStatus, RotationState, RotationType};
use crate::report_data::ReportData;

/// Render the full report document. Deterministic: generation time and
/// domain name come from `data`, never from ambient state.
pub fn render_report(data: &ReportData) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LAPS Status Report - {domain}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {summary}
        {table}
        {footer}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        domain = html_escape(&data.domain_name),
        css = inline_css(),
        js = inline_javascript(),
        header = render_header(data),
        summary = render_summary(&data.summary),
        table = render_computers_table(&data.computers),
        footer = render_footer(data),
    )
}

fn render_header(data: &ReportData) -> String {
    format!(
        r#"<header>
    <h1>LAPS Status Report</h1>
    <div class="meta">
        <span>Domain: <strong>{domain}</strong></span> •
        <span>Domain Controller: <strong>{dc}</strong></span> •
        <span>Generated: {timestamp}</span>
    </div>
</header>"#,
        domain = html_escape(&data.domain_name),
        dc = html_escape(&data.domain_controller),
        timestamp = data.generation_time.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Seven stat cards; the server and client cards carry their enabled
/// counts and percentages.
fn render_summary(summary: &ReportSummary) -> String {
    format!(
        r#"<div class="summary">
    <div class="summary-card">
        <h3>Total Computers</h3>
        <div class="value">{total}</div>
    </div>
    <div class="summary-card card-enabled">
        <h3>Rotation Enabled</h3>
        <div class="value">{enabled}</div>
        <div class="detail">{enabled_pct:.2}% of all computers</div>
    </div>
    <div class="summary-card card-missing">
        <h3>Not Enabled</h3>
        <div class="value">{not_enabled}</div>
    </div>
    <div class="summary-card">
        <h3>Legacy LAPS</h3>
        <div class="value">{legacy}</div>
    </div>
    <div class="summary-card">
        <h3>Windows LAPS</h3>
        <div class="value">{modern}</div>
        <div class="detail">{modern_pct:.2}% of enabled</div>
    </div>
    <div class="summary-card">
        <h3>Servers</h3>
        <div class="value">{servers}</div>
        <div class="detail">{server_enabled} enabled ({server_pct:.2}%)</div>
    </div>
    <div class="summary-card">
        <h3>Clients</h3>
        <div class="value">{clients}</div>
        <div class="detail">{client_enabled} enabled ({client_pct:.2}%)</div>
    </div>
</div>"#,
        total = summary.total_computers,
        enabled = summary.enabled_count,
        enabled_pct = summary.enabled_percentage,
        not_enabled = summary.not_enabled_count,
        legacy = summary.legacy_count,
        modern = summary.modern_count,
        modern_pct = summary.modern_percentage,
        servers = summary.server_count,
        server_enabled = summary.server_enabled_count,
        server_pct = summary.server_enabled_percentage,
        clients = summary.client_count,
        client_enabled = summary.client_enabled_count,
        client_pct = summary.client_enabled_percentage,
    )
}

fn render_computers_table(computers: &[ComputerStatus]) -> String {
    let rows: String = computers.iter().map(render_row).collect();

    format!(
        r#"<section class="section">
    <h2>Computers (<span id="visible-count">{count}</span> of {count})</h2>

    <div class="filters">
        <div class="filter-group">
            <label for="role-filter">OS Role</label>
            <select id="role-filter">
                <option value="all">All</option>
                <option value="Windows Server">Windows Server</option>
                <option value="Windows Client">Windows Client</option>
            </select>
        </div>
        <div class="filter-group">
            <label for="state-filter">Rotation Status</label>
            <select id="state-filter">
                <option value="all">All</option>
                <option value="Enabled">Enabled</option>
                <option value="Not Enabled">Not Enabled</option>
            </select>
        </div>
        <div class="filter-group">
            <label for="type-filter">Mechanism</label>
            <select id="type-filter">
                <option value="all">All</option>
                <option value="Windows LAPS">Windows LAPS</option>
                <option value="Legacy LAPS">Legacy LAPS</option>
                <option value="None">None</option>
            </select>
        </div>
        <div class="filter-group">
            <label for="account-filter">Account</label>
            <select id="account-filter">
                <option value="all">All</option>
                <option value="Yes">Enabled</option>
                <option value="No">Disabled</option>
            </select>
        </div>
        <div class="filter-group">
            <label for="search-filter">Search</label>
            <input type="text" id="search-filter" placeholder="Computer name...">
        </div>
    </div>

    <table id="computers-table">
        <thead>
            <tr>
                <th class="sortable" data-column="0">Computer Name</th>
                <th class="sortable" data-column="1">OS Role</th>
                <th class="sortable" data-column="2">Operating System</th>
                <th class="sortable" data-column="3">Rotation Status</th>
                <th class="sortable" data-column="4">Mechanism</th>
                <th class="sortable" data-column="5">Account Enabled</th>
                <th class="sortable" data-column="6">Last Logon</th>
                <th class="sortable" data-column="7">Organizational Unit</th>
            </tr>
        </thead>
        <tbody>
            {rows}
        </tbody>
    </table>
</section>"#,
        count = computers.len(),
        rows = rows,
    )
}

fn render_row(computer: &ComputerStatus) -> String {
    let state_class = match computer.rotation_state {
        RotationState::Enabled => "badge-enabled",
        RotationState::NotEnabled => "badge-missing",
    };
    let type_class = match computer.rotation_type {
        RotationType::Modern => "badge-modern",
        RotationType::Legacy => "badge-legacy",
        RotationType::None => "badge-none",
    };
    let account = if computer.account_enabled { "Yes" } else { "No" };

    format!(
        r#"<tr data-name="{name}" data-role="{role}" data-state="{state}" data-type="{rtype}" data-account="{account}">
    <td class="monospace">{name}</td>
    <td>{role}</td>
    <td>{os}</td>
    <td><span class="badge {state_class}">{state}</span></td>
    <td><span class="badge {type_class}">{rtype}</span></td>
    <td>{account}</td>
    <td>{last_logon}</td>
    <td class="monospace">{ou}</td>
</tr>"#,
        name = html_escape(&computer.computer_name),
        role = computer.os_role.as_str(),
        os = html_escape(&computer.operating_system),
        state = computer.rotation_state.as_str(),
        state_class = state_class,
        rtype = computer.rotation_type.as_str(),
        type_class = type_class,
        account = account,
        last_logon = html_escape(&computer.last_logon),
        ou = html_escape(&computer.organizational_unit),
    )
}

fn render_footer(data: &ReportData) -> String {
    format!(
        r#"<footer>
    <p>Generated {timestamp} for domain {domain}</p>
</footer>"#,
        timestamp = data.generation_time.format("%Y-%m-%d %H:%M:%S UTC"),
        domain = html_escape(&data.domain_name),
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.6;
    color: #111827;
    background: #ffffff;
}

.container {
    max-width: 1400px;
    margin: 0 auto;
    padding: 2rem;
}

header {
    margin-bottom: 2rem;
    padding-bottom: 1rem;
    border-bottom: 2px solid #e5e7eb;
}

header h1 {
    font-size: 2rem;
    font-weight: 700;
    margin-bottom: 0.5rem;
}

header .meta {
    color: #6b7280;
    font-size: 0.875rem;
}

.summary {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(170px, 1fr));
    gap: 1rem;
    margin-bottom: 2rem;
}

.summary-card {
    background: #f9fafb;
    padding: 1rem;
    border-radius: 0.5rem;
    border-left: 4px solid #3b82f6;
}

.summary-card.card-enabled {
    border-left-color: #22c55e;
}

.summary-card.card-missing {
    border-left-color: #ef4444;
}

.summary-card h3 {
    font-size: 0.875rem;
    font-weight: 600;
    color: #6b7280;
    margin-bottom: 0.5rem;
}

.summary-card .value {
    font-size: 1.5rem;
    font-weight: 700;
}

.summary-card .detail {
    font-size: 0.75rem;
    color: #6b7280;
}

.section {
    margin-bottom: 2rem;
}

.section h2 {
    font-size: 1.5rem;
    font-weight: 700;
    margin-bottom: 1rem;
}

table {
    width: 100%;
    border-collapse: collapse;
    background: #ffffff;
    border-radius: 0.5rem;
    overflow: hidden;
}

thead {
    background: #f9fafb;
}

th {
    padding: 0.75rem;
    text-align: left;
    font-weight: 600;
    font-size: 0.875rem;
    color: #374151;
    border-bottom: 2px solid #e5e7eb;
}

td {
    padding: 0.75rem;
    border-bottom: 1px solid #e5e7eb;
    font-size: 0.875rem;
}

tr:last-child td {
    border-bottom: none;
}

tbody tr:hover {
    background: #f3f4f6;
}

.badge {
    display: inline-block;
    padding: 0.125rem 0.5rem;
    border-radius: 999px;
    font-size: 0.75rem;
    font-weight: 600;
}

.badge-enabled {
    background: #dcfce7;
    color: #166534;
}

.badge-missing {
    background: #fee2e2;
    color: #991b1b;
}

.badge-modern {
    background: #dbeafe;
    color: #1e40af;
}

.badge-legacy {
    background: #fef3c7;
    color: #92400e;
}

.badge-none {
    background: #f3f4f6;
    color: #6b7280;
}

.monospace {
    font-family: 'Monaco', 'Courier New', monospace;
    font-size: 0.875rem;
}

footer {
    margin-top: 3rem;
    padding-top: 1rem;
    border-top: 1px solid #e5e7eb;
    text-align: center;
    color: #6b7280;
    font-size: 0.875rem;
}

.filters {
    display: flex;
    gap: 1rem;
    margin-bottom: 1rem;
    flex-wrap: wrap;
}

.filter-group {
    display: flex;
    flex-direction: column;
    gap: 0.25rem;
}

.filter-group label {
    font-size: 0.75rem;
    font-weight: 600;
    color: #6b7280;
}

.filter-group select,
.filter-group input {
    padding: 0.5rem;
    border: 1px solid #d1d5db;
    border-radius: 0.375rem;
    font-size: 0.875rem;
}

.filter-group select:focus,
.filter-group input:focus {
    outline: none;
    border-color: #3b82f6;
}

th.sortable {
    cursor: pointer;
    user-select: none;
}

th.sortable:hover {
    background: #e5e7eb;
}

th.sortable::after {
    content: ' ↕';
    opacity: 0.3;
}

th.sortable.asc::after {
    content: ' ↑';
    opacity: 1;
}

th.sortable.desc::after {
    content: ' ↓';
    opacity: 1;
}

@media (max-width: 768px) {
    .container {
        padding: 1rem;
    }

    header h1 {
        font-size: 1.5rem;
    }

    .summary {
        grid-template-columns: 1fr;
    }

    table {
        font-size: 0.75rem;
    }

    th, td {
        padding: 0.5rem;
    }
}

@media (prefers-color-scheme: dark) {
    body {
        background: #111827;
        color: #f9fafb;
    }

    header {
        border-bottom-color: #374151;
    }

    .summary-card {
        background: #1f2937;
    }

    .filter-group label {
        color: #9ca3af;
    }

    .filter-group select,
    .filter-group input {
        background: #1f2937;
        border-color: #374151;
        color: #f9fafb;
    }

    thead {
        background: #1f2937;
    }

    th {
        color: #f9fafb;
        border-bottom-color: #374151;
    }

    th.sortable:hover {
        background: #374151;
    }

    td {
        border-bottom-color: #374151;
    }

    tbody tr:hover {
        background: #1f2937;
    }

    table {
        background: #111827;
    }

    footer {
        border-top-color: #374151;
    }
}
"#
}

/// Inline JavaScript for interactivity
fn inline_javascript() -> &'static str {
    r#"
// Table sorting and filtering
(function() {
    let sortColumn = null;
    let sortDirection = 'asc';

    function cellText(row, column) {
        const cell = row.cells[column];
        return cell ? cell.textContent.trim().toLowerCase() : '';
    }

    function sortTable(column) {
        const tbody = document.querySelector('#computers-table tbody');
        const rows = Array.from(tbody.querySelectorAll('tr'));

        // Toggle direction if same column
        if (sortColumn === column) {
            sortDirection = sortDirection === 'asc' ? 'desc' : 'asc';
        } else {
            sortColumn = column;
            sortDirection = 'asc';
        }

        // Update header indicators
        document.querySelectorAll('th.sortable').forEach(th => {
            th.classList.remove('asc', 'desc');
        });
        const activeHeader = document.querySelector(`th[data-column="${column}"]`);
        if (activeHeader) {
            activeHeader.classList.add(sortDirection);
        }

        // Case-insensitive string comparison on the rendered cell text
        rows.sort((a, b) => {
            const aVal = cellText(a, column);
            const bVal = cellText(b, column);
            const cmp = aVal < bVal ? -1 : aVal > bVal ? 1 : 0;
            return sortDirection === 'asc' ? cmp : -cmp;
        });

        // Re-append rows
        rows.forEach(row => tbody.appendChild(row));
    }

    function filterTable() {
        const roleFilter = document.getElementById('role-filter').value;
        const stateFilter = document.getElementById('state-filter').value;
        const typeFilter = document.getElementById('type-filter').value;
        const accountFilter = document.getElementById('account-filter').value;
        const searchFilter = document.getElementById('search-filter').value.toLowerCase();

        const rows = document.querySelectorAll('#computers-table tbody tr');

        // Independent categorical filters combined with logical AND
        rows.forEach(row => {
            const roleMatch = roleFilter === 'all' || row.dataset.role === roleFilter;
            const stateMatch = stateFilter === 'all' || row.dataset.state === stateFilter;
            const typeMatch = typeFilter === 'all' || row.dataset.type === typeFilter;
            const accountMatch = accountFilter === 'all' || row.dataset.account === accountFilter;
            const searchMatch = !searchFilter ||
                row.dataset.name.toLowerCase().includes(searchFilter);

            row.style.display =
                (roleMatch && stateMatch && typeMatch && accountMatch && searchMatch) ? '' : 'none';
        });

        // Update count
        const visibleCount = Array.from(rows).filter(r => r.style.display !== 'none').length;
        const countEl = document.getElementById('visible-count');
        if (countEl) {
            countEl.textContent = visibleCount;
        }
    }

    document.addEventListener('DOMContentLoaded', function() {
        document.querySelectorAll('th.sortable').forEach(th => {
            th.addEventListener('click', function() {
                sortTable(parseInt(this.dataset.column, 10));
            });
        });

        ['role-filter', 'state-filter', 'type-filter', 'account-filter'].forEach(id => {
            const el = document.getElementById(id);
            if (el) {
                el.addEventListener('change', filterTable);
            }
        });

        const searchFilter = document.getElementById('search-filter');
        if (searchFilter) {
            searchFilter.addEventListener('input', filterTable);
        }
    });
})();
"#
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::models::{OsRole, RotationState, RotationType};

    fn status(name: &str, role: OsRole, rotation_type: RotationType) -> ComputerStatus {
        let rotation_state = if rotation_type == RotationType::None {
            RotationState::NotEnabled
        } else {
            RotationState::Enabled
        };
        ComputerStatus {
            computer_name: name.to_string(),
            os_role: role,
            operating_system: role.as_str().to_string(),
            rotation_state,
            rotation_type,
            account_enabled: true,
            last_logon: "Never".to_string(),
            organizational_unit: "OU=Computers,DC=corp,DC=local".to_string(),
        }
    }

    fn report_data(computers: Vec<ComputerStatus>) -> ReportData {
        ReportData::new(
            computers,
            "corp.local".to_string(),
            "dc01.corp.local".to_string(),
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
        )
    }

    #[test]
    fn rendering_is_deterministic() {
        let data = report_data(vec![
            status("SRV01", OsRole::Server, RotationType::Modern),
            status("WS01", OsRole::Client, RotationType::Legacy),
        ]);
        assert_eq!(render_report(&data), render_report(&data));
    }

    #[test]
    fn client_rows_precede_server_rows() {
        let data = report_data(vec![
            status("SRV01", OsRole::Server, RotationType::Modern),
            status("WS01", OsRole::Client, RotationType::None),
        ]);
        let document = render_report(&data);
        let ws = document.find("data-name=\"WS01\"").unwrap();
        let srv = document.find("data-name=\"SRV01\"").unwrap();
        assert!(ws < srv);
    }

    #[test]
    fn attribute_text_is_escaped() {
        let mut computer = status("WS01", OsRole::Client, RotationType::None);
        computer.operating_system = "Windows <script>alert(1)</script>".to_string();
        let document = render_report(&report_data(vec![computer]));
        assert!(!document.contains("<script>alert(1)</script>"));
        assert!(document.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn summary_cards_show_counts_and_percentages() {
        let data = report_data(vec![
            status("SRV01", OsRole::Server, RotationType::Modern),
            status("SRV02", OsRole::Server, RotationType::None),
            status("WS01", OsRole::Client, RotationType::Legacy),
        ]);
        let document = render_report(&data);
        assert!(document.contains("50.00%"));
        assert!(document.contains("100.00%"));
        assert!(document.contains("Windows LAPS"));
        assert!(document.contains("Legacy LAPS"));
    }

    #[test]
    fn footer_carries_domain_and_timestamp() {
        let document = render_report(&report_data(vec![]));
        assert!(document.contains("Generated 2024-06-01 08:30:00 UTC for domain corp.local"));
    }

    #[test]
    fn rows_carry_filter_attributes() {
        let data = report_data(vec![status("SRV01", OsRole::Server, RotationType::Modern)]);
        let document = render_report(&data);
        assert!(document.contains(r#"data-role="Windows Server""#));
        assert!(document.contains(r#"data-state="Enabled""#));
        assert!(document.contains(r#"data-type="Windows LAPS""#));
        assert!(document.contains(r#"data-account="Yes""#));
    }

    #[test]
    fn escape_handles_all_special_characters() {
        assert_eq!(html_escape(r#"a&<>"'z"#), "a&amp;&lt;&gt;&quot;&#39;z");
    }
}
