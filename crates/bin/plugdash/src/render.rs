//! Plain-text rendering of command results.

use std::collections::BTreeMap;

use chrono::FixedOffset;

use plugdash_app::services::DashboardSummary;
use plugdash_domain::analytics::{AnalyticsReport, DataSource, is_peak_hour};
use plugdash_domain::audit::AuditPage;
use plugdash_domain::automation::{AutomationRule, TriggerType};
use plugdash_domain::device::{Device, PowerNotice, Severity};
use plugdash_domain::notification::{self, Notification};

const UNAVAILABLE: &str = "unavailable";

pub fn devices(devices: &[&Device]) -> String {
    if devices.is_empty() {
        return "No devices.".to_string();
    }
    let mut lines = vec![format!(
        "{:<20} {:<20} {:<12} {:<12} {:>9} {:>6}",
        "HARDWARE", "NAME", "ROOM", "POWER", "WATTS", "WIFI"
    )];
    for device in devices {
        lines.push(format!(
            "{:<20} {:<20} {:<12} {:<12} {:>9.1} {:>5}%",
            device.hardware_name.as_str(),
            device.display_name(),
            device.room.as_deref().unwrap_or("-"),
            device.power.to_string(),
            device.last_usage,
            device.wifi_signal,
        ));
    }
    lines.join("\n")
}

/// One name per line, or `empty` when there are none.
pub fn names(names: &[String], empty: &str) -> String {
    if names.is_empty() {
        return empty.to_string();
    }
    names.join("\n")
}

pub fn notice(notice: &PowerNotice) -> String {
    let marker = match notice.severity {
        Severity::Default => "",
        Severity::Destructive => "! ",
    };
    format!("{marker}{}: {}", notice.title, notice.description)
}

pub fn rule(rule: &AutomationRule) -> String {
    let state = if rule.enabled { "active" } else { "paused" };
    format!(
        "#{:<5} {:<8} {:<20} {}",
        rule.id,
        state,
        rule.hardware_name.as_str(),
        rule.describe()
    )
}

pub fn rules(groups: &BTreeMap<TriggerType, Vec<&AutomationRule>>) -> String {
    if groups.is_empty() {
        return "No automation rules.".to_string();
    }
    let mut lines = Vec::new();
    for (trigger_type, rules) in groups {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{} ({})", trigger_type.title(), rules.len()));
        lines.extend(rules.iter().map(|r| format!("  {}", rule(r))));
    }
    lines.join("\n")
}

pub fn audit(page: &AuditPage<'_>) -> String {
    if page.total_items == 0 {
        return "No audit entries.".to_string();
    }
    let mut lines: Vec<String> = page
        .items
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<16} {:<14} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.device,
                entry.action_type,
                if entry.details.is_empty() {
                    &entry.log
                } else {
                    &entry.details
                },
            )
        })
        .collect();
    lines.push(format!(
        "Showing {}-{} of {} (page {}/{})",
        page.start_index + 1,
        page.end_index,
        page.total_items,
        page.page,
        page.total_pages
    ));
    lines.join("\n")
}

pub fn notifications(list: &[Notification]) -> String {
    if list.is_empty() {
        return "No notifications.".to_string();
    }
    let mut lines = vec![format!("{} unread", notification::unread_count(list))];
    for item in list {
        lines.push(format!(
            "{} {}  {}",
            if item.read { " " } else { "*" },
            item.timestamp.format("%Y-%m-%d %H:%M"),
            item.message
        ));
    }
    lines.join("\n")
}

pub fn analytics(report: &AnalyticsReport, offset: FixedOffset) -> String {
    let mut lines = Vec::new();
    if report.source == DataSource::Synthetic {
        lines.push("Note: no readings available, showing simulated data.".to_string());
    }
    lines.push(format!(
        "{:<17} {:>9} {:>9} {:>8} {:>10}",
        "HOUR", "WATTS", "gCO2/kWh", "PENCE", "SUGGESTED"
    ));
    for row in &report.rows {
        let peak = if is_peak_hour(row.timestamp, offset) {
            " peak"
        } else {
            ""
        };
        lines.push(format!(
            "{:<17} {:>9.1} {:>9.0} {:>8.2} {:>10.1}{peak}",
            row.timestamp.with_timezone(&offset).format("%Y-%m-%d %H:00"),
            row.usage,
            row.carbon_intensity,
            row.energy_price,
            row.suggested_usage,
        ));
    }
    lines.push(format!("Total usage:        {:.1} W", report.total_usage()));
    lines.push(format!(
        "Potential saving:   {:.1} W",
        report.potential_saving()
    ));
    lines.push(match report.average_carbon_intensity() {
        Some(avg) => format!("Average intensity:  {avg:.0} gCO2/kWh"),
        None => format!("Average intensity:  {UNAVAILABLE}"),
    });
    lines.join("\n")
}

pub fn dashboard(summary: &DashboardSummary) -> String {
    let devices = summary
        .device_count
        .map_or_else(|| UNAVAILABLE.to_string(), |count| count.to_string());
    let usage = summary
        .current_usage
        .map_or_else(|| UNAVAILABLE.to_string(), |watts| format!("{watts:.1} W"));
    let carbon = summary.carbon.as_ref().map_or_else(
        || UNAVAILABLE.to_string(),
        |carbon| format!("{:.0} gCO2/kWh ({})", carbon.value(), carbon.intensity.index),
    );
    let weekly = summary.weekly.as_ref().map_or_else(
        || UNAVAILABLE.to_string(),
        |weeks| {
            weeks
                .iter()
                .map(|week| format!("{} {:.1}", week.date, week.total))
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    let monthly = summary.monthly.as_ref().map_or_else(
        || UNAVAILABLE.to_string(),
        |bars| {
            let total: f64 = bars.iter().map(|bar| bar.total()).sum();
            format!("{total:.1} over {} days", bars.len())
        },
    );

    [
        format!("Devices:         {devices}"),
        format!("Current usage:   {usage}"),
        format!("Carbon now:      {carbon}"),
        format!("Weekly totals:   {weekly}"),
        format!("This month:      {monthly}"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone, Utc};
    use plugdash_domain::analytics::AnalyticsRow;
    use plugdash_domain::automation::RuleAction;
    use plugdash_domain::id::{HardwareName, RuleId};

    fn hw(raw: &str) -> HardwareName {
        HardwareName::new(raw).unwrap()
    }

    #[test]
    fn should_mark_destructive_notice() {
        let mut device = Device::new(hw("plug_1"));
        device.friendly_name = Some("Kettle".to_string());
        device.power = plugdash_domain::device::PowerState::On;
        let off = device.toggle_power();
        assert_eq!(notice(&off), "! Device Powered Off: Kettle has been turned off.");
        let on = device.toggle_power();
        assert_eq!(notice(&on), "Device Powered On: Kettle has been turned on.");
    }

    #[test]
    fn should_group_rules_under_titles() {
        let rule = AutomationRule {
            id: RuleId::new(4),
            hardware_name: hw("plug_1"),
            action: RuleAction::PowerOn,
            trigger_type: TriggerType::Price,
            value: "LT,20".to_string(),
            enabled: true,
        };
        let rules_list = [rule];
        let out = rules(&plugdash_domain::automation::group_by_trigger(&rules_list));
        assert!(out.starts_with("Energy Price Rules (1)"));
        assert!(out.contains("Turn On when Less Than 20p"));
    }

    #[test]
    fn should_flag_synthetic_report_and_peak_rows() {
        let report = AnalyticsReport {
            rows: vec![AnalyticsRow {
                timestamp: Utc.with_ymd_and_hms(2024, 12, 1, 17, 0, 0).unwrap(),
                usage: 100.0,
                carbon_intensity: 150.0,
                energy_price: 27.5,
                suggested_usage: 70.0,
            }],
            source: DataSource::Synthetic,
        };
        let out = analytics(&report, Utc.fix());
        assert!(out.starts_with("Note: no readings available"));
        assert!(out.contains("2024-12-01 17:00"));
        assert!(out.contains(" peak"));
        assert!(out.contains("Potential saving:   30.0 W"));
    }

    #[test]
    fn should_list_names_or_empty_message() {
        assert_eq!(names(&[], "No rooms."), "No rooms.");
        let rooms = ["Kitchen".to_string(), "Office".to_string()];
        assert_eq!(names(&rooms, "No rooms."), "Kitchen\nOffice");
    }

    #[test]
    fn should_show_unavailable_cards() {
        let summary = DashboardSummary {
            device_count: Some(3),
            ..DashboardSummary::default()
        };
        let out = dashboard(&summary);
        assert!(out.contains("Devices:         3"));
        assert!(out.contains("Carbon now:      unavailable"));
    }
}
