//! Plain-text rendering of dashboard reports

use super::DashboardReport;
use crate::algorithm::{CrossTab, FrequencyTable, GroupedFrequency, RosterStatistics};

fn show_percentage(percentage: Option<f64>) -> String {
    percentage.map_or_else(|| "-".to_string(), |p| format!("{p:.1}%"))
}

fn push_table(out: &mut String, title: &str, table: &FrequencyTable) {
    out.push_str(&format!("\n{title} (total {}):\n", table.total));
    if table.is_empty() {
        out.push_str("  no data\n");
        return;
    }
    for entry in &table.entries {
        out.push_str(&format!(
            "  {:<32} {:>6} {:>7}\n",
            entry.value,
            entry.count,
            show_percentage(entry.percentage)
        ));
    }
}

fn push_grouped(out: &mut String, title: &str, grouped: &GroupedFrequency) {
    out.push_str(&format!("\n{title}:\n"));
    if grouped.is_empty() {
        out.push_str("  no data\n");
        return;
    }
    for group in &grouped.groups {
        out.push_str(&format!("  {}:\n", group.key));
        for entry in &group.table.entries {
            out.push_str(&format!(
                "    {:<30} {:>6} {:>7}\n",
                entry.value,
                entry.count,
                show_percentage(entry.percentage)
            ));
        }
    }
}

fn push_cross_tab(out: &mut String, table: &CrossTab) {
    out.push_str("\nDistrict summary:\n");
    if table.is_empty() {
        out.push_str("  no data\n");
        return;
    }

    let labels: Vec<String> = itertools::iproduct!(table.classes.iter(), table.genders.iter())
        .map(|(class, gender)| CrossTab::cell_label(class, gender))
        .collect();

    out.push_str(&format!("  {:<20}", "District"));
    for label in &labels {
        out.push_str(&format!(" {label:>18}"));
    }
    out.push_str(&format!(" {:>7}\n", "Total"));

    let total = table.grand_total();
    for row in table.rows.iter().chain(std::iter::once(&total)) {
        out.push_str(&format!("  {:<20}", row.district));
        for cell in &row.cells {
            let value = format!("{} ({:.1}%)", cell.count, cell.percentage);
            out.push_str(&format!(" {value:>18}"));
        }
        out.push_str(&format!(" {:>7}\n", row.total));
    }
}

impl DashboardReport {
    /// Render the report as plain text, one block per section
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = RosterStatistics::generate_summary(&self.kpis);

        let active: Vec<String> = self
            .filters
            .iter()
            .filter(|f| !f.selection.is_all())
            .map(|f| format!("{} = {}", f.field, f.selection))
            .collect();
        if !active.is_empty() {
            out.push_str(&format!("  Filters: {}\n", active.join(", ")));
        }

        if let Some(table) = &self.gender {
            push_table(&mut out, "Gender-wise distribution", table);
        }
        if let Some(grouped) = &self.district_gender {
            push_grouped(&mut out, "District-wise gender distribution", grouped);
        }
        if let Some(table) = &self.class_counts {
            push_table(&mut out, "Class-wise student count", table);
        }
        if let Some(table) = &self.stream {
            push_table(&mut out, "Stream distribution", table);
        }
        if let Some(table) = &self.subjects {
            push_table(&mut out, "Subjects", table);
        }
        if let Some(table) = &self.interests {
            push_table(&mut out, "Career interest distribution", table);
        }
        if let Some(table) = &self.career_paths {
            let title = format!("Top {} suggested career paths", table.len());
            push_table(&mut out, &title, table);
        }
        if let Some(table) = &self.entrance_exams {
            push_table(&mut out, "Entrance examination preferences", table);
        }
        if let Some(summary) = &self.previous_percentage {
            out.push_str(&format!(
                "\nPrevious class percentage: mean {:.1} (min {}, max {}, {} values",
                summary.mean, summary.min, summary.max, summary.count
            ));
            if summary.coerced_absent > 0 {
                out.push_str(&format!(", {} not numeric", summary.coerced_absent));
            }
            out.push_str(")\n");
        }
        if let Some(table) = &self.cross_tab {
            push_cross_tab(&mut out, table);
        }

        if !self.unavailable.is_empty() {
            out.push_str("\nUnavailable sections:\n");
            for reason in &self.unavailable {
                out.push_str(&format!("  {reason}\n"));
            }
        }

        out
    }
}
