//! Terminal tables for command results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use dplace_validate::{CheckReport, Issue, Severity};

use crate::commands::ls::DatasetSummary;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn dataset_table(datasets: &[DatasetSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("id"),
        header_cell("name"),
        header_cell("type"),
        header_cell("variables"),
        header_cell("societies"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for dataset in datasets {
        table.add_row(vec![
            Cell::new(&dataset.id),
            Cell::new(&dataset.name),
            Cell::new(dataset.kind),
            Cell::new(dataset.variables),
            Cell::new(dataset.societies),
        ]);
    }
    table
}

fn severity_cell(severity: Severity) -> Cell {
    let color = match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };
    Cell::new(severity.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn issue_row(issue: &Issue) -> Vec<Cell> {
    vec![
        severity_cell(issue.severity()),
        Cell::new(issue.rule_id()).fg(Color::DarkGrey),
        Cell::new(issue),
    ]
}

/// Warnings first, then errors.
pub fn issue_table(report: &CheckReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Rule"),
        header_cell("Issue"),
    ]);
    apply_table_style(&mut table);
    for issue in report.warnings().chain(report.errors()) {
        table.add_row(issue_row(issue));
    }
    table
}
