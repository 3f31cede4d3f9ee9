use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Input: {}", result.folder.display());
    println!("Output: {}", result.output.display());

    let mut files = Table::new();
    files.set_header(vec![
        header_cell("Dataset"),
        header_cell("File"),
        header_cell("Records"),
    ]);
    apply_summary_table_style(&mut files);
    align_column(&mut files, 2, CellAlignment::Right);
    for file in &result.files {
        let name = file
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.add_row(vec![
            Cell::new(file.kind)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(name),
            Cell::new(file.records),
        ]);
    }
    println!("{files}");

    let summary = &result.summary;
    let mut stages = Table::new();
    stages.set_header(vec![header_cell("Highest stage"), header_cell("Stays")]);
    apply_summary_table_style(&mut stages);
    align_column(&mut stages, 1, CellAlignment::Right);
    for stage in 0..=3 {
        stages.add_row(vec![
            stage_cell(stage),
            count_cell(summary.stays_at_stage(stage), stage_color(stage)),
        ]);
    }
    stages.add_row(vec![
        dim_cell("not staged"),
        count_cell(summary.stays_without_stage(), Color::DarkGrey),
    ]);
    stages.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.stay_count()).add_attribute(Attribute::Bold),
    ]);
    println!("{stages}");
    println!(
        "{} of {} stays reached AKI ({} hourly rows)",
        summary.aki_count(),
        summary.stay_count(),
        summary.row_count
    );
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stage_color(stage: i64) -> Color {
    match stage {
        0 => Color::Green,
        1 => Color::Yellow,
        2 => Color::DarkYellow,
        _ => Color::Red,
    }
}

fn stage_cell(stage: i64) -> Cell {
    Cell::new(stage)
        .fg(stage_color(stage))
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
