use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pns_model::SurveyModule;
use pns_transform::{Derivation, SummaryStat};

use crate::types::{ExtractSummary, LayoutRow, RunSummary};

pub fn print_run_summary(summary: &RunSummary) {
    println!("Survey: {}", summary.survey);
    println!("Output: {}", summary.output.table.path.display());
    if let Some(inventory) = &summary.output.inventory {
        println!("Inventory: {}", inventory.path.display());
    }
    if !summary.segments.is_empty() {
        println!("Segments: {}", summary.segments.len());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Records"),
        header_cell("Columns"),
        header_cell("Notes"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    let transform = &summary.transform;
    table.add_row(vec![
        stage_cell("extract"),
        Cell::new(summary.extracted_records),
        Cell::new(summary.extracted_columns),
        note_cell(missing_note(&summary.missing_codes)),
    ]);
    table.add_row(vec![
        stage_cell("coerce"),
        dim_cell("-"),
        Cell::new(transform.coercion.converted_columns),
        count_note(transform.coercion.total_failures(), "unparseable values"),
    ]);
    table.add_row(vec![
        stage_cell("filter"),
        Cell::new(transform.population.after),
        dim_cell("-"),
        note_cell(format!("{} removed", transform.population.removed())),
    ]);
    table.add_row(vec![
        stage_cell("recode"),
        dim_cell("-"),
        Cell::new(transform.recode.columns),
        note_cell(format!("{} values replaced", transform.recode.replaced)),
    ]);
    table.add_row(vec![
        stage_cell("derive"),
        dim_cell("-"),
        Cell::new(derived_column_count(summary)),
        count_note(transform.derivations.skipped_count(), "steps skipped"),
    ]);
    table.add_row(vec![
        stage_cell("impute"),
        dim_cell("-"),
        Cell::new(transform.imputation.filled.len()),
        note_cell(format!("{} values filled", transform.imputation.total())),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.final_records).add_attribute(Attribute::Bold),
        Cell::new(summary.final_columns).add_attribute(Attribute::Bold),
        note_cell(format!("{} ms", summary.duration_ms)),
    ]);
    println!("{table}");

    print_skipped_derivations(summary);
    print_statistics(summary);
}

fn print_skipped_derivations(summary: &RunSummary) {
    let skipped: Vec<(&str, &Vec<String>)> = summary
        .transform
        .derivations
        .steps
        .iter()
        .filter_map(|step| match &step.outcome {
            Derivation::Skipped { missing } => Some((step.name, missing)),
            Derivation::Applied { .. } => None,
        })
        .collect();
    if skipped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Skipped step"), header_cell("Missing columns")]);
    apply_table_style(&mut table);
    for (name, missing) in skipped {
        table.add_row(vec![
            Cell::new(name).fg(Color::Yellow),
            Cell::new(missing.join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_statistics(summary: &RunSummary) {
    if summary.statistics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Column"),
        header_cell("Mean / Mode"),
        header_cell("Median / Count"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for variable in &summary.statistics {
        let (first, second) = match &variable.stat {
            SummaryStat::Numeric { mean, median } => {
                (Cell::new(format!("{mean:.2}")), Cell::new(format!("{median:.2}")))
            }
            SummaryStat::Categorical { mode, count } => (Cell::new(mode), Cell::new(count)),
            SummaryStat::Unavailable => (dim_cell("-"), dim_cell("-")),
        };
        table.add_row(vec![
            Cell::new(&variable.label),
            dim_cell(&variable.column),
            first,
            second,
        ]);
    }
    println!("{table}");
}

pub fn print_extract_summary(summary: &ExtractSummary) {
    println!("Input: {}", summary.input.display());
    println!("Segments: {}", summary.out_dir.display());
    if !summary.modules.is_empty() {
        println!("Modules: {}", summary.modules.join(", "));
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Segment"), header_cell("Bytes")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut total_bytes = 0u64;
    for segment in &summary.segments {
        total_bytes += segment.bytes;
        let name = segment
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![Cell::new(name), Cell::new(segment.bytes)]);
    }
    table.add_row(vec![
        Cell::new(format!(
            "TOTAL ({} records, {} columns)",
            summary.record_count, summary.column_count
        ))
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold),
        Cell::new(total_bytes).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_layout(rows: &[LayoutRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Column"),
        header_cell("Start"),
        header_cell("End"),
        header_cell("Length"),
    ]);
    apply_table_style(&mut table);
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut missing = 0usize;
    for row in rows {
        match &row.field {
            Some(field) => table.add_row(vec![
                Cell::new(&row.code).fg(Color::Blue),
                Cell::new(&row.name),
                Cell::new(field.start),
                Cell::new(field.end()),
                Cell::new(field.length),
            ]),
            None => {
                missing += 1;
                table.add_row(vec![
                    Cell::new(&row.code).fg(Color::Red),
                    Cell::new(&row.name),
                    dim_cell("missing"),
                    dim_cell("-"),
                    dim_cell("-"),
                ])
            }
        };
    }
    println!("{table}");
    if missing > 0 {
        eprintln!("{missing} desired codes are not in the layout");
    }
}

pub fn print_modules() {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Module"), header_cell("Description")]);
    apply_table_style(&mut table);
    for module in SurveyModule::ALL {
        let description = module.description();
        table.add_row(vec![
            Cell::new(module.prefix())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            if description.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(description)
            },
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn derived_column_count(summary: &RunSummary) -> usize {
    summary
        .transform
        .derivations
        .steps
        .iter()
        .filter_map(|step| match &step.outcome {
            Derivation::Applied { columns, .. } => Some(columns.len()),
            Derivation::Skipped { .. } => None,
        })
        .sum()
}

fn missing_note(codes: &[String]) -> String {
    match codes.len() {
        0 => "-".to_string(),
        1..=4 => format!("missing: {}", codes.join(", ")),
        n => format!("{n} codes missing from layout"),
    }
}

fn count_note(count: usize, what: &str) -> Cell {
    if count == 0 {
        dim_cell("-")
    } else {
        Cell::new(format!("{count} {what}")).fg(Color::Yellow)
    }
}

fn note_cell(note: String) -> Cell {
    if note == "-" {
        dim_cell(note)
    } else {
        Cell::new(note)
    }
}

fn stage_cell(stage: &str) -> Cell {
    Cell::new(stage)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
