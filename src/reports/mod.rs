use boardscore::board::{Edit, TotalField};
use boardscore::form::FormSummary;
use boardscore::scorer::{Bucket, DisplayMode, Grade, ScoreAggregator, Sign, UpdateResult};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use strum::IntoEnumIterator;

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Excellent => Color::Green,
        Grade::Good => Color::Cyan,
        Grade::Fair => Color::Yellow,
        Grade::Poor => Color::Red,
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, cols: std::ops::RangeInclusive<usize>) {
    for i in cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_group(agg: &ScoreAggregator, key: &str, label: &str) {
    let title = if label.is_empty() { key } else { label };
    let Some(total) = agg.group_total(key) else {
        return;
    };
    let grade = agg.grade(total.total);

    println!(
        "\n{} [{}]  total {} ({})  critical {}  major {}  minor {}  bonus {}",
        title, key, total.total, grade, total.critical, total.major, total.minor, total.bonus
    );

    if let Some(text) = agg.placeholder(key) {
        println!("  {}", text);
        return;
    }

    let Some(views) = agg.item_views(key) else {
        return;
    };
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Item").add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Max"),
        Cell::new("Points"),
        Cell::new("Bucket"),
    ]);
    right_align(&mut table, 1..=3);

    for v in views {
        let count = match v.count {
            Some(c) => c.to_string(),
            None => "-".to_string(),
        };
        let points = Cell::new(v.points.to_string());
        let points = match v.sign {
            Sign::Negative => points.fg(Color::Red),
            Sign::Positive => points.fg(Color::Green),
            Sign::Neutral => points,
        };
        let mut label = Cell::new(&v.label);
        if !v.affects_score {
            label = label.add_attribute(Attribute::Italic);
        }
        table.add_row(vec![
            label,
            Cell::new(count),
            Cell::new(v.max_count.to_string()),
            points,
            Cell::new(v.bucket.map(|b| b.to_string()).unwrap_or_default()),
        ]);
    }
    println!("{}", table);
}

pub fn print_totals(agg: &ScoreAggregator, fields: &[TotalField]) {
    let mut table = new_table();
    let mut header = vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new("Source"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Grade"),
    ];
    header.extend(Bucket::iter().map(|b| Cell::new(b.to_string())));
    table.add_row(header);
    right_align(&mut table, 2..=7);

    let mut shown = 0;
    for (cfg, summary) in agg.displays() {
        let label = fields
            .iter()
            .find(|f| f.key == cfg.key && !f.label.is_empty())
            .map(|f| f.label.as_str())
            .unwrap_or(cfg.key.as_str());
        let source = match cfg.mode() {
            DisplayMode::Filtered(keys) => format!("only {}", keys.join(", ")),
            DisplayMode::Pooled(pool) => format!("pool {}", pool),
        };
        let grade = agg.grade(summary.total);

        let mut row = vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(source),
            Cell::new(summary.total.to_string()).fg(Color::Cyan),
            Cell::new(grade.to_string()).fg(grade_color(grade)),
        ];
        row.extend(Bucket::iter().map(|b| Cell::new(summary.count(b).to_string())));
        table.add_row(row);
        shown += 1;
    }

    if shown == 0 {
        println!("\n(no total displays)");
    } else {
        println!("\n{}", table);
    }
}

pub fn print_updates(updates: &[(Edit, Option<UpdateResult>)]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Edit").add_attribute(Attribute::Bold),
        Cell::new("Input"),
        Cell::new("Stored"),
        Cell::new("Points"),
    ]);
    right_align(&mut table, 2..=3);

    for (edit, result) in updates {
        let target = format!("{}.{}", edit.group, edit.item);
        match result {
            Some(r) => table.add_row(vec![
                Cell::new(target),
                Cell::new(&edit.value),
                Cell::new(r.count.map(|c| c.to_string()).unwrap_or_else(|| "null".into())),
                Cell::new(r.points.to_string()),
            ]),
            None => table.add_row(vec![
                Cell::new(target).fg(Color::DarkGrey),
                Cell::new(&edit.value),
                Cell::new("ignored").fg(Color::DarkGrey),
                Cell::new(""),
            ]),
        };
    }
    println!("\n{}", table);
}

pub fn print_form_summary(summary: &FormSummary, grade: Grade) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Base"),
        Cell::new("Delta"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Grade"),
        Cell::new("Critical").fg(Color::Red),
        Cell::new("Major"),
        Cell::new("Minor"),
        Cell::new("Bonus pts").fg(Color::Green),
    ]);
    right_align(&mut table, 0..=7);
    table.add_row(vec![
        Cell::new(summary.base_score.to_string()),
        Cell::new(summary.total_delta.to_string()),
        Cell::new(summary.total_score.to_string()).add_attribute(Attribute::Bold),
        Cell::new(grade.to_string()).fg(grade_color(grade)),
        Cell::new(summary.critical_count.to_string()),
        Cell::new(summary.major_count.to_string()),
        Cell::new(summary.minor_count.to_string()),
        Cell::new(summary.bonus_points.to_string()),
    ]);
    println!("\n{}", table);
}
