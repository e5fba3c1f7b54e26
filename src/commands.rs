use cemt_browser::adapters::FileSource;
use cemt_browser::config::{Command, QueryLimits};
use cemt_browser::core::{lookup, matcher};
use cemt_browser::domain::model::{CategoryRow, Column, Table};
use cemt_browser::domain::ports::TableSource;
use cemt_browser::utils::error::Result;
use cemt_browser::TableSession;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct Context {
    pub image_dir: PathBuf,
    pub limits: QueryLimits,
    pub json: bool,
}

#[derive(Serialize)]
struct IndexedRow<'a> {
    index: usize,
    #[serde(flatten)]
    row: &'a CategoryRow,
}

#[derive(Serialize)]
struct Classification<'a> {
    length: f64,
    width: f64,
    category: Option<&'a CategoryRow>,
}

#[derive(Serialize)]
struct CategoryDetails<'a> {
    category: &'a str,
    rows: Vec<&'a CategoryRow>,
    image: Option<PathBuf>,
}

pub fn run(command: Command, session: &mut TableSession<FileSource>, ctx: &Context) -> Result<()> {
    match command {
        Command::Show => show(session.table(), ctx),
        Command::Categories => {
            let categories = lookup::list_categories(session.table());
            if ctx.json {
                return print_json(&categories);
            }
            if categories.is_empty() {
                println!("(no categories)");
            }
            for id in categories {
                println!("CEMT {}", id);
            }
            Ok(())
        }
        Command::Widths { length } => {
            ctx.limits.check_length(length)?;
            let hints = matcher::width_hints(session.table(), length);
            if ctx.json {
                return print_json(&hints);
            }
            if hints.is_empty() {
                println!("No CEMT class covers a length of {} m", length);
            } else {
                println!("Width ranges for a length of {} m:", length);
                for hint in hints {
                    println!("  {}", hint);
                }
            }
            Ok(())
        }
        Command::Classify { length, width } => {
            ctx.limits.check_length(length)?;
            ctx.limits.check_width(width)?;
            classify(session.table(), length, width, ctx)
        }
        Command::Category { id } => category(session.table(), &id, ctx),
        Command::Add(add) => {
            add.validate()?;
            session.table_mut().push(add.into_row())?;
            session.persist()?;
            println!("✅ Row added ({} rows)", session.table().len());
            Ok(())
        }
        Command::Remove { index } => {
            let removed = session.table_mut().remove(index)?;
            session.persist()?;
            println!(
                "✅ Removed row {} (CEMT {})",
                index,
                removed.category_id().unwrap_or("-")
            );
            Ok(())
        }
        Command::Set {
            index,
            column,
            value,
        } => {
            let column = Column::from_name(&column)?;
            session.table_mut().set_field(index, column, &value)?;
            session.persist()?;
            println!("✅ Row {} {} = {}", index, column, value);
            Ok(())
        }
        Command::SaveAs { path } => {
            let destination = FileSource::from_path(path)?;
            session.persist_to(&destination)?;
            println!("✅ Saved to {}", destination.location().display());
            Ok(())
        }
    }
}

fn show(table: &Table, ctx: &Context) -> Result<()> {
    if ctx.json {
        let rows: Vec<IndexedRow> = table
            .iter()
            .enumerate()
            .map(|(index, row)| IndexedRow { index, row })
            .collect();
        return print_json(&rows);
    }

    let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    println!("# | {}", headers.join(" | "));
    for (index, row) in table.iter().enumerate() {
        let values: Vec<String> = Column::ALL.iter().map(|c| row.display_value(*c)).collect();
        println!("{} | {}", index, values.join(" | "));
    }
    println!("({} rows)", table.len());
    Ok(())
}

fn classify(table: &Table, length: f64, width: f64, ctx: &Context) -> Result<()> {
    let matched = matcher::classify(table, length, width);
    if ctx.json {
        return print_json(&Classification {
            length,
            width,
            category: matched,
        });
    }

    match matched {
        Some(row) => {
            println!("✅ CEMT {}", row.category_id().unwrap_or("-"));
            println!("  Typical route:    {}", row.typical_route);
            println!("  Fleet count:      {}", row.fleet_count);
            println!("  Typical distance: {} km", row.typical_distance_km);
            println!("  Voyage duration:  {} h", row.typical_duration_h);
        }
        None => println!("❌ No CEMT class matches {} m x {} m, adjust the dimensions and retry", length, width),
    }
    Ok(())
}

fn category(table: &Table, id: &str, ctx: &Context) -> Result<()> {
    let rows = lookup::rows_for_category(table, id);
    let image = if rows.is_empty() {
        None
    } else {
        lookup::image_for(id, &ctx.image_dir)
    };

    if ctx.json {
        return print_json(&CategoryDetails {
            category: id,
            rows,
            image,
        });
    }

    if rows.is_empty() {
        println!("❌ No rows for CEMT {}", id);
        return Ok(());
    }

    for row in &rows {
        let values: Vec<String> = Column::ALL
            .iter()
            .map(|c| format!("{}={}", c, row.display_value(*c)))
            .collect();
        println!("{}", values.join(", "));
    }
    match image {
        Some(path) => println!("🛳️ Image: {}", path.display()),
        None => println!("{}", missing_image_notice(id, &ctx.image_dir)),
    }
    Ok(())
}

fn missing_image_notice(id: &str, image_dir: &Path) -> String {
    let expected: Vec<String> = lookup::image_candidates(id, image_dir)
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    format!("⚠️ No image for CEMT {} yet, place {}", id, expected.join(" or "))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
