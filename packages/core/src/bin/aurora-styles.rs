//! Style store maintenance tool
//!
//! Inspects and maintains the custom style database used by the quote tool.
//!
//! # Usage
//!
//! ```bash
//! aurora-styles <db-path> list
//! aurora-styles <db-path> export > styles.json
//! aurora-styles <db-path> import styles.json
//! aurora-styles <db-path> render modern "Quoted text" ["Author"] ["Source"]
//! aurora-styles <db-path> css modern
//! aurora-styles <db-path> trash
//! aurora-styles <db-path> purge
//! ```
//!
//! Log output goes to stderr and honours `RUST_LOG` (default `info`).

use aurora_core::content::{to_html, to_stylesheet};
use aurora_core::logging::init_tracing;
use aurora_core::{AuroraConfig, ContentData, StyleService};
use std::path::PathBuf;

const USAGE: &str = "usage: aurora-styles <db-path> <list|export|import FILE|render STYLE_ID TEXT [AUTHOR] [SOURCE]|css STYLE_ID|trash|purge>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, command, rest) = match args.as_slice() {
        [db_path, command, rest @ ..] => (db_path, command.as_str(), rest),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = AuroraConfig {
        database_path: Some(PathBuf::from(db_path)),
        ..AuroraConfig::from_env()
    };
    let service = StyleService::open(config).await?;

    match (command, rest) {
        ("list", []) => {
            for style in service.all_styles() {
                let kind = if style.is_custom { "custom" } else { "preset" };
                println!("{:<38} {:<7} {}", style.id, kind, style.name);
            }
        }
        ("export", []) => {
            println!("{}", service.export_json().await?);
        }
        ("import", [file]) => {
            let raw = tokio::fs::read_to_string(file).await?;
            let report = service.import_json(&raw).await?;
            println!("Imported {} style(s)", report.imported_count);
            for error in &report.errors {
                eprintln!("  skipped: {}", error);
            }
        }
        ("render", [style_id, text, attribution @ ..]) if attribution.len() <= 2 => {
            let mut data = ContentData::new(text.as_str()).with_style(style_id.as_str());
            if let Some(author) = attribution.first() {
                data = data.with_author(author.as_str());
            }
            if let Some(source) = attribution.get(1) {
                data = data.with_source(source.as_str());
            }
            data.validate()?;
            let style = service.resolve_style(&data.style_id).await?;
            println!("{}", to_html(&data, &style)?);
        }
        ("css", [style_id]) => match service.get_by_id(style_id).await? {
            Some(style) => print!("{}", to_stylesheet(&style)),
            None => anyhow::bail!("No style with id '{}'", style_id),
        },
        ("trash", []) => {
            let deleted = service.list_deleted().await?;
            if deleted.is_empty() {
                println!("Trash is empty");
            }
            for record in deleted {
                let state = if record.needs_sync() { "pending sync" } else { "synced" };
                println!(
                    "{:<38} {} (deleted {}, {})",
                    record.id(),
                    record.definition.name,
                    record.updated_at.to_rfc3339(),
                    state
                );
            }
        }
        ("purge", []) => {
            let purged = service.purge_deleted().await?;
            println!("Purged {} deleted style(s)", purged);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
