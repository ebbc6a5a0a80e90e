use anyhow::{Context, Result};
use cbsodata::{Client, Query, catalog, export};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let table_id = std::env::args().nth(1).unwrap_or_else(|| "82070ENG".to_string());
    let client = Client::from_env()?.with_progress(true);

    let info = client.get_info(&table_id, &Query::new())?;
    println!("{}: {}", table_id, info["Title"]);

    // Keep the raw sub-resources next to the resolved rows.
    let rows = client
        .get_data(&table_id, &Query::new().typed(true).dir(&table_id))
        .with_context(|| format!("failed to download table {}", table_id))?;
    export::write_json_lines(&rows, &Path::new(&table_id).join("data.jsonl"))?;
    println!("{} row(s) written to {}/", rows.len(), table_id);

    // Third-party catalog, only for this block.
    let _scope = catalog::scoped("dataderden.cbs.nl");
    let tables = client.get_table_list(&Query::new())?;
    println!("dataderden.cbs.nl lists {} table(s)", tables.len());
    Ok(())
}
