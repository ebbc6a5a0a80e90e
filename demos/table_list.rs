use anyhow::Result;
use cbsodata::{Client, Query};

fn main() -> Result<()> {
    // RUST_LOG=info shows every downloaded URL.
    env_logger::init();

    let client = Client::from_env()?.with_progress(true);

    let query = Query::new()
        .select(["Identifier", "ShortTitle", "Modified"])
        .filter("Language eq 'en'");
    let tables = client.get_table_list(&query)?;

    println!("{} English tables", tables.len());
    for table in tables.iter().take(10) {
        println!(
            "{:<10} {:<25} {}",
            table["Identifier"], table["Modified"], table["ShortTitle"]
        );
    }
    Ok(())
}
