use anyhow::{Context, Result};
use fuel_sales_dashboard::config::{DashboardConfig, DEFAULT_CONFIG_PATH};
use fuel_sales_dashboard::loader::load_sales;
use std::env;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let (path, sheet) = match args.get(1) {
        Some(path) => (path.clone(), args.get(2).cloned()),
        None => {
            let config = DashboardConfig::load(DEFAULT_CONFIG_PATH)?;
            (config.data_path, config.sheet)
        }
    };

    println!("=== INSPECTING SALES WORKBOOK ===\n");
    println!("File: {}", path);
    if let Some(sheet) = &sheet {
        println!("Sheet: {}", sheet);
    }

    let ctx = load_sales(&path, sheet.as_deref())
        .with_context(|| format!("Failed to load {}", path))?;

    println!("\n1. Columns: {:?}", ctx.frame().get_column_names());
    println!("   Rows: {}", ctx.len());

    let options = ctx.filter_options();
    println!("\n2. Filter options:");
    match (options.min_date, options.max_date) {
        (Some(min), Some(max)) => println!("   Dates: {} to {}", min, max),
        _ => println!("   Dates: (no rows)"),
    }
    println!("   Regions ({}): {}", options.regions.len(), options.regions.join(", "));
    println!("   Products ({}): {}", options.products.len(), options.products.join(", "));

    println!("\n3. Frame:");
    println!("{}", ctx.frame());

    Ok(())
}
