mod bootstrap;

use anyhow::{bail, Result};
use dash_core::formatting::{format_count, format_currency, format_percent};
use dash_core::models::SalesTable;
use dash_core::settings::Settings;
use dash_data::aggregator::SalesAggregator;
use dash_data::dashboard::{build_dashboard, DashboardData};
use dash_data::export::export_csv;
use dash_data::rfm::compute_rfm;
use dash_runtime::data_manager::DatasetManager;
use dash_runtime::filters::FilterState;

/// Customers listed in the customers view.
const CUSTOMER_ROWS: usize = 20;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("superstore-dash v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, top-n: {}", settings.view, settings.top_n);

    let Some(data_path) = settings.data.clone().or_else(bootstrap::discover_data_file) else {
        bail!("no sales CSV found; pass --data <path> or place data/superstore.csv");
    };

    let mut manager = DatasetManager::new(&data_path);
    let Some(snapshot) = manager.ensure_loaded() else {
        bail!(
            "failed to load {}: {}",
            data_path.display(),
            manager.last_error().unwrap_or("unknown error")
        );
    };

    let filter = FilterState::new(settings.regions.clone(), settings.categories.clone());
    let filtered = filter.apply(&snapshot);
    tracing::info!(
        rows = filtered.len(),
        loaded = snapshot.len(),
        "filter applied"
    );

    match settings.view.as_str() {
        "overview" => {
            let data = build_dashboard(
                &filtered,
                settings.top_n as usize,
                settings.reference_date,
            );
            print_overview(&data);
        }
        "regions" => print_regions(&filtered),
        "customers" => print_customers(&filtered, settings.reference_date),
        "products" => print_products(&filtered, settings.top_n as usize),
        "export" => {
            export_csv(&filtered, &settings.output)?;
            println!(
                "Exported {} rows to {}",
                format_count(filtered.len() as u64),
                settings.output.display()
            );
        }
        unknown => bail!("unknown view mode: {unknown}"),
    }

    Ok(())
}

// ── Views ─────────────────────────────────────────────────────────────────────

fn print_overview(data: &DashboardData) {
    println!("Overview ({} rows)", format_count(data.overview.row_count as u64));
    println!("  Total sales    {}", format_currency(data.overview.total_sales));
    let margin = if data.overview.total_sales != 0.0 {
        data.overview.total_profit / data.overview.total_sales
    } else {
        0.0
    };
    println!(
        "  Total profit   {} ({} margin)",
        format_currency(data.overview.total_profit),
        format_percent(margin)
    );
    println!("  Orders         {}", format_count(data.overview.order_count as u64));
    println!("  Customers      {}", format_count(data.overview.customer_count as u64));

    if !data.regions.is_empty() {
        println!("\nSales by region");
        for region in &data.regions {
            println!("  {:<20} {:>14}", region.region, format_currency(region.total_sales));
        }
    }

    if !data.categories.is_empty() {
        println!("\nSales by category");
        for category in &data.categories {
            println!(
                "  {:<20} {:>14}",
                category.category,
                format_currency(category.total_sales)
            );
        }
    }

    match &data.monthly {
        Some(months) => {
            println!("\nMonthly trend");
            for month in months {
                println!(
                    "  {:<10} {:>14}",
                    month.month.format("%b %Y"),
                    format_currency(month.total_sales)
                );
            }
        }
        None => println!("\nMonthly trend unavailable (no Order Date column)"),
    }
}

fn print_regions(table: &SalesTable) {
    let regions = SalesAggregator::sales_by_region(table);
    if regions.is_empty() {
        println!("No Region column in this dataset");
    } else {
        println!("Sales by region");
        for region in &regions {
            println!("  {:<20} {:>14}", region.region, format_currency(region.total_sales));
        }
    }

    let states = SalesAggregator::sales_by_state(table);
    if !states.is_empty() {
        println!("\nSales by state");
        for state in &states {
            println!(
                "  {:<4} {:>14}",
                state.state_abbrev,
                format_currency(state.total_sales)
            );
        }
    }
}

fn print_customers(table: &SalesTable, reference_date: Option<chrono::NaiveDate>) {
    let mut records = compute_rfm(table, reference_date);
    if records.is_empty() {
        println!("No customers in the filtered dataset");
        return;
    }

    // Biggest spenders first, like the dashboard's customer page.
    records.sort_by(|a, b| {
        b.monetary
            .partial_cmp(&a.monetary)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!(
        "{:<14} {:>8} {:>6} {:>14}  {}",
        "Customer", "Recency", "Freq", "Monetary", "RFM"
    );
    for record in records.iter().take(CUSTOMER_ROWS) {
        let recency = record
            .recency_days
            .map(|days| days.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:>8} {:>6} {:>14}  {}",
            record.customer_id,
            recency,
            record.frequency,
            format_currency(record.monetary),
            record.rfm_score
        );
    }
}

fn print_products(table: &SalesTable, top_n: usize) {
    let products = SalesAggregator::top_n_products(table, top_n);
    if products.is_empty() {
        println!("No product columns in this dataset");
        return;
    }

    println!("Top {} products", products.len());
    for product in &products {
        println!(
            "  {:<16} {:<40} {:>14}",
            product.product_id,
            product.product_name,
            format_currency(product.total_sales)
        );
    }
}
