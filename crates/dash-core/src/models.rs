use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Column ────────────────────────────────────────────────────────────────────

/// The superstore columns the pipeline knows how to type.
///
/// Every column is optional from the core's perspective: a file missing a
/// column simply produces a table whose [`ColumnSet`] does not contain it,
/// and downstream consumers match on presence instead of probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    OrderId,
    OrderDate,
    ShipDate,
    CustomerId,
    Segment,
    Region,
    State,
    City,
    Category,
    SubCategory,
    ProductId,
    ProductName,
    Sales,
    Quantity,
    Profit,
}

impl Column {
    /// All known columns, in the dataset's conventional order.
    pub const ALL: [Column; 15] = [
        Column::OrderId,
        Column::OrderDate,
        Column::ShipDate,
        Column::CustomerId,
        Column::Segment,
        Column::Region,
        Column::State,
        Column::City,
        Column::Category,
        Column::SubCategory,
        Column::ProductId,
        Column::ProductName,
        Column::Sales,
        Column::Quantity,
        Column::Profit,
    ];

    /// The exact header string used in the source file and on export.
    pub fn header(self) -> &'static str {
        match self {
            Column::OrderId => "Order ID",
            Column::OrderDate => "Order Date",
            Column::ShipDate => "Ship Date",
            Column::CustomerId => "Customer ID",
            Column::Segment => "Segment",
            Column::Region => "Region",
            Column::State => "State",
            Column::City => "City",
            Column::Category => "Category",
            Column::SubCategory => "Sub-Category",
            Column::ProductId => "Product ID",
            Column::ProductName => "Product Name",
            Column::Sales => "Sales",
            Column::Quantity => "Quantity",
            Column::Profit => "Profit",
        }
    }

    /// Resolve a header cell to a known column. Surrounding whitespace is
    /// ignored; unknown headers yield `None`.
    pub fn from_header(name: &str) -> Option<Column> {
        let name = name.trim();
        Column::ALL.iter().copied().find(|c| c.header() == name)
    }
}

// ── ColumnSet ─────────────────────────────────────────────────────────────────

/// The set of known columns present in a loaded file.
///
/// Presence is decided once, from the header row. The original header order
/// is retained so that an exported file lists columns the way the source
/// file did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSet {
    order: Vec<Column>,
}

impl ColumnSet {
    /// Build a set from header cells. Unknown headers are skipped; a column
    /// appearing twice keeps its first position.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut order = Vec::new();
        for header in headers {
            if let Some(column) = Column::from_header(header) {
                if !order.contains(&column) {
                    order.push(column);
                }
            }
        }
        Self { order }
    }

    /// Build a set from an explicit column list (test/construction helper).
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut order = Vec::new();
        for column in columns {
            if !order.contains(&column) {
                order.push(column);
            }
        }
        Self { order }
    }

    /// Whether `column` was present in the source file.
    pub fn contains(&self, column: Column) -> bool {
        self.order.contains(&column)
    }

    /// Present columns in original header order.
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.order.iter().copied()
    }

    /// Number of recognized columns.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when no known column was recognized.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ── SalesRecord ───────────────────────────────────────────────────────────────

/// One cleaned row of the canonical table.
///
/// A field is `None` exactly when its column is absent from the file, with
/// two exceptions: `order_date` / `ship_date` are also `None` for cells
/// that failed to parse (the missing-date marker). When the `Sales`,
/// `Profit` or `Quantity` column is present, every cell carries a finite
/// value; the cleaner defaults malformed cells to `0.0` / `0.0` / `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
    pub customer_id: Option<String>,
    pub segment: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub sales: Option<f64>,
    pub quantity: Option<i64>,
    pub profit: Option<f64>,
}

impl SalesRecord {
    /// Sales amount with the documented default for an absent column.
    pub fn sales_or_zero(&self) -> f64 {
        self.sales.unwrap_or(0.0)
    }

    /// Profit amount with the documented default for an absent column.
    pub fn profit_or_zero(&self) -> f64 {
        self.profit.unwrap_or(0.0)
    }
}

// ── SalesTable ────────────────────────────────────────────────────────────────

/// The canonical, cleaned snapshot of the dataset.
///
/// Produced once per load and treated as immutable; every aggregation takes
/// a read-only view and returns freshly allocated output. Row identity is
/// positional and no deduplication is performed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesTable {
    /// Columns recognized in the source file, in header order.
    pub columns: ColumnSet,
    /// Cleaned rows, in file order.
    pub rows: Vec<SalesRecord>,
}

impl SalesTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `column` was present in the source file.
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(column)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
