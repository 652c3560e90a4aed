//! # Export
//!
//! Serializes the sales ledger for people outside the till: a delimited
//! text file for spreadsheets and a PDF report for printing.
//!
//! ```text
//! Ledger ──┬──► to_delimited_text(sales, tz, code) ──► sales_report_2024-03-10.csv
//!          │
//!          └──► build_report(sales, title, now) ──► SalesReport
//!                                                      │
//!                                                      └─► layout(symbol) ──► ReportLayout
//!                                                                │
//!                                              (console) ──► sales_report_2024-03-10.pdf
//! ```
//!
//! Both fail with [`CoreError::NothingToExport`] on an empty ledger so no
//! empty artifact is ever written. Everything here happens in memory; the
//! page layout is plain data and drawing it is the caller's job.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Sale;

// =============================================================================
// Delimited Text
// =============================================================================

/// Header row of the delimited export.
///
/// The amount columns carry the currency code, `Total Amount (LKR)`, unless
/// the code is blank.
pub fn csv_header(currency_code: &str) -> [String; 6] {
    let code = currency_code.trim();
    let amount = |label: &str| {
        if code.is_empty() {
            label.to_string()
        } else {
            format!("{label} ({code})")
        }
    };
    [
        "Date".to_string(),
        "Time".to_string(),
        "Order ID".to_string(),
        "Items Count".to_string(),
        amount("Total Amount"),
        amount("Profit"),
    ]
}

/// Writes the ledger as CSV, one row per sale, dates and times local to `tz`.
pub fn to_delimited_text<Tz>(sales: &[Sale], tz: &Tz, currency_code: &str) -> CoreResult<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if sales.is_empty() {
        return Err(CoreError::NothingToExport);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(csv_header(currency_code))
        .map_err(export_error)?;

    for sale in sales {
        let local = sale.created_at.with_timezone(tz);
        writer
            .write_record([
                local.format("%Y-%m-%d").to_string(),
                local.format("%H:%M:%S").to_string(),
                sale.id.clone(),
                sale.line_count().to_string(),
                sale.total().to_string(),
                sale.profit().to_string(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Export(e.to_string()))
}

fn export_error(err: csv::Error) -> CoreError {
    CoreError::Export(err.to_string())
}

// =============================================================================
// Sales Report
// =============================================================================

/// One table row of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// `YYYY-MM-DD HH:MM:SS`, local.
    pub date_time: String,
    /// `#<sale id>`.
    pub order: String,
    pub items: usize,
    pub total_cents: i64,
    pub profit_cents: i64,
}

/// The sales report: title, timestamp, one row per sale and the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub title: String,
    /// `YYYY-MM-DD HH:MM:SS`, local.
    pub generated_on: String,
    pub rows: Vec<ReportRow>,
    pub total_sales_cents: i64,
    pub total_profit_cents: i64,
}

/// Builds the report, one row per sale in ledger order.
pub fn build_report<Tz>(
    sales: &[Sale],
    title: &str,
    generated_at: &DateTime<Tz>,
) -> CoreResult<SalesReport>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if sales.is_empty() {
        return Err(CoreError::NothingToExport);
    }

    let tz = generated_at.timezone();
    let rows = sales
        .iter()
        .map(|sale| ReportRow {
            date_time: sale
                .created_at
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            order: format!("#{}", sale.id),
            items: sale.line_count(),
            total_cents: sale.total_cents,
            profit_cents: sale.profit_cents,
        })
        .collect();

    let total_sales =
        Money::checked_sum(sales.iter().map(Sale::total)).ok_or(CoreError::AmountOverflow)?;
    let total_profit =
        Money::checked_sum(sales.iter().map(Sale::profit)).ok_or(CoreError::AmountOverflow)?;

    Ok(SalesReport {
        title: title.to_string(),
        generated_on: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        rows,
        total_sales_cents: total_sales.cents(),
        total_profit_cents: total_profit.cents(),
    })
}

// =============================================================================
// Page Layout
// =============================================================================

/// A4 portrait, in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const LEFT_MM: f32 = 14.0;
const TITLE_Y_MM: f32 = 22.0;
const GENERATED_Y_MM: f32 = 30.0;
const TABLE_TOP_MM: f32 = 40.0;
const CONTINUED_TOP_MM: f32 = 20.0;
const ROW_HEIGHT_MM: f32 = 7.0;
/// Lowest baseline a table row may use before breaking the page.
const BOTTOM_MM: f32 = 277.0;

/// Left edge of each table column: Date, Order ID, Items, Total, Profit.
const COLUMNS_MM: [f32; 5] = [LEFT_MM, 58.0, 122.0, 136.0, 168.0];
const TABLE_HEADER: [&str; 5] = ["Date", "Order ID", "Items", "Total", "Profit"];

/// What a line of the report is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Title,
    Generated,
    TableHeader,
    Row,
    Summary,
}

/// A piece of text placed at a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub x_mm: f32,
    pub text: String,
}

/// One baseline of text on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub role: LineRole,
    /// Baseline, measured down from the top edge.
    pub y_mm: f32,
    pub size_pt: f32,
    pub bold: bool,
    pub cells: Vec<Cell>,
}

/// Positioned text, page by page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    pub lines: Vec<ReportLine>,
}

/// The report laid out on A4 pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub pages: Vec<ReportPage>,
}

impl ReportLayout {
    /// Every line of a given role across all pages.
    pub fn lines(&self, role: LineRole) -> impl Iterator<Item = &ReportLine> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter())
            .filter(move |line| line.role == role)
    }
}

impl ReportLine {
    fn text(role: LineRole, y_mm: f32, size_pt: f32, text: String) -> Self {
        ReportLine {
            role,
            y_mm,
            size_pt,
            bold: matches!(role, LineRole::Title | LineRole::Summary),
            cells: vec![Cell { x_mm: LEFT_MM, text }],
        }
    }

    fn table(role: LineRole, y_mm: f32, texts: [String; 5]) -> Self {
        let header = role == LineRole::TableHeader;
        ReportLine {
            role,
            y_mm,
            size_pt: if header { 9.0 } else { 8.0 },
            bold: header,
            cells: COLUMNS_MM
                .iter()
                .zip(texts)
                .map(|(x_mm, text)| Cell { x_mm: *x_mm, text })
                .collect(),
        }
    }

    /// The text of all cells, joined by single spaces.
    pub fn joined(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SalesReport {
    /// Lays the report out on A4 pages.
    ///
    /// Page one carries the title and "Generated on"; the table header is
    /// repeated on every page the rows spill onto; the two summary lines
    /// follow the last row. `symbol` is prefixed to every amount.
    pub fn layout(&self, symbol: &str) -> ReportLayout {
        let amount = |cents: i64| format!("{}{}", symbol, Money::from_cents(cents));
        let header = || TABLE_HEADER.map(str::to_string);

        let mut pages = Vec::new();
        let mut page = ReportPage::default();
        page.lines.push(ReportLine::text(
            LineRole::Title,
            TITLE_Y_MM,
            18.0,
            self.title.clone(),
        ));
        page.lines.push(ReportLine::text(
            LineRole::Generated,
            GENERATED_Y_MM,
            11.0,
            format!("Generated on: {}", self.generated_on),
        ));
        page.lines.push(ReportLine::table(
            LineRole::TableHeader,
            TABLE_TOP_MM,
            header(),
        ));
        let mut y = TABLE_TOP_MM;

        for row in &self.rows {
            y += ROW_HEIGHT_MM;
            if y > BOTTOM_MM {
                pages.push(std::mem::take(&mut page));
                page.lines.push(ReportLine::table(
                    LineRole::TableHeader,
                    CONTINUED_TOP_MM,
                    header(),
                ));
                y = CONTINUED_TOP_MM + ROW_HEIGHT_MM;
            }
            page.lines.push(ReportLine::table(
                LineRole::Row,
                y,
                [
                    row.date_time.clone(),
                    row.order.clone(),
                    row.items.to_string(),
                    amount(row.total_cents),
                    amount(row.profit_cents),
                ],
            ));
        }

        // Summary sits 10mm and 16mm under the last row, on a fresh page if
        // that runs off the bottom.
        if y + 16.0 > BOTTOM_MM {
            pages.push(std::mem::take(&mut page));
            y = CONTINUED_TOP_MM - 10.0;
        }
        page.lines.push(ReportLine::text(
            LineRole::Summary,
            y + 10.0,
            12.0,
            format!("Total Sales: {}", amount(self.total_sales_cents)),
        ));
        page.lines.push(ReportLine::text(
            LineRole::Summary,
            y + 16.0,
            12.0,
            format!("Total Profit: {}", amount(self.total_profit_cents)),
        ));
        pages.push(page);

        ReportLayout {
            title: self.title.clone(),
            pages,
        }
    }
}

// =============================================================================
// File Names
// =============================================================================

/// The two export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    Csv,
    Pdf,
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Pdf => "pdf",
        }
    }
}

/// `sales_report_YYYY-MM-DD.<ext>`
pub fn export_file_name(kind: ExportKind, date: NaiveDate) -> String {
    format!(
        "sales_report_{}.{}",
        date.format("%Y-%m-%d"),
        kind.extension()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleItem;
    use chrono::{FixedOffset, Utc};

    fn sale(id: &str, at: &str, lines: usize, total: i64, profit: i64) -> Sale {
        let item = SaleItem {
            product_id: "p".to_string(),
            name: "Thing".to_string(),
            unit_price_cents: 100,
            unit_cost_cents: 50,
            quantity: 1,
            line_total_cents: 100,
        };
        Sale {
            id: id.to_string(),
            created_at: DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc),
            items: vec![item; lines],
            total_cents: total,
            profit_cents: profit,
        }
    }

    fn ledger() -> Vec<Sale> {
        vec![
            sale("s-1", "2024-03-10T08:15:00Z", 2, 25000, 11000),
            sale("s-2", "2024-03-10T19:30:05Z", 1, 1050, -50),
        ]
    }

    fn generated_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-11T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_csv_rejects_empty_ledger() {
        assert_eq!(
            to_delimited_text(&[], &Utc, "LKR").unwrap_err(),
            CoreError::NothingToExport
        );
    }

    #[test]
    fn test_csv_rows() {
        let text = to_delimited_text(&ledger(), &Utc, "LKR").unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Date,Time,Order ID,Items Count,Total Amount (LKR),Profit (LKR)"
        );
        assert_eq!(lines[1], "2024-03-10,08:15:00,s-1,2,250.00,110.00");
        assert_eq!(lines[2], "2024-03-10,19:30:05,s-2,1,10.50,-0.50");
    }

    #[test]
    fn test_csv_header_without_currency_code() {
        let text = to_delimited_text(&ledger(), &Utc, " ").unwrap();
        assert!(text.starts_with("Date,Time,Order ID,Items Count,Total Amount,Profit\n"));
    }

    #[test]
    fn test_csv_uses_local_time() {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let text = to_delimited_text(&ledger(), &tz, "LKR").unwrap();
        let last = text.lines().last().unwrap();
        assert!(last.starts_with("2024-03-11,00:30:05,"));
    }

    #[test]
    fn test_report_rows_and_totals() {
        let report = build_report(&ledger(), "Corner Shop - Sales Report", &generated_at()).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].order, "#s-1");
        assert_eq!(report.rows[0].date_time, "2024-03-10 08:15:00");
        assert_eq!(report.total_sales_cents, 26050);
        assert_eq!(report.total_profit_cents, 10950);
        assert_eq!(report.generated_on, "2024-03-11 09:00:00");
    }

    #[test]
    fn test_layout_has_one_row_per_sale_and_summary() {
        let report = build_report(&ledger(), "Corner Shop - Sales Report", &generated_at()).unwrap();
        let layout = report.layout("$");

        assert_eq!(layout.pages.len(), 1);
        let title: Vec<_> = layout.lines(LineRole::Title).collect();
        assert_eq!(title[0].joined(), "Corner Shop - Sales Report");
        assert_eq!(
            layout.lines(LineRole::Generated).next().unwrap().joined(),
            "Generated on: 2024-03-11 09:00:00"
        );

        let header = layout.lines(LineRole::TableHeader).next().unwrap();
        assert_eq!(header.joined(), "Date Order ID Items Total Profit");

        let rows: Vec<_> = layout.lines(LineRole::Row).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells.len(), 5);
        assert_eq!(rows[0].joined(), "2024-03-10 08:15:00 #s-1 2 $250.00 $110.00");
        assert!(rows[1].y_mm > rows[0].y_mm);

        let summary: Vec<String> = layout.lines(LineRole::Summary).map(ReportLine::joined).collect();
        assert_eq!(summary, vec!["Total Sales: $260.50", "Total Profit: $109.50"]);
    }

    #[test]
    fn test_layout_breaks_long_reports_across_pages() {
        let sales: Vec<Sale> = (0..80)
            .map(|i| sale(&format!("s-{i}"), "2024-03-10T08:15:00Z", 1, 100, 40))
            .collect();
        let layout = build_report(&sales, "Report", &generated_at())
            .unwrap()
            .layout("Rs ");

        assert!(layout.pages.len() > 1);
        assert_eq!(layout.lines(LineRole::Row).count(), 80);
        assert_eq!(layout.lines(LineRole::Title).count(), 1);
        assert_eq!(
            layout.lines(LineRole::TableHeader).count(),
            layout.pages.len()
        );
        for page in &layout.pages {
            assert!(page.lines.iter().all(|l| l.y_mm > 0.0 && l.y_mm <= BOTTOM_MM));
        }

        let last = layout.pages.last().unwrap();
        assert_eq!(
            last.lines.last().unwrap().joined(),
            "Total Profit: Rs 32.00"
        );
    }

    #[test]
    fn test_report_rejects_empty_ledger() {
        assert_eq!(
            build_report(&[], "x", &Utc::now()).unwrap_err(),
            CoreError::NothingToExport
        );
    }

    #[test]
    fn test_report_totals_overflow_is_rejected() {
        let sales = vec![
            sale("a", "2024-03-10T08:15:00Z", 1, i64::MAX, 0),
            sale("b", "2024-03-10T08:16:00Z", 1, 1, 0),
        ];
        assert_eq!(
            build_report(&sales, "x", &Utc::now()).unwrap_err(),
            CoreError::AmountOverflow
        );
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            export_file_name(ExportKind::Csv, date),
            "sales_report_2024-03-07.csv"
        );
        assert_eq!(
            export_file_name(ExportKind::Pdf, date),
            "sales_report_2024-03-07.pdf"
        );
    }
}
