//! # PDF Drawing
//!
//! Draws a [`ReportLayout`] with printpdf's built-in Helvetica, so no font
//! files have to ship with the binary.
//!
//! ```text
//! SalesReport ──► layout(symbol) ──► ReportLayout ──► to_pdf() ──► bytes
//!                  (till-core)         pages of          (here)
//!                                      positioned text
//! ```
//!
//! The layout measures `y` down from the top edge; PDF measures up from the
//! bottom, so every baseline is flipped against the page height.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use till_core::export::{ReportLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use tracing::debug;

use crate::error::{AppError, AppResult, ErrorCode};

const LAYER: &str = "Report";

/// Renders the layout as a complete PDF document.
pub fn to_pdf(layout: &ReportLayout) -> AppResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER,
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    for (index, page) in layout.pages.iter().enumerate() {
        if index > 0 {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);
            layer = doc.get_page(page_index).get_layer(layer_index);
        }

        for line in &page.lines {
            let font: &IndirectFontRef = if line.bold { &bold } else { &regular };
            for cell in &line.cells {
                layer.use_text(
                    cell.text.as_str(),
                    line.size_pt,
                    Mm(cell.x_mm),
                    Mm(PAGE_HEIGHT_MM - line.y_mm),
                    font,
                );
            }
        }
    }

    debug!(pages = layout.pages.len(), "Report drawn");
    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(err: impl std::fmt::Display) -> AppError {
    tracing::error!("PDF rendering failed: {}", err);
    AppError::new(ErrorCode::ExportError, "Export failed")
}
