// expiry-labels: assembling label sheets into a PDF

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Pt, Rgb,
};
use std::fs;
use std::io::{BufWriter, Write};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::dates::LabelDates;
use crate::error::AppError;
use crate::label::{render_label, LabelSurface, BORDER_WIDTH_MM, LABEL_FONT_SIZE};
use crate::layout::LayoutPlan;

const DOCUMENT_TITLE: &str = "Labels";
const LAYER_NAME: &str = "Layer 1";

// ============================================================================
// Label Count
// ============================================================================

/// Number of labels requested; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCount(NonZeroU32);

impl LabelCount {
    pub fn new(count: u32) -> Option<Self> {
        NonZeroU32::new(count).map(Self)
    }

    /// Accepts a positive integer, surrounding whitespace allowed.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        input
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| AppError::InvalidCount(input.trim().to_string()))
    }

    pub fn get(self) -> usize {
        self.0.get() as usize
    }
}

impl std::fmt::Display for LabelCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Generated Document
// ============================================================================

/// A fully assembled label sheet. Immutable once built.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    bytes: Vec<u8>,
    label_count: LabelCount,
    page_count: usize,
    dates: LabelDates,
    saved_path: Option<PathBuf>,
}

impl GeneratedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn label_count(&self) -> LabelCount {
        self.label_count
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn dates(&self) -> &LabelDates {
        &self.dates
    }

    /// Where `save_to` wrote the file, if it has been saved.
    pub fn saved_path(&self) -> Option<&Path> {
        self.saved_path.as_deref()
    }

    /// `Labels_<count>_<DD-MM-YYYY>.pdf`
    pub fn file_name(&self) -> String {
        file_name(self.label_count, &self.dates)
    }

    /// Writes the PDF into `dir`. The file appears complete or not at all;
    /// an existing file of the same name is only replaced once the new one is
    /// fully written.
    pub fn save_to(&mut self, dir: &Path) -> Result<&Path, AppError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());

        let mut staged = tempfile::Builder::new()
            .prefix(".labels-")
            .suffix(".pdf.part")
            .tempfile_in(dir)?;
        staged.write_all(&self.bytes)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged.persist(&path).map_err(|e| AppError::Io(e.error))?;

        tracing::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(self.saved_path.insert(path).as_path())
    }
}

pub fn file_name(count: LabelCount, dates: &LabelDates) -> String {
    format!("Labels_{}_{}.pdf", count, dates.mfg.replace('/', "-"))
}

// ============================================================================
// Assembly
// ============================================================================

/// Places `count` labels slot by slot, adding a page whenever the current one
/// is full. Returns the number of pages used.
pub fn assemble<S: LabelSurface + ?Sized>(
    surface: &mut S,
    count: LabelCount,
    dates: &LabelDates,
    plan: &LayoutPlan,
) -> Result<usize, AppError> {
    for index in 0..count.get() {
        if index > 0 && index % plan.labels_per_page == 0 {
            surface.add_page()?;
        }

        let slot = plan.slot(index);
        render_label(
            surface,
            slot.x,
            slot.y,
            plan.label_width,
            plan.label_height,
            dates,
        );
    }

    let pages = plan.page_count(count.get());
    tracing::debug!("Placed {} labels on {} page(s)", count, pages);
    Ok(pages)
}

pub fn generate_document(
    count: LabelCount,
    dates: &LabelDates,
    plan: &LayoutPlan,
) -> Result<GeneratedDocument, AppError> {
    let mut surface = PdfSurface::new(plan)?;
    let page_count = assemble(&mut surface, count, dates, plan)?;
    let bytes = surface.finish()?;

    Ok(GeneratedDocument {
        bytes,
        label_count: count,
        page_count,
        dates: dates.clone(),
        saved_path: None,
    })
}

// ============================================================================
// PDF Surface
// ============================================================================

/// printpdf-backed surface. Converts top-left mm coordinates to PDF space.
pub struct PdfSurface {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    page_width: f32,
    page_height: f32,
    pages: usize,
}

impl PdfSurface {
    pub fn new(plan: &LayoutPlan) -> Result<Self, AppError> {
        let (doc, page1, layer1) = PdfDocument::new(
            DOCUMENT_TITLE,
            Mm(plan.page_width),
            Mm(plan.page_height),
            LAYER_NAME,
        );
        let layer = doc.get_page(page1).get_layer(layer1);

        let font = doc
            .add_builtin_font(BuiltinFont::CourierBold)
            .map_err(|e| AppError::Pdf(e.to_string()))?;

        let surface = Self {
            doc,
            layer,
            font,
            page_width: plan.page_width,
            page_height: plan.page_height,
            pages: 1,
        };
        surface.apply_stroke_style();
        Ok(surface)
    }

    fn apply_stroke_style(&self) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer
            .set_outline_thickness(Pt::from(Mm(BORDER_WIDTH_MM)).0);
    }

    /// Serializes the document.
    pub fn finish(self) -> Result<Vec<u8>, AppError> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| AppError::Pdf(e.to_string()))
    }
}

impl LabelSurface for PdfSurface {
    fn add_page(&mut self) -> Result<(), AppError> {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.page_width),
            Mm(self.page_height),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.apply_stroke_style();
        Ok(())
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let top = self.page_height - y;
        let bottom = top - height;
        let points = vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(bottom)), false),
            (Point::new(Mm(x), Mm(bottom)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn text(&mut self, text: &str, x: f32, y: f32) {
        self.layer.use_text(
            text,
            LABEL_FONT_SIZE,
            Mm(x),
            Mm(self.page_height - y),
            &self.font,
        );
    }
}
