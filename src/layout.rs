// expiry-labels: label grid geometry

use crate::error::AppError;

// ============================================================================
// Constants
// ============================================================================

/// A4 dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// 2" x 2" square label
pub const LABEL_WIDTH_MM: f32 = 50.8;
pub const LABEL_HEIGHT_MM: f32 = 50.8;

// ============================================================================
// Layout Plan
// ============================================================================

/// Grid of equally sized labels centred on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPlan {
    pub page_width: f32,
    pub page_height: f32,
    pub label_width: f32,
    pub label_height: f32,
    pub labels_per_row: usize,
    pub labels_per_column: usize,
    pub labels_per_page: usize,
    pub margin_left: f32,
    pub margin_top: f32,
}

/// One placement position. `x`/`y` are mm from the top-left page corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSlot {
    pub page: usize,
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
}

pub fn compute_layout(
    page_width: f32,
    page_height: f32,
    label_width: f32,
    label_height: f32,
) -> Result<LayoutPlan, AppError> {
    let degenerate = || AppError::DegenerateLayout {
        page_width,
        page_height,
        label_width,
        label_height,
    };

    let dims = [page_width, page_height, label_width, label_height];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return Err(degenerate());
    }

    let labels_per_row = (page_width / label_width).floor() as usize;
    let labels_per_column = (page_height / label_height).floor() as usize;
    let labels_per_page = labels_per_row * labels_per_column;

    // Zero slots per page would never finish paginating.
    if labels_per_page == 0 {
        return Err(degenerate());
    }

    Ok(LayoutPlan {
        page_width,
        page_height,
        label_width,
        label_height,
        labels_per_row,
        labels_per_column,
        labels_per_page,
        margin_left: (page_width - labels_per_row as f32 * label_width) / 2.0,
        margin_top: (page_height - labels_per_column as f32 * label_height) / 2.0,
    })
}

impl LayoutPlan {
    /// 2" square labels on A4 portrait.
    pub fn a4_square_labels() -> Result<Self, AppError> {
        compute_layout(PAGE_WIDTH_MM, PAGE_HEIGHT_MM, LABEL_WIDTH_MM, LABEL_HEIGHT_MM)
    }

    /// Position of the `index`-th label (0-based), filling rows left to right
    /// and pages top to bottom.
    pub fn slot(&self, index: usize) -> LabelSlot {
        let on_page = index % self.labels_per_page;
        let row = on_page / self.labels_per_row;
        let col = on_page % self.labels_per_row;
        LabelSlot {
            page: index / self.labels_per_page,
            row,
            col,
            x: self.margin_left + col as f32 * self.label_width,
            y: self.margin_top + row as f32 * self.label_height,
        }
    }

    pub fn page_count(&self, label_count: usize) -> usize {
        label_count.div_ceil(self.labels_per_page)
    }
}
