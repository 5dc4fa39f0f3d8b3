// expiry-labels: drawing a single label

use crate::dates::LabelDates;
use crate::error::AppError;

/// Border line width in mm
pub const BORDER_WIDTH_MM: f32 = 0.5;

/// Label text size in points
pub const LABEL_FONT_SIZE: f32 = 8.0;

/// Left inset of the text lines
const TEXT_INSET_MM: f32 = 2.0;

/// Distance of each text baseline from the label's vertical centre
const LINE_OFFSET_MM: f32 = 3.0;

/// Something labels can be drawn on. Coordinates are mm from the top-left
/// corner of the current page.
pub trait LabelSurface {
    /// Starts a new page; subsequent drawing goes there.
    fn add_page(&mut self) -> Result<(), AppError>;

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Draws monospace bold text with its baseline at `y`.
    fn text(&mut self, text: &str, x: f32, y: f32);
}

pub fn mfg_line(dates: &LabelDates) -> String {
    format!("MFG - {}", dates.mfg)
}

pub fn best_before_line(dates: &LabelDates) -> String {
    format!("BEST BEFORE - {}", dates.exp)
}

pub fn render_label<S: LabelSurface + ?Sized>(
    surface: &mut S,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    dates: &LabelDates,
) {
    surface.stroke_rect(x, y, width, height);

    let text_x = x + TEXT_INSET_MM;
    let center_y = y + height / 2.0;

    surface.text(&mfg_line(dates), text_x, center_y - LINE_OFFSET_MM);
    surface.text(&best_before_line(dates), text_x, center_y + LINE_OFFSET_MM);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Page,
        Rect { x: f32, y: f32, w: f32, h: f32 },
        Text { text: String, x: f32, y: f32 },
    }

    /// Records draw calls; starts on page 1 like a fresh PDF.
    #[derive(Default)]
    pub struct RecordingSurface {
        pub ops: Vec<Op>,
        pub pages: usize,
        pub fail_on_page: Option<usize>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self {
                pages: 1,
                ..Default::default()
            }
        }

        /// Rectangles grouped by the page they were drawn on.
        pub fn rects_per_page(&self) -> Vec<Vec<(f32, f32, f32, f32)>> {
            let mut pages = vec![Vec::new()];
            for op in &self.ops {
                match op {
                    Op::Page => pages.push(Vec::new()),
                    Op::Rect { x, y, w, h } => {
                        if let Some(page) = pages.last_mut() {
                            page.push((*x, *y, *w, *h));
                        }
                    }
                    Op::Text { .. } => {}
                }
            }
            pages
        }
    }

    impl LabelSurface for RecordingSurface {
        fn add_page(&mut self) -> Result<(), AppError> {
            if self.fail_on_page == Some(self.pages + 1) {
                return Err(AppError::Pdf("page allocation failed".to_string()));
            }
            self.pages += 1;
            self.ops.push(Op::Page);
            Ok(())
        }

        fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
            self.ops.push(Op::Rect { x, y, w: width, h: height });
        }

        fn text(&mut self, text: &str, x: f32, y: f32) {
            self.ops.push(Op::Text {
                text: text.to_string(),
                x,
                y,
            });
        }
    }
}
