use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use inkleaf::FlowDocument;
use inkleaf_render::PageTable;

use crate::font::{FontBackend, MonoFontBackend};

/// Draws one laid-out page into any binary draw target.
///
/// The renderer replays the page table's line spans; it never re-derives
/// layout decisions and never mutates the document or the table.
#[derive(Clone, Copy, Debug, Default)]
pub struct PageRenderer<B = MonoFontBackend> {
    backend: B,
}

impl PageRenderer<MonoFontBackend> {
    /// Renderer over the built-in mono font backend.
    pub fn new() -> Self {
        Self {
            backend: MonoFontBackend,
        }
    }
}

impl<B: FontBackend> PageRenderer<B> {
    /// Renderer over a custom glyph backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Clear the target to paper and draw the lines of `page_index`.
    ///
    /// Index validity is the caller's responsibility; an out-of-range index
    /// draws a blank page. The engine boundary rejects such indices before
    /// any write instead.
    pub fn render_page<D>(
        &self,
        content: &FlowDocument,
        table: &PageTable,
        page_index: usize,
        display: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        display.clear(BinaryColor::Off)?;
        let Some(lines) = table.page_lines(page_index) else {
            return Ok(());
        };
        let metrics = table.metrics();
        for line in lines {
            let Some(block) = content.blocks().get(line.block) else {
                continue;
            };
            let local_start = line.start_word.saturating_sub(block.first_word());
            let local_end = line.end_word.saturating_sub(block.first_word());
            let text = block.span_text(local_start..local_end);
            if text.is_empty() {
                continue;
            }
            let style = metrics.text_style(block.role());
            let font_id = self.backend.font_id_for(&style);
            let origin = Point::new(metrics.margin_px + line.indent_px, line.y_px);
            self.backend.draw_text_run(display, font_id, text, origin)?;
        }
        Ok(())
    }
}
