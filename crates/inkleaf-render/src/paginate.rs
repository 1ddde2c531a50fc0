use std::sync::Arc;

use inkleaf::{BlockRole, FlowBlock, FlowDocument};

use crate::metrics::{ResolvedMetrics, TextStyle};
use crate::page_table::{LineSpan, PageSpan, PageTable};

/// Optional text measurement hook for glyph-accurate line fitting.
///
/// Backends that rasterize with real font metrics should install one so
/// pagination and drawing agree on line breaks. Without a measurer a
/// per-glyph width heuristic is used.
pub trait TextMeasurer: Send + Sync {
    /// Measure rendered text width in pixels for the provided style.
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32;
}

/// Deterministic pagination engine.
///
/// One engine walks a flow document exactly once per call and emits an
/// immutable [`PageTable`]. The walk is bounded by the document size; the
/// engine holds no document state between calls.
#[derive(Clone)]
pub struct PaginationEngine {
    metrics: ResolvedMetrics,
    measurer: Option<Arc<dyn TextMeasurer>>,
}

impl core::fmt::Debug for PaginationEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("metrics", &self.metrics)
            .field("has_measurer", &self.measurer.is_some())
            .finish()
    }
}

impl PaginationEngine {
    /// Create an engine for resolved metrics.
    pub fn new(metrics: ResolvedMetrics) -> Self {
        Self {
            metrics,
            measurer: None,
        }
    }

    /// Install a shared text measurer for glyph-accurate width fitting.
    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = Some(measurer);
        self
    }

    /// Paginate a flow document.
    ///
    /// Spans in the result are contiguous, non-overlapping, and cover the
    /// document's flow positions exactly once. An empty document yields a
    /// single page spanning zero content, so a freshly laid-out document
    /// always has at least one renderable page.
    pub fn paginate(&self, doc: &FlowDocument) -> PageTable {
        let metrics = self.metrics;
        let mut builder = PageBuilder::new(&metrics);
        let body_advance = metrics.line_advance_px(&metrics.text_style(BlockRole::Paragraph));

        let mut prev_role: Option<BlockRole> = None;
        for (block_idx, block) in doc.blocks().iter().enumerate() {
            let style = metrics.text_style(block.role());
            let line_advance = metrics.line_advance_px(&style);

            if let Some(prev) = prev_role {
                let mut gap = if prev.is_heading() {
                    metrics.heading_gap_px
                } else {
                    metrics.paragraph_gap_px
                };
                if block.role().is_heading() {
                    gap = gap.max(metrics.heading_gap_px);
                }
                builder.add_gap(gap);
            }

            let first_line_indent = match block.role() {
                BlockRole::Paragraph if !prev_role.is_some_and(BlockRole::is_heading) => {
                    metrics.first_line_indent_px
                }
                _ => 0,
            };
            let wrapped = self.wrap_block(block, &style, first_line_indent);

            // Block-start break policy: a heading stays with its following
            // lines and a paragraph never leaves fewer than the orphan
            // minimum at a page bottom, when the page is not already empty.
            let reserve_lines = if block.role().is_heading() {
                let keep = metrics.heading_keep_with_next_lines as i32;
                line_advance + metrics.heading_gap_px + keep * body_advance
            } else {
                let orphan = (metrics.orphan_min_lines as usize).min(wrapped.len()) as i32;
                orphan * line_advance
            };
            builder.break_unless_room(reserve_lines, block.first_word());

            for line in &wrapped {
                builder.place_line(
                    LineSpan {
                        block: block_idx,
                        start_word: block.first_word() + line.local_start,
                        end_word: block.first_word() + line.local_end,
                        indent_px: line.indent_px,
                        y_px: 0,
                    },
                    line_advance,
                );
            }
            prev_role = Some(block.role());
        }

        let table = builder.finish(doc.word_count());
        log::debug!(
            "paginated {} word(s) into {} page(s)",
            doc.word_count(),
            table.page_count()
        );
        table
    }

    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        self.measurer
            .as_ref()
            .map(|m| m.measure_text_px(text, style))
            .unwrap_or_else(|| heuristic_measure_text(text, style))
    }

    /// Greedy first-fit word wrap of one block.
    ///
    /// A word wider than the content width gets a line of its own and is
    /// clipped at render time rather than broken mid-glyph.
    fn wrap_block(
        &self,
        block: &FlowBlock,
        style: &TextStyle,
        first_line_indent: i32,
    ) -> Vec<WrappedLine> {
        let metrics = &self.metrics;
        let base_inset = if style.role == BlockRole::ListItem {
            metrics.list_indent_px
        } else {
            0
        };
        let space_w = self.measure(" ", style);

        let mut lines = Vec::with_capacity(4);
        let mut line_start = 0usize;
        let mut line_width = 0.0f32;
        let mut words_on_line = 0usize;
        let mut indent_px = base_inset + first_line_indent;

        for (idx, word) in block.words().enumerate() {
            let word_w = self.measure(word, style);
            if words_on_line == 0 {
                line_start = idx;
                line_width = word_w;
                words_on_line = 1;
                continue;
            }
            let max_width = (metrics.content_width() - indent_px).max(1) as f32;
            if line_width + space_w + word_w > max_width {
                lines.push(WrappedLine {
                    local_start: line_start,
                    local_end: idx,
                    indent_px,
                });
                indent_px = base_inset;
                line_start = idx;
                line_width = word_w;
                words_on_line = 1;
            } else {
                line_width += space_w + word_w;
                words_on_line += 1;
            }
        }
        if words_on_line > 0 {
            lines.push(WrappedLine {
                local_start: line_start,
                local_end: block.word_count(),
                indent_px,
            });
        }
        lines
    }
}

#[derive(Clone, Copy, Debug)]
struct WrappedLine {
    local_start: usize,
    local_end: usize,
    indent_px: i32,
}

/// Accumulates placed lines into page descriptors.
struct PageBuilder<'m> {
    metrics: &'m ResolvedMetrics,
    lines: Vec<LineSpan>,
    pages: Vec<PageSpan>,
    cursor_y: i32,
    page_first_line: usize,
    page_start_word: usize,
}

impl<'m> PageBuilder<'m> {
    fn new(metrics: &'m ResolvedMetrics) -> Self {
        Self {
            metrics,
            lines: Vec::with_capacity(64),
            pages: Vec::with_capacity(8),
            cursor_y: metrics.content_top(),
            page_first_line: 0,
            page_start_word: 0,
        }
    }

    fn page_has_lines(&self) -> bool {
        self.lines.len() > self.page_first_line
    }

    fn add_gap(&mut self, gap_px: i32) {
        if gap_px > 0 && self.page_has_lines() {
            self.cursor_y += gap_px;
        }
    }

    /// Close the page early when fewer than `needed_px` remain.
    fn break_unless_room(&mut self, needed_px: i32, next_start_word: usize) {
        if self.page_has_lines() && self.cursor_y + needed_px > self.metrics.content_bottom() {
            self.close_page(next_start_word);
        }
    }

    /// Place a line, closing the current page first when the line advance
    /// would overrun the content bottom. Content that exactly reaches the
    /// bottom still fits; the page closes on the next line instead.
    fn place_line(&mut self, mut line: LineSpan, line_advance: i32) {
        if self.page_has_lines() && self.cursor_y + line_advance > self.metrics.content_bottom() {
            self.close_page(line.start_word);
        }
        line.y_px = self.cursor_y;
        self.lines.push(line);
        self.cursor_y += line_advance;
    }

    fn close_page(&mut self, end_word: usize) {
        self.pages.push(PageSpan {
            first_line: self.page_first_line,
            line_count: self.lines.len() - self.page_first_line,
            start_word: self.page_start_word,
            end_word,
        });
        self.page_first_line = self.lines.len();
        self.page_start_word = end_word;
        self.cursor_y = self.metrics.content_top();
    }

    fn finish(mut self, word_count: usize) -> PageTable {
        if self.page_has_lines() || self.pages.is_empty() {
            self.close_page(word_count);
        }
        PageTable::new(*self.metrics, self.lines, self.pages, word_count)
    }
}

/// Per-glyph width model used when no backend measurer is installed.
///
/// Class widths are in em units; this is more stable across sizes than a
/// single scalar per character.
pub(crate) fn heuristic_measure_text(text: &str, style: &TextStyle) -> f32 {
    let mut em_sum = 0.0f32;
    let mut chars = 0usize;
    for ch in text.chars() {
        chars += 1;
        em_sum += match ch {
            ' ' | '\u{00A0}' => 0.32,
            'i' | 'l' | 'I' | '|' | '!' => 0.24,
            '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
            '-' | '\u{2013}' | '\u{2014}' => 0.34,
            '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
            'f' | 't' | 'j' | 'r' => 0.34,
            'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
            c if c.is_ascii_digit() => 0.52,
            c if c.is_ascii_uppercase() => 0.64,
            c if c.is_ascii_lowercase() => 0.52,
            c if c.is_whitespace() => 0.32,
            c if c.is_ascii_punctuation() => 0.42,
            _ => 0.56,
        };
    }
    if chars == 0 {
        return 0.0;
    }
    let scale = if style.bold { 1.03 } else { 1.0 };
    em_sum * style.size_px * scale
}
