use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::metrics::ResolvedMetrics;

/// One laid-out line: a word span of a single block plus its placement on
/// the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSpan {
    /// Index of the owning block in the flow document.
    pub block: usize,
    /// Global flow position of the line's first word.
    pub start_word: usize,
    /// Global flow position just past the line's last word.
    pub end_word: usize,
    /// Left inset applied to the line (indent plus list inset).
    pub indent_px: i32,
    /// Top of the line relative to the page's top edge.
    pub y_px: i32,
}

impl LineSpan {
    /// Global word range covered by the line.
    pub fn word_range(&self) -> Range<usize> {
        self.start_word..self.end_word
    }
}

/// One page descriptor: a contiguous run of laid-out lines and the flow
/// span they cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSpan {
    /// Index of the page's first line in the table's line list.
    pub first_line: usize,
    /// Number of lines on the page.
    pub line_count: usize,
    /// Global flow position where the page begins.
    pub start_word: usize,
    /// Global flow position where the next page begins.
    pub end_word: usize,
}

impl PageSpan {
    /// Line index range within the owning table.
    pub fn line_range(&self) -> Range<usize> {
        self.first_line..self.first_line + self.line_count
    }

    /// Global word range covered by the page.
    pub fn word_range(&self) -> Range<usize> {
        self.start_word..self.end_word
    }

    /// Whether the page spans zero content.
    pub fn is_empty(&self) -> bool {
        self.start_word == self.end_word
    }
}

/// Immutable pagination result: ordered page descriptors whose spans are
/// contiguous, non-overlapping, and cover the flow content exactly once.
///
/// A table also records every laid-out line so rasterization replays the
/// pagination's decisions instead of re-deriving them.
#[derive(Clone, Debug, PartialEq)]
pub struct PageTable {
    metrics: ResolvedMetrics,
    lines: Vec<LineSpan>,
    pages: Vec<PageSpan>,
    word_count: usize,
}

impl PageTable {
    pub(crate) fn new(
        metrics: ResolvedMetrics,
        lines: Vec<LineSpan>,
        pages: Vec<PageSpan>,
        word_count: usize,
    ) -> Self {
        debug_assert!(!pages.is_empty(), "a layout always yields at least one page");
        Self {
            metrics,
            lines,
            pages,
            word_count,
        }
    }

    /// Number of pages. At least one after any successful layout.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page descriptors in order.
    pub fn pages(&self) -> &[PageSpan] {
        &self.pages
    }

    /// All laid-out lines in flow order.
    pub fn lines(&self) -> &[LineSpan] {
        &self.lines
    }

    /// Metrics the table was produced under.
    pub fn metrics(&self) -> &ResolvedMetrics {
        &self.metrics
    }

    /// Total flow positions covered by the table.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// The page descriptor for `page_index`.
    pub fn page(&self, page_index: usize) -> Option<&PageSpan> {
        self.pages.get(page_index)
    }

    /// Lines belonging to `page_index`.
    pub fn page_lines(&self, page_index: usize) -> Option<&[LineSpan]> {
        let span = self.pages.get(page_index)?;
        self.lines.get(span.line_range())
    }

    /// Index of the page containing the global word position.
    pub fn page_for_word(&self, word: usize) -> Option<usize> {
        if word >= self.word_count {
            return None;
        }
        match self
            .pages
            .binary_search_by_key(&word, |page| page.start_word)
        {
            Ok(idx) => Some(idx),
            Err(insert) => Some(insert.saturating_sub(1)),
        }
    }

    /// Deterministic identity of this pagination outcome.
    ///
    /// Two layout runs over identical content with identical metrics yield
    /// the same profile id.
    pub fn profile_id(&self) -> LayoutProfileId {
        let mut payload = Vec::with_capacity(32 + self.pages.len() * 16);
        for field in [
            self.metrics.page.width as u64,
            self.metrics.page.height as u64,
            self.metrics.margin_px as u64,
            self.metrics.base_font_px as u64,
            self.metrics.line_height_percent as u64,
            self.word_count as u64,
        ] {
            payload.extend_from_slice(&field.to_le_bytes());
        }
        for page in &self.pages {
            payload.extend_from_slice(&(page.start_word as u64).to_le_bytes());
            payload.extend_from_slice(&(page.end_word as u64).to_le_bytes());
        }
        LayoutProfileId::from_bytes(&payload)
    }

    /// Snapshot a resumable reading position for `page_index`.
    pub fn reading_position(&self, page_index: usize) -> Option<ReadingPosition> {
        let page = self.pages.get(page_index)?;
        Some(ReadingPosition {
            page_index,
            page_count: self.pages.len(),
            first_word: page.start_word,
            progress: page_progress_from_count(page_index, self.pages.len()),
        })
    }

    /// Resolve a reading position captured under any earlier layout into a
    /// valid page index for this table.
    ///
    /// The word anchor wins when it is still in range; otherwise the
    /// normalized progress ratio decides. The result is always a valid
    /// index.
    pub fn resolve_position(&self, position: &ReadingPosition) -> usize {
        if let Some(page) = self.page_for_word(position.first_word) {
            return page;
        }
        let progress = if position.progress.is_finite() {
            position.progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scaled = (progress * self.pages.len().saturating_sub(1) as f32).round() as usize;
        scaled.min(self.pages.len().saturating_sub(1))
    }
}

fn page_progress_from_count(page_index: usize, page_count: usize) -> f32 {
    if page_count <= 1 {
        return 0.0;
    }
    page_index.min(page_count - 1) as f32 / (page_count - 1) as f32
}

/// Persisted reading position token.
///
/// The token stores a word anchor plus normalized progress so callers can
/// remap positions after a reflow changes the page count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    /// Page index in the source pagination.
    pub page_index: usize,
    /// Total pages in the source pagination.
    pub page_count: usize,
    /// Global flow position at the top of the source page.
    pub first_word: usize,
    /// Normalized progress ratio in `[0.0, 1.0]`.
    pub progress: f32,
}

impl ReadingPosition {
    /// Serialize the token to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a token from JSON.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Stable layout profile id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutProfileId(pub [u8; 16]);

impl LayoutProfileId {
    /// Build a deterministic profile id from arbitrary payload bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        fn fnv64(seed: u64, payload: &[u8]) -> u64 {
            let mut hash = seed;
            for b in payload {
                hash ^= *b as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            hash
        }
        let mut out = [0u8; 16];
        out[0..8].copy_from_slice(&fnv64(0xcbf29ce484222325, bytes).to_le_bytes());
        out[8..16].copy_from_slice(&fnv64(0x9e3779b97f4a7c15, bytes).to_le_bytes());
        Self(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{LayoutOptions, Size};

    fn table_with_pages(boundaries: &[(usize, usize)]) -> PageTable {
        let metrics = LayoutOptions::default()
            .resolve(Size::new(480, 800))
            .expect("resolve");
        let pages = boundaries
            .iter()
            .map(|&(start, end)| PageSpan {
                first_line: 0,
                line_count: 0,
                start_word: start,
                end_word: end,
            })
            .collect::<Vec<_>>();
        let word_count = boundaries.last().map(|&(_, end)| end).unwrap_or(0);
        PageTable::new(metrics, Vec::new(), pages, word_count)
    }

    #[test]
    fn page_for_word_maps_boundaries() {
        let table = table_with_pages(&[(0, 10), (10, 25), (25, 30)]);
        assert_eq!(table.page_for_word(0), Some(0));
        assert_eq!(table.page_for_word(9), Some(0));
        assert_eq!(table.page_for_word(10), Some(1));
        assert_eq!(table.page_for_word(29), Some(2));
        assert_eq!(table.page_for_word(30), None);
    }

    #[test]
    fn profile_id_is_deterministic_and_span_sensitive() {
        let a = table_with_pages(&[(0, 10), (10, 20)]);
        let b = table_with_pages(&[(0, 10), (10, 20)]);
        let c = table_with_pages(&[(0, 12), (12, 20)]);
        assert_eq!(a.profile_id(), b.profile_id());
        assert_ne!(a.profile_id(), c.profile_id());
    }

    #[test]
    fn reading_position_round_trips_through_json() {
        let table = table_with_pages(&[(0, 10), (10, 20), (20, 28)]);
        let token = table.reading_position(1).expect("page exists");
        let json = token.to_json().expect("serialize");
        let restored = ReadingPosition::from_json(&json).expect("deserialize");
        assert_eq!(token, restored);
        assert_eq!(table.resolve_position(&restored), 1);
    }

    #[test]
    fn resolve_position_falls_back_to_progress() {
        let table = table_with_pages(&[(0, 5), (5, 10)]);
        let stale = ReadingPosition {
            page_index: 9,
            page_count: 10,
            first_word: 999,
            progress: 1.0,
        };
        assert_eq!(table.resolve_position(&stale), 1);
        let start = ReadingPosition {
            page_index: 0,
            page_count: 10,
            first_word: 998,
            progress: 0.0,
        };
        assert_eq!(table.resolve_position(&start), 0);
    }
}
