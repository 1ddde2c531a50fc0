use core::fmt;

use inkleaf::BlockRole;

/// Largest base font size accepted in device units.
const MAX_FONT_SIZE: u32 = 512;

/// Logical width/height pair used for pages and surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in device units.
    pub width: u32,
    /// Height in device units.
    pub height: u32,
}

impl Size {
    /// Construct a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Raw typographic preferences crossing the engine boundary.
///
/// A new configuration fully replaces the previous one on layout; there is
/// no incremental merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Base font size in device-independent units. Must be positive.
    pub font_size: u32,
    /// Line height as a percentage of font size (100 = single spacing).
    pub line_height_percent: u32,
    /// Uniform page margin in device units.
    pub page_margin: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            font_size: 18,
            line_height_percent: 120,
            page_margin: 12,
        }
    }
}

impl LayoutOptions {
    /// Resolve raw preferences against a known page size.
    ///
    /// Page dimensions are known at layout time here, so margins that leave
    /// no usable content area fail the whole layout call rather than
    /// deferring to per-page render failures.
    pub fn resolve(self, page: Size) -> Result<ResolvedMetrics, LayoutError> {
        if self.font_size == 0 {
            return Err(LayoutError::ZeroFontSize);
        }
        if self.font_size > MAX_FONT_SIZE {
            return Err(LayoutError::FontSizeTooLarge {
                font_size: self.font_size,
                max: MAX_FONT_SIZE,
            });
        }
        if page.width == 0 || page.height == 0 {
            return Err(LayoutError::ZeroPageDimension { page });
        }

        let advance = (self.font_size as u64 * self.line_height_percent as u64) / 100;
        if advance == 0 {
            return Err(LayoutError::ZeroLineAdvance {
                line_height_percent: self.line_height_percent,
            });
        }

        let margin = self.page_margin as u64;
        if margin * 2 >= page.width as u64 || margin * 2 >= page.height as u64 {
            return Err(LayoutError::NoUsableContentArea {
                margin: self.page_margin,
                page,
            });
        }
        let content_height = page.height as u64 - margin * 2;
        if advance > content_height {
            return Err(LayoutError::NoUsableContentArea {
                margin: self.page_margin,
                page,
            });
        }

        let base_font_px = self.font_size as i32;
        Ok(ResolvedMetrics {
            page,
            margin_px: self.page_margin as i32,
            base_font_px,
            line_height_percent: self.line_height_percent,
            paragraph_gap_px: (base_font_px / 2).max(4),
            heading_gap_px: (base_font_px * 2 / 3).max(6),
            first_line_indent_px: base_font_px,
            list_indent_px: (base_font_px * 2 / 3).max(8),
            orphan_min_lines: 2,
            heading_keep_with_next_lines: 2,
        })
    }
}

/// Layout configuration translated into concrete device-unit measurements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedMetrics {
    /// Target page size in device units.
    pub page: Size,
    /// Uniform margin applied on all four sides.
    pub margin_px: i32,
    /// Base font size for body text.
    pub base_font_px: i32,
    /// Line height as a percentage of the per-role font size.
    pub line_height_percent: u32,
    /// Vertical gap after paragraph and list blocks.
    pub paragraph_gap_px: i32,
    /// Vertical gap around heading blocks.
    pub heading_gap_px: i32,
    /// First-line indent for paragraphs (suppressed after headings).
    pub first_line_indent_px: i32,
    /// Left inset for list items.
    pub list_indent_px: i32,
    /// Keep at least this many paragraph lines together at a page bottom.
    pub orphan_min_lines: u8,
    /// Keep headings with at least this many following lines.
    pub heading_keep_with_next_lines: u8,
}

impl ResolvedMetrics {
    /// Usable content width between the left and right margins.
    pub fn content_width(&self) -> i32 {
        (self.page.width as i32 - self.margin_px * 2).max(1)
    }

    /// Top edge of the content area.
    pub fn content_top(&self) -> i32 {
        self.margin_px
    }

    /// Bottom edge of the content area (exclusive).
    pub fn content_bottom(&self) -> i32 {
        self.page.height as i32 - self.margin_px
    }

    /// Resolved text style for a block role.
    ///
    /// Headings render bold and scaled up from the base size; deeper levels
    /// converge towards body size.
    pub fn text_style(&self, role: BlockRole) -> TextStyle {
        let scale_percent: i32 = match role {
            BlockRole::Heading(1) => 175,
            BlockRole::Heading(2) => 150,
            BlockRole::Heading(3) => 135,
            BlockRole::Heading(4) => 120,
            BlockRole::Heading(5) => 110,
            BlockRole::Heading(_) => 105,
            BlockRole::Paragraph | BlockRole::ListItem => 100,
        };
        TextStyle {
            size_px: (self.base_font_px * scale_percent) as f32 / 100.0,
            bold: role.is_heading(),
            role,
        }
    }

    /// Vertical advance for one line of the given style.
    pub fn line_advance_px(&self, style: &TextStyle) -> i32 {
        let advance = style.size_px * self.line_height_percent as f32 / 100.0;
        (advance.round() as i32).max(1)
    }
}

/// Resolved style for one run of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in device pixels.
    pub size_px: f32,
    /// Bold face requested.
    pub bold: bool,
    /// Semantic role the style was derived from.
    pub role: BlockRole,
}

/// Errors raised while resolving layout preferences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Font size of zero is not representable.
    ZeroFontSize,
    /// Font size exceeds the representable device range.
    FontSizeTooLarge { font_size: u32, max: u32 },
    /// Line height percentage resolves to a zero line advance.
    ZeroLineAdvance { line_height_percent: u32 },
    /// Page width or height of zero.
    ZeroPageDimension { page: Size },
    /// Margins (or margins plus one line) consume the whole page.
    NoUsableContentArea { margin: u32, page: Size },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFontSize => write!(f, "font size must be positive"),
            Self::FontSizeTooLarge { font_size, max } => {
                write!(f, "font size {} exceeds device maximum {}", font_size, max)
            }
            Self::ZeroLineAdvance {
                line_height_percent,
            } => write!(
                f,
                "line height {}% resolves to a zero line advance",
                line_height_percent
            ),
            Self::ZeroPageDimension { page } => write!(
                f,
                "page dimensions {}x{} contain a zero extent",
                page.width, page.height
            ),
            Self::NoUsableContentArea { margin, page } => write!(
                f,
                "margin {} leaves no usable content area on a {}x{} page",
                margin, page.width, page.height
            ),
        }
    }
}

impl std::error::Error for LayoutError {}
