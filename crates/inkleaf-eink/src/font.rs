use std::borrow::Cow;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_6X13_BOLD, FONT_6X9, FONT_7X14, FONT_7X14_BOLD, FONT_8X13, FONT_8X13_BOLD,
    FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use inkleaf_render::{TextMeasurer, TextStyle};

/// Backend-local font identifier used for metrics and rasterization
/// dispatch.
pub type FontId = u8;

/// Backend-provided metrics for a specific font id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    /// Fixed advance per glyph.
    pub char_width: i32,
    /// Glyph cell height.
    pub char_height: i32,
}

/// Glyph rasterization capability consumed by the page renderer.
///
/// Implementations draw a run of text top-aligned at `origin` into any
/// binary draw target and report the advance they produced.
pub trait FontBackend {
    /// Map a resolved text style onto a backend font id.
    fn font_id_for(&self, style: &TextStyle) -> FontId;

    /// Metrics for a font id.
    fn metrics(&self, font_id: FontId) -> FontMetrics;

    /// Draw one text run; returns the horizontal advance in pixels.
    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        origin: Point,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>;
}

/// Built-in backend over the `embedded-graphics` ASCII mono fonts.
///
/// Sizes are bucketed; weights above the regular face map onto the bold
/// variant of the bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    const SIZE_SMALL: FontId = 0;
    const SIZE_MEDIUM: FontId = 1;
    const SIZE_LARGE: FontId = 2;
    const SIZE_XL: FontId = 3;

    const VARIANT_REGULAR: FontId = 0;
    const VARIANT_BOLD: FontId = 1;

    fn encode_font_id(size_bucket: FontId, variant: FontId) -> FontId {
        (size_bucket << 1) | (variant & 0x01)
    }

    fn decode_font_id(font_id: FontId) -> (FontId, FontId) {
        ((font_id >> 1) & 0x03, font_id & 0x01)
    }

    fn size_bucket_for(style: &TextStyle) -> FontId {
        if style.size_px >= 24.0 {
            Self::SIZE_XL
        } else if style.size_px >= 20.0 {
            Self::SIZE_LARGE
        } else if style.size_px >= 16.0 {
            Self::SIZE_MEDIUM
        } else {
            Self::SIZE_SMALL
        }
    }

    fn font_for(font_id: FontId) -> &'static MonoFont<'static> {
        let (size_bucket, variant) = Self::decode_font_id(font_id);
        match (size_bucket, variant) {
            (Self::SIZE_SMALL, Self::VARIANT_REGULAR) => &FONT_6X9,
            (Self::SIZE_SMALL, _) => &FONT_6X13_BOLD,
            (Self::SIZE_MEDIUM, Self::VARIANT_REGULAR) => &FONT_7X14,
            (Self::SIZE_MEDIUM, _) => &FONT_7X14_BOLD,
            (Self::SIZE_LARGE, Self::VARIANT_REGULAR) => &FONT_8X13,
            (Self::SIZE_LARGE, _) => &FONT_8X13_BOLD,
            (Self::SIZE_XL, Self::VARIANT_REGULAR) => &FONT_10X20,
            (Self::SIZE_XL, _) => &FONT_9X18_BOLD,
            _ => &FONT_8X13,
        }
    }

    fn style_for(font_id: FontId) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(Self::font_for(font_id), BinaryColor::On)
    }
}

impl FontBackend for MonoFontBackend {
    fn font_id_for(&self, style: &TextStyle) -> FontId {
        let variant = if style.bold {
            Self::VARIANT_BOLD
        } else {
            Self::VARIANT_REGULAR
        };
        Self::encode_font_id(Self::size_bucket_for(style), variant)
    }

    fn metrics(&self, font_id: FontId) -> FontMetrics {
        let font = Self::font_for(font_id);
        FontMetrics {
            char_width: font.character_size.width as i32,
            char_height: font.character_size.height as i32,
        }
    }

    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        origin: Point,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = Self::style_for(font_id);
        let normalized = normalize_text_for_mono(text);
        Text::with_baseline(normalized.as_ref(), origin, style, Baseline::Top).draw(display)?;
        Ok((normalized.chars().count() as i32) * (style.font.character_size.width as i32))
    }
}

/// Replace typographic characters the ASCII mono fonts cannot draw.
fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' | '\u{2013}' | '\u{2014}' | '\u{2018}' | '\u{2019}' | '\u{201C}'
                | '\u{201D}' | '\u{2026}'
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// [`TextMeasurer`] backed by the mono font metrics, so pagination and
/// rasterization agree exactly on line widths.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoTextMeasurer {
    backend: MonoFontBackend,
}

impl MonoTextMeasurer {
    /// Create a measurer over the built-in mono backend.
    pub fn new() -> Self {
        Self {
            backend: MonoFontBackend,
        }
    }
}

impl TextMeasurer for MonoTextMeasurer {
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32 {
        let font_id = self.backend.font_id_for(style);
        let metrics = self.backend.metrics(font_id);
        let chars = normalize_text_for_mono(text).chars().count();
        (chars as i32 * metrics.char_width) as f32
    }
}
