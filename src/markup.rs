//! Loaders turning markup or plain text into a [`FlowDocument`].
//!
//! The markup path accepts the XHTML subset that survives render
//! preparation: block tags map to flow blocks, inline tags are transparent,
//! and `head`/`script`/`style` subtrees are skipped entirely.

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use smallvec::SmallVec;

use crate::error::FlowError;
use crate::flow::{BlockRole, FlowDocument};

fn role_from_tag(tag: &str) -> Option<BlockRole> {
    match tag {
        "p" | "div" | "blockquote" | "figcaption" | "dd" | "dt" => Some(BlockRole::Paragraph),
        "li" => Some(BlockRole::ListItem),
        "h1" => Some(BlockRole::Heading(1)),
        "h2" => Some(BlockRole::Heading(2)),
        "h3" => Some(BlockRole::Heading(3)),
        "h4" => Some(BlockRole::Heading(4)),
        "h5" => Some(BlockRole::Heading(5)),
        "h6" => Some(BlockRole::Heading(6)),
        _ => None,
    }
}

fn should_skip_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "head" | "noscript" | "svg")
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String, FlowError> {
    let decoded = reader.decoder().decode(raw).map_err(|err| FlowError::Markup {
        detail: format!("tag name decode failed: {:?}", err),
        byte_offset: reader.buffer_position(),
    })?;
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(local_name.to_ascii_lowercase())
}

/// Accumulates text for the innermost open block and flushes completed
/// blocks into the output list.
struct BlockBuilder {
    out: Vec<(BlockRole, String)>,
    text: String,
    role_stack: SmallVec<[BlockRole; 8]>,
}

impl BlockBuilder {
    fn new() -> Self {
        Self {
            out: Vec::with_capacity(16),
            text: String::with_capacity(256),
            role_stack: SmallVec::new(),
        }
    }

    fn current_role(&self) -> BlockRole {
        self.role_stack
            .last()
            .copied()
            .unwrap_or(BlockRole::Paragraph)
    }

    fn push_text(&mut self, text: &str) {
        if text.chars().all(char::is_whitespace) {
            if !self.text.is_empty() && !self.text.ends_with(' ') {
                self.text.push(' ');
            }
            return;
        }
        if !self.text.is_empty() && !self.text.ends_with(' ') && text.starts_with(char::is_whitespace)
        {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }

    fn flush(&mut self) {
        if self.text.chars().any(|ch| !ch.is_whitespace()) {
            let role = self.current_role();
            self.out.push((role, core::mem::take(&mut self.text)));
        } else {
            self.text.clear();
        }
    }

    fn open_block(&mut self, role: BlockRole) {
        self.flush();
        self.role_stack.push(role);
    }

    fn close_block(&mut self, role: BlockRole) {
        self.flush();
        if self.role_stack.last() == Some(&role) {
            self.role_stack.pop();
        }
    }
}

impl FlowDocument {
    /// Load a document from `path`.
    ///
    /// The content kind is sniffed: input whose first non-whitespace byte is
    /// `<` goes through the markup tokenizer, everything else is treated as
    /// plain text with blank-line paragraph breaks.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FlowError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FlowError::EmptyPath);
        }
        let bytes = fs::read(path)?;
        let doc = Self::from_bytes(&bytes)?;
        log::debug!(
            "opened {}: {} block(s), {} word(s)",
            path.display(),
            doc.blocks().len(),
            doc.word_count()
        );
        Ok(doc)
    }

    /// Build a document from raw bytes, sniffing markup vs plain text.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FlowError> {
        let looks_like_markup = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'<');
        if looks_like_markup {
            Self::from_markup_bytes(bytes)
        } else {
            Ok(Self::from_plain_text(&String::from_utf8_lossy(bytes)))
        }
    }

    /// Build a document from XHTML-subset markup.
    pub fn from_markup_bytes(bytes: &[u8]) -> Result<Self, FlowError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::with_capacity(64);
        let mut entity_buf = String::with_capacity(16);
        let mut builder = BlockBuilder::new();
        let mut skip_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let tag = decode_tag_name(&reader, e.name().as_ref())?;
                    if should_skip_tag(&tag) {
                        skip_depth += 1;
                        buf.clear();
                        continue;
                    }
                    if skip_depth > 0 {
                        buf.clear();
                        continue;
                    }
                    if let Some(role) = role_from_tag(&tag) {
                        builder.open_block(role);
                    }
                }
                Ok(Event::Empty(e)) => {
                    let tag = decode_tag_name(&reader, e.name().as_ref())?;
                    if skip_depth > 0 || should_skip_tag(&tag) {
                        buf.clear();
                        continue;
                    }
                    // A hard break splits the enclosing block at this point.
                    if tag == "br" {
                        builder.flush();
                    }
                }
                Ok(Event::End(e)) => {
                    let tag = decode_tag_name(&reader, e.name().as_ref())?;
                    if should_skip_tag(&tag) {
                        skip_depth = skip_depth.saturating_sub(1);
                        buf.clear();
                        continue;
                    }
                    if skip_depth > 0 {
                        buf.clear();
                        continue;
                    }
                    if let Some(role) = role_from_tag(&tag) {
                        builder.close_block(role);
                    }
                }
                Ok(Event::Text(e)) => {
                    if skip_depth > 0 {
                        buf.clear();
                        continue;
                    }
                    let text = e.decode().map_err(|err| FlowError::Markup {
                        detail: format!("text decode failed: {:?}", err),
                        byte_offset: reader.buffer_position(),
                    })?;
                    builder.push_text(text.as_ref());
                }
                Ok(Event::CData(e)) => {
                    if skip_depth > 0 {
                        buf.clear();
                        continue;
                    }
                    let text = reader.decoder().decode(&e).map_err(|err| FlowError::Markup {
                        detail: format!("cdata decode failed: {:?}", err),
                        byte_offset: reader.buffer_position(),
                    })?;
                    builder.push_text(text.as_ref());
                }
                Ok(Event::GeneralRef(e)) => {
                    if skip_depth > 0 {
                        buf.clear();
                        continue;
                    }
                    let entity_name = e.decode().map_err(|err| FlowError::Markup {
                        detail: format!("entity decode failed: {:?}", err),
                        byte_offset: reader.buffer_position(),
                    })?;
                    entity_buf.clear();
                    entity_buf.push('&');
                    entity_buf.push_str(entity_name.as_ref());
                    entity_buf.push(';');
                    let resolved =
                        quick_xml::escape::unescape(&entity_buf).map_err(|err| FlowError::Markup {
                            detail: format!("entity unescape failed: {:?}", err),
                            byte_offset: reader.buffer_position(),
                        })?;
                    builder.push_text(resolved.as_ref());
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(FlowError::Markup {
                        detail: format!("tokenizer error: {:?}", err),
                        byte_offset: reader.buffer_position(),
                    });
                }
            }
            buf.clear();
        }

        builder.flush();
        Ok(Self::from_blocks(builder.out))
    }

    /// Build a document from plain text with blank-line paragraph breaks.
    pub fn from_plain_text(text: &str) -> Self {
        let mut paragraphs: Vec<(BlockRole, String)> = Vec::with_capacity(16);
        let mut current = String::new();
        for line in text.lines() {
            if line.chars().all(char::is_whitespace) {
                if !current.is_empty() {
                    paragraphs.push((BlockRole::Paragraph, core::mem::take(&mut current)));
                }
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push((BlockRole::Paragraph, current));
        }
        Self::from_blocks(paragraphs)
    }
}
