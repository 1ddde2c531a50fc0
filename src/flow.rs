use core::ops::Range;

/// Semantic role of a flow block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockRole {
    /// Body paragraph text.
    Paragraph,
    /// Heading with level 1..=6.
    Heading(u8),
    /// List item text.
    ListItem,
}

impl BlockRole {
    /// Whether this role is a heading of any level.
    pub fn is_heading(self) -> bool {
        matches!(self, Self::Heading(_))
    }
}

/// One reflowable block of the content model.
///
/// Block text is whitespace-normalized at construction: words are separated
/// by exactly one ASCII space and carry no leading or trailing whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowBlock {
    role: BlockRole,
    text: String,
    first_word: usize,
    word_count: usize,
}

impl FlowBlock {
    /// Semantic role of the block.
    pub fn role(&self) -> BlockRole {
        self.role
    }

    /// Normalized block text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Global position of the block's first word.
    pub fn first_word(&self) -> usize {
        self.first_word
    }

    /// Number of words in the block.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Global word range covered by this block.
    pub fn word_range(&self) -> Range<usize> {
        self.first_word..self.first_word + self.word_count
    }

    /// Iterate the block's words in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ').filter(|word| !word.is_empty())
    }

    /// Contiguous text slice covering the block-local word range.
    ///
    /// Out-of-range positions clamp to the block's end; an empty or inverted
    /// range yields an empty slice.
    pub fn span_text(&self, local_range: Range<usize>) -> &str {
        if local_range.start >= local_range.end || local_range.start >= self.word_count {
            return "";
        }
        let end_word = local_range.end.min(self.word_count);

        let mut offset = 0usize;
        let mut start_byte = None;
        let mut end_byte = self.text.len();
        for (idx, word) in self.text.split(' ').enumerate() {
            if idx == local_range.start {
                start_byte = Some(offset);
            }
            if idx + 1 == end_word {
                end_byte = offset + word.len();
                break;
            }
            offset += word.len() + 1;
        }
        match start_byte {
            Some(start) => &self.text[start..end_byte],
            None => "",
        }
    }
}

/// Parsed, reflowable document content, independent of page boundaries.
///
/// Pagination identifies content by *flow position*: the index of a word in
/// the concatenation of all blocks' word streams. Positions are dense and
/// stable for the lifetime of the document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowDocument {
    blocks: Vec<FlowBlock>,
    word_count: usize,
}

impl FlowDocument {
    /// Build a document from raw `(role, text)` pairs.
    ///
    /// Text is whitespace-normalized; blocks that normalize to zero words
    /// are dropped so every surviving block spans at least one flow position.
    pub fn from_blocks<I, S>(blocks: I) -> Self
    where
        I: IntoIterator<Item = (BlockRole, S)>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        let mut next_word = 0usize;
        for (role, raw) in blocks {
            let mut text = String::with_capacity(raw.as_ref().len());
            let mut word_count = 0usize;
            for word in raw.as_ref().split_whitespace() {
                if word_count > 0 {
                    text.push(' ');
                }
                text.push_str(word);
                word_count += 1;
            }
            if word_count == 0 {
                continue;
            }
            out.push(FlowBlock {
                role,
                text,
                first_word: next_word,
                word_count,
            });
            next_word += word_count;
        }
        Self {
            blocks: out,
            word_count: next_word,
        }
    }

    /// Blocks in flow order.
    pub fn blocks(&self) -> &[FlowBlock] {
        &self.blocks
    }

    /// Total number of flow positions.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Whether the document has no flow content at all.
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Index of the block containing the global word position.
    pub fn block_containing(&self, word: usize) -> Option<usize> {
        if word >= self.word_count {
            return None;
        }
        match self
            .blocks
            .binary_search_by_key(&word, FlowBlock::first_word)
        {
            Ok(idx) => Some(idx),
            Err(insert) => Some(insert.saturating_sub(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockRole, FlowDocument};

    fn sample() -> FlowDocument {
        FlowDocument::from_blocks([
            (BlockRole::Heading(1), "Chapter  One"),
            (BlockRole::Paragraph, "  the quick   brown fox \n jumps "),
            (BlockRole::Paragraph, "   \t\n"),
            (BlockRole::ListItem, "last"),
        ])
    }

    #[test]
    fn normalizes_whitespace_and_drops_empty_blocks() {
        let doc = sample();
        assert_eq!(doc.blocks().len(), 3);
        assert_eq!(doc.blocks()[1].text(), "the quick brown fox jumps");
        assert_eq!(doc.word_count(), 2 + 5 + 1);
    }

    #[test]
    fn word_positions_are_dense_and_contiguous() {
        let doc = sample();
        let mut expected_start = 0usize;
        for block in doc.blocks() {
            assert_eq!(block.first_word(), expected_start);
            assert_eq!(block.words().count(), block.word_count());
            expected_start += block.word_count();
        }
        assert_eq!(expected_start, doc.word_count());
    }

    #[test]
    fn block_containing_maps_every_position() {
        let doc = sample();
        for word in 0..doc.word_count() {
            let idx = doc.block_containing(word).expect("position in range");
            assert!(doc.blocks()[idx].word_range().contains(&word));
        }
        assert_eq!(doc.block_containing(doc.word_count()), None);
    }

    #[test]
    fn span_text_slices_word_ranges() {
        let doc = sample();
        let body = &doc.blocks()[1];
        assert_eq!(body.span_text(0..2), "the quick");
        assert_eq!(body.span_text(2..5), "brown fox jumps");
        assert_eq!(body.span_text(4..5), "jumps");
        assert_eq!(body.span_text(3..3), "");
        assert_eq!(body.span_text(0..99), "the quick brown fox jumps");
        assert_eq!(body.span_text(99..100), "");
    }

    #[test]
    fn empty_document_reports_empty() {
        let doc = FlowDocument::from_blocks::<_, &str>([]);
        assert!(doc.is_empty());
        assert_eq!(doc.word_count(), 0);
        assert!(doc.blocks().is_empty());
    }
}
