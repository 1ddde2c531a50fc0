use inkleaf::{BlockRole, FlowDocument};

const CHAPTER: &[u8] = b"<?xml version=\"1.0\" encoding=\"utf-8\"?>
<html xmlns=\"http://www.w3.org/1999/xhtml\">
  <head>
    <title>Ignored Front Matter</title>
    <style>p { margin: 0; }</style>
  </head>
  <body>
    <h1>The Voyage</h1>
    <p>It was a <em>bright</em> cold day in April, and the clocks were
       striking thirteen.</p>
    <blockquote>Nothing was your own except the few cubic centimetres
       inside your skull.</blockquote>
    <h2>Departure</h2>
    <ul>
      <li>pack the &amp; sign</li>
      <li>mind the gap</li>
    </ul>
    <p>Final paragraph<br/>after a hard break.</p>
  </body>
</html>";

#[test]
fn chapter_markup_produces_a_stable_flow_stream() {
    let doc = FlowDocument::from_markup_bytes(CHAPTER).expect("parse chapter");

    let roles: Vec<BlockRole> = doc.blocks().iter().map(|b| b.role()).collect();
    assert_eq!(
        roles,
        vec![
            BlockRole::Heading(1),
            BlockRole::Paragraph,
            BlockRole::Paragraph,
            BlockRole::Heading(2),
            BlockRole::ListItem,
            BlockRole::ListItem,
            BlockRole::Paragraph,
            BlockRole::Paragraph,
        ]
    );

    assert_eq!(doc.blocks()[0].text(), "The Voyage");
    assert_eq!(
        doc.blocks()[1].text(),
        "It was a bright cold day in April, and the clocks were striking thirteen."
    );
    assert_eq!(doc.blocks()[4].text(), "pack the & sign");
    assert_eq!(doc.blocks()[6].text(), "Final paragraph");
    assert_eq!(doc.blocks()[7].text(), "after a hard break.");

    // Flow positions are dense: block ranges tile [0, word_count).
    let mut cursor = 0usize;
    for block in doc.blocks() {
        assert_eq!(block.word_range().start, cursor);
        cursor = block.word_range().end;
    }
    assert_eq!(cursor, doc.word_count());
}

#[test]
fn reparsing_identical_input_is_deterministic() {
    let a = FlowDocument::from_markup_bytes(CHAPTER).expect("parse");
    let b = FlowDocument::from_markup_bytes(CHAPTER).expect("parse");
    assert_eq!(a, b);
}

#[test]
fn plain_text_and_markup_agree_on_word_streams() {
    let markup = FlowDocument::from_markup_bytes(b"<p>one two</p><p>three</p>").expect("parse");
    let plain = FlowDocument::from_plain_text("one two\n\nthree");
    assert_eq!(markup.word_count(), plain.word_count());
    let collect = |doc: &FlowDocument| {
        doc.blocks()
            .iter()
            .flat_map(|b| b.words().map(str::to_owned).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };
    assert_eq!(collect(&markup), collect(&plain));
}
