use std::thread;

use inkleaf_eink::{Document, LayoutOptions, PixelFormat, RenderSurface, Size};

fn long_plain_text(words: usize) -> String {
    (0..words)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn concurrent_renders_of_distinct_pages_proceed_in_parallel() {
    let doc = Document::from_plain_text(&long_plain_text(1500))
        .with_page_size(Size::new(480, 800));
    let pages = doc.layout(LayoutOptions::default()).expect("layout");
    assert!(pages >= 2, "need at least two pages for this scenario");

    let buffers = thread::scope(|scope| {
        let first = scope.spawn(|| {
            let mut buf = vec![0u8; 480 * 800];
            let mut surface =
                RenderSurface::new(&mut buf, 480, 480, 800, PixelFormat::Gray8).expect("valid");
            doc.render_page(0, &mut surface).expect("render page 0");
            buf
        });
        let second = scope.spawn(|| {
            let mut buf = vec![0u8; 480 * 800];
            let mut surface =
                RenderSurface::new(&mut buf, 480, 480, 800, PixelFormat::Gray8).expect("valid");
            doc.render_page(1, &mut surface).expect("render page 1");
            buf
        });
        (first.join().expect("join"), second.join().expect("join"))
    });

    assert!(buffers.0.contains(&0x00));
    assert!(buffers.1.contains(&0x00));
    assert_ne!(buffers.0, buffers.1, "distinct pages draw distinct pixels");
}

#[test]
fn operations_on_distinct_documents_run_independently() {
    let docs: Vec<Document> = (0..4)
        .map(|i| {
            Document::from_plain_text(&long_plain_text(300 + i * 100))
                .with_page_size(Size::new(240, 320))
        })
        .collect();

    thread::scope(|scope| {
        for doc in &docs {
            scope.spawn(move || {
                let pages = doc.layout(LayoutOptions::default()).expect("layout");
                assert!(pages >= 1);
                let mut buf = vec![0u8; 240 * 320];
                let mut surface =
                    RenderSurface::new(&mut buf, 240, 240, 320, PixelFormat::Gray8)
                        .expect("valid");
                doc.render_page(0, &mut surface).expect("render");
                assert!(buf.contains(&0x00));
            });
        }
    });
}

#[test]
fn render_sees_old_or_new_table_never_a_partial_one() {
    let doc = Document::from_plain_text(&long_plain_text(2000))
        .with_page_size(Size::new(480, 800));
    doc.layout(LayoutOptions::default()).expect("initial layout");

    thread::scope(|scope| {
        let relayouts = scope.spawn(|| {
            for font_size in [14u32, 18, 22, 26] {
                doc.layout(LayoutOptions {
                    font_size,
                    ..LayoutOptions::default()
                })
                .expect("relayout");
            }
        });
        let reads = scope.spawn(|| {
            for _ in 0..64 {
                // Page zero exists in every table, so a consistent snapshot
                // always renders; a torn table would surface as a panic or
                // an out-of-bounds error here.
                let mut buf = vec![0u8; 480 * 800];
                let mut surface =
                    RenderSurface::new(&mut buf, 480, 480, 800, PixelFormat::Gray8)
                        .expect("valid");
                doc.render_page(0, &mut surface).expect("render during relayout");
            }
        });
        relayouts.join().expect("join relayouts");
        reads.join().expect("join reads");
    });
}
