use fndoc_core::manual::{markdown_to_blocks, render_manual, ManualError};
use fndoc_core::pdf::{render_pdf, write_pdf, Block, PdfError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_render_pdf_produces_pdf_bytes() {
    let long = "word ".repeat(2000);
    let blocks = vec![
        Block::Title("Title".to_string()),
        Block::Table(vec![
            ("Label".to_string(), "Value".to_string()),
            ("Date:".to_string(), "March 05, 2024".to_string()),
        ]),
        Block::PageBreak,
        Block::Heading("Heading".to_string()),
        Block::Body(long),
        Block::Code("fn main() {}\n    indented".to_string()),
    ];
    let bytes = render_pdf("Test", &blocks).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1000);
}

#[test]
fn test_render_pdf_rejects_empty_input() {
    assert!(matches!(render_pdf("Empty", &[]), Err(PdfError::EmptyInput)));
}

#[test]
fn test_write_pdf_into_missing_directory_is_io_error() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("missing").join("out.pdf");
    let err = write_pdf(&out, "T", &[Block::Body("x".to_string())]).unwrap_err();
    assert!(matches!(err, PdfError::Io(_)));
    assert!(err.to_string().starts_with("PDF I/O error:"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_markdown_to_blocks_maps_structure() {
    let markdown = "# Documentation for a.py\n\n## Function: `f`\n\nDoes **bold** things, see [docs](http://x).\nSecond line.\n\n```python\ndef f():\n    pass\n```\n\n---\n";
    let blocks = markdown_to_blocks(markdown);
    assert_eq!(
        blocks,
        vec![
            Block::Heading("Documentation for a.py".to_string()),
            Block::Subheading("Function: f".to_string()),
            Block::Body("Does bold things, see docs.\nSecond line.".to_string()),
            Block::Code("def f():\n    pass".to_string()),
        ]
    );
}

#[test]
fn test_code_spans_keep_their_asterisks() {
    assert_eq!(
        markdown_to_blocks("Accepts `*args` and `**kwargs`.\n"),
        vec![Block::Body("Accepts *args and **kwargs.".to_string())]
    );
}

#[test]
fn test_lists_and_nested_headings() {
    let blocks = markdown_to_blocks("### Parameters\n\n- `user_id`: the id\n- **name**: display name\n");
    assert_eq!(
        blocks,
        vec![
            Block::Subheading("Parameters".to_string()),
            Block::Body("\u{2022} user_id: the id".to_string()),
            Block::Body("\u{2022} name: display name".to_string()),
        ]
    );
}

#[test]
fn test_render_manual_covers_every_markdown_file() {
    let tmp = tempdir().unwrap();
    let docs = tmp.path().join("crud_docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a_doc.md"), "# A\n\nAlpha.").unwrap();
    fs::write(docs.join("b_doc.md"), "# B\n\nBeta.").unwrap();
    let out = tmp.path().join("manual.pdf");

    let files = render_manual(&docs, &out).unwrap();
    assert_eq!(files, 2);
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF"));

    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    assert!(matches!(
        render_manual(&empty, &tmp.path().join("none.pdf")),
        Err(ManualError::NoInput { .. })
    ));
}
