use fndoc_core::combine::{combine_markdown, write_combined, CombineError, PAGE_BREAK};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_segments_match_files_in_name_order() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("user_crud_doc.md"), "# Documentation for user_crud.py\n\nUsers.\n").unwrap();
    fs::write(dir.join("account_doc.md"), "  Accounts.  \n").unwrap();
    fs::write(dir.join("order_items_doc.md"), "Orders.").unwrap();
    fs::write(dir.join("readme.txt"), "not markdown").unwrap();

    let combined = combine_markdown(dir, "Project: Docs").unwrap();
    assert_eq!(
        combined.files,
        vec!["account_doc.md", "order_items_doc.md", "user_crud_doc.md"]
    );

    let segments: Vec<&str> = combined.markdown.split(PAGE_BREAK).collect();
    assert_eq!(segments.len(), 3);
    assert!(segments[0].starts_with("# Project: Docs\n\n"));
    assert!(segments[0].ends_with("# Account Doc\n\nAccounts."));
    assert!(segments[1].contains("# Order Items Doc\n\nOrders."));
    assert!(segments[2].contains("# User Crud Doc\n\n# Documentation for user_crud.py"));
    assert!(!combined.markdown.ends_with(PAGE_BREAK));
}

#[test]
fn test_single_file_has_no_page_break() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("only_doc.md"), "Body").unwrap();

    let combined = combine_markdown(tmp.path(), "T").unwrap();
    assert_eq!(combined.markdown, "# T\n\n\n\n# Only Doc\n\nBody");
}

#[test]
fn test_unreadable_file_becomes_error_block() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a_doc.md"), "Fine").unwrap();
    fs::write(tmp.path().join("b_doc.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
    fs::write(tmp.path().join("c_doc.md"), "Also fine").unwrap();

    let combined = combine_markdown(tmp.path(), "T").unwrap();
    assert_eq!(combined.files.len(), 3);
    assert_eq!(combined.failures.len(), 1);
    assert_eq!(combined.failures[0].0, "b_doc.md");
    assert!(combined.markdown.contains("## Error processing b_doc.md\n"));
    assert!(combined.markdown.contains("Also fine"));
    assert_eq!(combined.markdown.split(PAGE_BREAK).count(), 3);
}

#[test]
fn test_no_markdown_files_is_an_error() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.py"), "def f(): pass").unwrap();
    let err = combine_markdown(tmp.path(), "T").unwrap_err();
    assert!(matches!(err, CombineError::NoInput { .. }));
}

#[test]
fn test_write_combined_creates_output_file() {
    let tmp = tempdir().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("x_doc.md"), "X").unwrap();
    let out = tmp.path().join("combined.md");

    let combined = write_combined(&docs, &out, "Title").unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), combined.markdown);
}
