use fndoc_core::combine::{combine_markdown, PAGE_BREAK};
use fndoc_core::contract::{GenerationError, MockGenerator};
use fndoc_core::document::{document_sources, DocumentConfig, DocumentError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config_in(root: &Path) -> DocumentConfig {
    let input_dir = root.join("crud");
    let template_path = root.join("prompt_template.txt");
    fs::create_dir_all(&input_dir).unwrap();
    fs::write(&template_path, "Document this function:\n{code}\n").unwrap();
    DocumentConfig {
        input_dir,
        output_dir: root.join("crud_docs"),
        template_path,
        extension: "py".to_string(),
    }
}

#[tokio::test]
async fn test_one_artifact_per_file_with_functions() {
    let tmp = tempdir().unwrap();
    let config = config_in(tmp.path());
    fs::write(config.input_dir.join("a.py"), "def f(x):\n    return x * 2\n").unwrap();
    fs::write(config.input_dir.join("b.py"), "VALUE = 3\n").unwrap();
    fs::write(config.input_dir.join("notes.txt"), "def ignored(): pass\n").unwrap();

    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .withf(|prompt: &str| prompt.contains("def f(x):") && prompt.starts_with("Document this function:"))
        .times(1)
        .returning(|_| Ok("Doubles its argument.".to_string()));

    let report = document_sources(&config, &generator).await.expect("run should succeed");
    assert_eq!(report.modules.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.files_seen(), 2);

    let artifact = config.output_dir.join("a_doc.md");
    assert_eq!(report.modules[0].artifact_path, artifact);
    let markdown = fs::read_to_string(&artifact).unwrap();
    assert!(markdown.starts_with("# Documentation for a.py\n\n"));
    assert_eq!(markdown.matches("## Function: ").count(), 1);
    assert!(markdown.contains("## Function: `f`\n\nDoubles its argument."));
    assert!(!config.output_dir.join("b_doc.md").exists());

    let combined = combine_markdown(&config.output_dir, "Project").unwrap();
    assert_eq!(combined.files, vec!["a_doc.md".to_string()]);
    assert!(!combined.markdown.contains(PAGE_BREAK));
    assert!(combined.markdown.contains("# A Doc"));
}

#[tokio::test]
async fn test_units_are_generated_in_extraction_order() {
    let tmp = tempdir().unwrap();
    let config = config_in(tmp.path());
    fs::write(
        config.input_dir.join("ops.py"),
        "def first():\n    pass\n\ndef second():\n    pass\n",
    )
    .unwrap();

    let mut generator = MockGenerator::new();
    generator.expect_generate().times(2).returning(|prompt: &str| {
        let name = if prompt.contains("def first") { "first" } else { "second" };
        Ok(format!("Docs for {name}."))
    });

    document_sources(&config, &generator).await.unwrap();
    let markdown = fs::read_to_string(config.output_dir.join("ops_doc.md")).unwrap();
    let first = markdown.find("## Function: `first`").unwrap();
    let second = markdown.find("## Function: `second`").unwrap();
    assert!(first < second);
    assert!(markdown.contains("Docs for second.\n\n---\n\n"));
}

#[tokio::test]
async fn test_generation_failure_is_isolated_to_its_file() {
    let tmp = tempdir().unwrap();
    let config = config_in(tmp.path());
    fs::write(config.input_dir.join("a.py"), "def f():\n    pass\n\ndef g():\n    pass\n").unwrap();
    fs::write(config.input_dir.join("b.py"), "def h():\n    pass\n").unwrap();
    fs::write(config.input_dir.join("c.py"), "def broken(:\n").unwrap();

    let mut generator = MockGenerator::new();
    generator.expect_generate().returning(|prompt: &str| {
        if prompt.contains("def g") {
            Err(GenerationError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        } else {
            Ok("Generated.".to_string())
        }
    });

    let report = document_sources(&config, &generator).await.unwrap();
    assert_eq!(report.modules.len(), 1);
    assert_eq!(report.modules[0].module_name, "b");
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].source_path.ends_with("a.py"));
    assert!(report.failures[0].error.contains("`g`"));
    assert!(report.failures[1].source_path.ends_with("c.py"));

    assert!(!config.output_dir.join("a_doc.md").exists(), "no partial artifact");
    assert!(config.output_dir.join("b_doc.md").exists());
}

#[tokio::test]
async fn test_empty_input_directory_is_fatal() {
    let tmp = tempdir().unwrap();
    let config = config_in(tmp.path());
    let generator = MockGenerator::new();

    let err = document_sources(&config, &generator).await.unwrap_err();
    assert!(matches!(err, DocumentError::NoInput { .. }));
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn test_missing_function_template_stops_before_any_generation() {
    let tmp = tempdir().unwrap();
    let mut config = config_in(tmp.path());
    config.template_path = tmp.path().join("nope.txt");
    fs::write(config.input_dir.join("a.py"), "def f():\n    pass\n").unwrap();
    let generator = MockGenerator::new();

    let err = document_sources(&config, &generator).await.unwrap_err();
    assert!(matches!(err, DocumentError::Prompt(_)));
    assert!(!config.output_dir.join("a_doc.md").exists());
}
