use chrono::NaiveDate;
use fndoc_core::config::ProjectSettings;
use fndoc_core::contract::{GenerationError, MockGenerator};
use fndoc_core::prompt::PromptBuilder;
use fndoc_core::report::{
    build_report, generate_report, read_module_docs, synthesize_requirements, table_of_contents,
    ModuleRequirements, Paragraph, ReportConfig, ReportError,
};
use std::fs;
use tempfile::tempdir;

fn project() -> ProjectSettings {
    ProjectSettings {
        name: "Inventory System".to_string(),
        company: "Acme".to_string(),
        ..ProjectSettings::default()
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

#[test]
fn test_toc_has_fixed_plus_module_entries_with_increasing_pages() {
    for count in [0usize, 1, 4] {
        let modules: Vec<String> = (0..count).map(|i| format!("module_{i}")).collect();
        let toc = table_of_contents(&modules);
        assert_eq!(toc.len(), 3 + count + 2);
        assert!(toc.windows(2).all(|w| w[0].page < w[1].page), "{toc:?}");
        assert_eq!(toc[0].page, 3);
    }

    let toc = table_of_contents(&["user_crud".to_string()]);
    assert_eq!(toc[3].label, "4. User Crud Module Requirements");
    assert_eq!(toc[3].page, 6);
    assert_eq!(toc[4].label, "5. Non-Functional Requirements");
    assert_eq!(toc[5].label, "6. Appendices");
}

#[test]
fn test_build_report_sections_follow_toc() {
    let modules = vec![
        ModuleRequirements {
            module: "orders".to_string(),
            text: "**Functional Requirements**\n\nThe system shall create orders.\n\nIt shall list them."
                .to_string(),
        },
        ModuleRequirements {
            module: "users".to_string(),
            text: "Users text.".to_string(),
        },
    ];
    let model = build_report(&project(), date(), "gemini-1.5-flash", &modules);

    assert_eq!(model.title_page.project_name, "Inventory System");
    assert_eq!(model.title_page.date, "March 05, 2024");
    assert!(model
        .title_page
        .metadata
        .contains(&("Company:".to_string(), "Acme".to_string())));

    let headings: Vec<&str> = model.sections.iter().map(|s| s.heading.as_str()).collect();
    let labels: Vec<&str> = model.toc_entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(headings, labels);
    assert_eq!(headings[3], "4. Orders Module Requirements");

    assert_eq!(
        model.sections[3].paragraphs,
        vec![
            Paragraph::Subheading("Functional Requirements".to_string()),
            Paragraph::Body("The system shall create orders.".to_string()),
            Paragraph::Body("It shall list them.".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_synthesize_isolates_failing_module() {
    let tmp = tempdir().unwrap();
    let mut docs = std::collections::BTreeMap::new();
    docs.insert("alpha".to_string(), "alpha docs".to_string());
    docs.insert("beta".to_string(), "beta docs".to_string());
    let builder = PromptBuilder::for_requirements(tmp.path().join("missing_template.txt"));

    let mut generator = MockGenerator::new();
    generator.expect_generate().times(2).returning(|prompt: &str| {
        if prompt.contains("alpha docs") {
            Err(GenerationError::EmptyResponse {
                reason: "SAFETY".to_string(),
            })
        } else {
            Ok("Beta requirements.".to_string())
        }
    });

    let (modules, failures) = synthesize_requirements(&docs, &builder, &generator).await;
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].module, "alpha");
    assert!(modules[0]
        .text
        .starts_with("Error generating content for this module:"));
    assert_eq!(modules[1].text, "Beta requirements.");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "alpha");
}

#[test]
fn test_read_module_docs_requires_markdown() {
    let tmp = tempdir().unwrap();
    assert!(matches!(
        read_module_docs(tmp.path()),
        Err(ReportError::NoInput { .. })
    ));

    fs::write(tmp.path().join("user_crud_doc.md"), "user docs").unwrap();
    let docs = read_module_docs(tmp.path()).unwrap();
    assert_eq!(docs.get("user_crud").map(String::as_str), Some("user docs"));
}

#[tokio::test]
async fn test_generate_report_writes_pdf() {
    let tmp = tempdir().unwrap();
    let docs_dir = tmp.path().join("crud_docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("users_doc.md"), "## Function: `create_user`\n\nCreates.").unwrap();
    let config = ReportConfig {
        docs_dir,
        output_file: tmp.path().join("SRS_Document.pdf"),
        template_path: tmp.path().join("srs_prompt_template.txt"),
        model_name: "gemini-1.5-flash".to_string(),
    };

    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .withf(|prompt: &str| prompt.contains("create_user"))
        .times(1)
        .returning(|_| Ok("**Overview**\n\nThe system shall create users.".to_string()));

    let outcome = generate_report(&config, &project(), date(), &generator)
        .await
        .unwrap();
    assert_eq!(outcome.modules, 1);
    assert!(outcome.failures.is_empty());
    let bytes = fs::read(&config.output_file).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_plain_and_doc_suffixed_files_are_separate_modules() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.md"), "hand written").unwrap();
    fs::write(tmp.path().join("a_doc.md"), "generated").unwrap();

    let docs = read_module_docs(tmp.path()).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs.get("a").map(String::as_str), Some("generated"));
    assert_eq!(docs.get("a.md").map(String::as_str), Some("hand written"));
}
