//! End-to-end tests for generating projects from template trees.

use std::fs;
use std::path::Path;

use mockall::predicate::eq;
use mockall::{mock, Sequence};
use stencil_core::{CoreError, GenerateRequest, Generator, InputCollaborator, TemplateSource};
use stencil_settings::{find_config_file, ConfigStore, Document, SettingsStore, CONFIG_DIR};
use stencil_templates::{TemplateError, TemplateRenderer};
use tempfile::tempdir;

mock! {
    pub Input {}
    impl InputCollaborator for Input {
        fn offer(&mut self, name: &str, current: &str) -> std::io::Result<String>;
    }
}

/// An input collaborator that must never be asked.
fn silent_input() -> MockInput {
    let mut input = MockInput::new();
    input.expect_offer().never();
    input
}

/// Write a template with `.stencil/.stencil.json`, a `.git` folder and one
/// templated directory.
fn write_template(root: &Path, config: &str) {
    fs::create_dir_all(root.join(CONFIG_DIR)).unwrap();
    fs::write(root.join(CONFIG_DIR).join(".stencil.json"), config).unwrap();

    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git").join("HEAD"), "{{.Broken").unwrap();

    fs::create_dir_all(root.join("{{.Project}}")).unwrap();
    fs::write(
        root.join("{{.Project}}").join("README.md"),
        "Hello {{.Name}}",
    )
    .unwrap();
}

fn load(root: &Path) -> SettingsStore {
    SettingsStore::load(find_config_file(root).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_generation() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(template.path(), r#"{"Project": "demo", "Name": "Ada"}"#);

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    let mut input = silent_input();
    let request = GenerateRequest::new(template.path(), output.path()).prompt(false);

    let outcome = Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap();

    let readme = output.path().join("demo").join("README.md");
    assert_eq!(fs::read_to_string(&readme).unwrap(), "Hello Ada");
    assert_eq!(outcome.report.files, vec![readme]);
    assert!(!output.path().join(".git").exists());
    assert!(!output.path().join(CONFIG_DIR).exists());
}

#[test]
fn test_missing_field_aborts_after_directory() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(template.path(), r#"{"Project": "demo"}"#);

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    let mut input = silent_input();
    let request = GenerateRequest::new(template.path(), output.path()).prompt(false);

    let err = Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap_err();

    match &err {
        CoreError::ContentRender { path, source } => {
            assert!(path.ends_with("README.md"));
            assert!(matches!(source, TemplateError::Exec { .. }));
        }
        other => panic!("expected a content render error, got {other}"),
    }
    assert!(output.path().join("demo").is_dir());
    assert_eq!(fs::read_dir(output.path().join("demo")).unwrap().count(), 0);
}

#[test]
fn test_prompted_and_explicit_overrides() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(
        template.path(),
        r#"{"Project": "demo", "Name": "Ada"}"#,
    );

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    // Settings are offered in key order, after the explicit override.
    let mut input = MockInput::new();
    let mut seq = Sequence::new();
    input
        .expect_offer()
        .with(eq("Name"), eq("Ada"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("Grace".to_string()));
    input
        .expect_offer()
        .with(eq("Project"), eq("compiler"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(String::new()));
    let request = GenerateRequest::new(template.path(), output.path())
        .with_override("Project", "compiler");

    let outcome = Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap();

    assert_eq!(outcome.overridden.len(), 1);
    assert_eq!(store.lookup("Name"), Some(&Document::from("Grace")));
    assert_eq!(
        fs::read_to_string(output.path().join("compiler").join("README.md")).unwrap(),
        "Hello Grace"
    );
}

#[test]
fn test_closed_input_stops_before_materializing() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(template.path(), r#"{"Project": "demo", "Name": "Ada"}"#);

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    let mut input = MockInput::new();
    input.expect_offer().times(1).returning(|_, _| {
        Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed",
        ))
    });
    let request = GenerateRequest::new(template.path(), output.path());

    let err = Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap_err();
    assert!(matches!(err, CoreError::Input(_)));
    assert!(fs::read_dir(output.path()).unwrap().next().is_none());
}

#[test]
fn test_template_source_resolves_local_directory() {
    let template = tempdir().unwrap();
    write_template(template.path(), r#"{"Project": "demo", "Name": "Ada"}"#);

    let source = TemplateSource::resolve(&template.path().to_string_lossy()).unwrap();
    let store = load(source.root());
    assert_eq!(store.get_all_values().unwrap().len(), 2);
}

#[test]
fn test_binary_assets_are_copied_unchanged() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(template.path(), r#"{"Project": "demo", "Name": "Ada"}"#);
    let logo: [u8; 12] = [
        0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0x00, b'{', 0xfe,
    ];
    fs::write(template.path().join("{{.Project}}").join("logo.png"), logo).unwrap();

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    let mut input = silent_input();
    let request = GenerateRequest::new(template.path(), output.path()).prompt(false);

    Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap();

    let copied = fs::read(output.path().join("demo").join("logo.png")).unwrap();
    assert_eq!(copied, logo);
}

#[test]
fn test_declared_vars_are_offered_and_checked() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(
        template.path(),
        r#"{
            "metadata": {"name": "greeting"},
            "vars": {
                "prompt": {
                    "Name": {"type": "string", "description": "Who to greet", "required": true},
                    "Project": {"type": "select(string)", "options": ["demo", "tool"]}
                },
                "static": {"Generator": "stencil"}
            }
        }"#,
    );
    fs::write(
        template.path().join("{{.Project}}").join("NOTICE"),
        "made by {{.Generator}}",
    )
    .unwrap();

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    let mut input = MockInput::new();
    input
        .expect_offer()
        .with(eq("Name"), eq(""))
        .times(1)
        .returning(|_, _| Ok("Ada".to_string()));
    input
        .expect_offer()
        .with(eq("Project"), eq("demo"))
        .times(1)
        .returning(|_, _| Ok(String::new()));
    input
        .expect_offer()
        .with(eq("metadata.name"), eq("greeting"))
        .times(1)
        .returning(|_, _| Ok(String::new()));
    let request = GenerateRequest::new(template.path(), output.path());

    Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap();

    let project = output.path().join("demo");
    assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "Hello Ada");
    assert_eq!(fs::read_to_string(project.join("NOTICE")).unwrap(), "made by stencil");
}

#[test]
fn test_unanswered_required_var_stops_before_materializing() {
    let template = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_template(
        template.path(),
        r#"{"Project": "demo", "vars": {"prompt": {"Name": {"required": true}}}}"#,
    );

    let mut store = load(template.path());
    let renderer = TemplateRenderer::new();
    let mut input = silent_input();
    let request = GenerateRequest::new(template.path(), output.path()).prompt(false);

    let err = Generator::new(&mut store, &renderer, &mut input)
        .run(&request)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Settings(stencil_settings::SettingsError::Required { .. })
    ));
    assert!(fs::read_dir(output.path()).unwrap().next().is_none());
}
