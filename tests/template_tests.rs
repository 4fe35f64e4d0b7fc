use coursereport::errors::AppError;
use coursereport::export::template::{
    Align, Content, ElementKind, FontWeight, RenderVars, Style, TemplateStore, interpolate, merge,
};
use std::env;
use std::fs;
use std::path::PathBuf;

fn template_dir(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push(format!("{name}_coursereport_templates"));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).expect("create template dir");
    dir
}

const CUSTOM: &str = r#"{
  "meta": { "id": "dedication", "title": "Dedicación (sede)" },
  "styles": { "big": { "font_size": 14 } },
  "pages": [
    { "elements": [
      { "type": "title", "content": { "text": "{{center_name}}" }, "style": "big" },
      { "type": "table", "columns": [ { "label": "Alumno", "field": "full_name", "weight": 1 } ] }
    ] }
  ]
}"#;

#[test]
fn builtin_templates_load_and_validate() {
    let store = TemplateStore::builtin_only();
    for id in ["dedication", "certification"] {
        let template = store.load(id).unwrap();
        assert_eq!(template.meta.id, id);
        assert!(!template.pages.is_empty());
    }
}

#[test]
fn unknown_template_id_is_fatal() {
    match TemplateStore::builtin_only().load("payroll") {
        Err(AppError::TemplateNotFound(id)) => assert_eq!(id, "payroll"),
        other => panic!("expected TemplateNotFound, got {other:?}"),
    }
}

#[test]
fn directory_templates_shadow_builtins() {
    let dir = template_dir("shadow");
    fs::write(dir.join("dedication.json"), CUSTOM).unwrap();

    let store = TemplateStore::new(dir.to_str().unwrap());
    let template = store.load("dedication").unwrap();
    assert_eq!(template.meta.title, "Dedicación (sede)");

    // not overridden: still the compiled-in one
    let cert = store.load("certification").unwrap();
    assert_eq!(cert.meta.title, "Certificado de asistencia");

    fs::write(dir.join("attendance.json"), CUSTOM.replace("\"dedication\"", "\"attendance\"")).unwrap();
    assert_eq!(
        store.available(),
        vec!["attendance", "certification", "dedication"]
    );
}

#[test]
fn malformed_template_files_are_errors() {
    let dir = template_dir("malformed");
    fs::write(dir.join("broken.json"), "{ \"meta\": ").unwrap();
    fs::write(
        dir.join("nostyle.json"),
        CUSTOM.replace("\"style\": \"big\"", "\"style\": \"missing\""),
    )
    .unwrap();
    fs::write(
        dir.join("noweight.json"),
        CUSTOM.replace("\"weight\": 1", "\"weight\": 0"),
    )
    .unwrap();
    fs::write(
        dir.join("nokind.json"),
        CUSTOM.replace("\"type\": \"title\"", "\"type\": \"chart\""),
    )
    .unwrap();

    let store = TemplateStore::new(dir.to_str().unwrap());
    for id in ["broken", "nostyle", "noweight", "nokind"] {
        assert!(
            matches!(store.load(id), Err(AppError::Template(_))),
            "{id} should fail to load"
        );
    }
}

#[test]
fn element_overrides_win_over_named_style() {
    let named = Style {
        font_size: Some(14.0),
        bold: Some(false),
        align: Some(Align::Right),
        ..Style::default()
    };
    let overrides = Style {
        font_size: Some(20.0),
        ..Style::default()
    };

    let style = merge(ElementKind::Title, &overrides, Some(&named));
    assert_eq!(style.font_size, 20.0);
    assert_eq!(style.weight, FontWeight::Regular);
    assert_eq!(style.align, Align::Right);
    // untouched fields keep the title defaults
    assert_eq!(style.space_after, ElementKind::Title.default_style().space_after);

    let plain = merge(ElementKind::Paragraph, &Style::default(), None);
    assert_eq!(plain, ElementKind::Paragraph.default_style());
}

#[test]
fn unknown_tokens_interpolate_to_empty() {
    let mut vars = RenderVars::new();
    vars.insert("center_name".into(), "Centro Norte".into());

    assert_eq!(
        interpolate("Centro: {{center_name}} ({{ missing }})", &vars),
        "Centro: Centro Norte ()"
    );
    assert_eq!(interpolate("sin variables", &vars), "sin variables");
    assert_eq!(Content::Bind("center_name".into()).resolve(&vars), "Centro Norte");
    assert_eq!(Content::Bind("nope".into()).resolve(&vars), "");
}
