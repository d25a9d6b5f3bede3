//! End-to-end conversion over synthesized .docx fixtures.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use jhagen::classify::{Classification, Classifier, ClassifyError};
use jhagen::docx::read_document;
use jhagen::pipeline::{ConvertConfig, ConvertContext, Converter, NoopProgress};
use jhagen::{convert_mop, Config};

const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;

fn docx_bytes(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document {NS}><w:body>{body}</w:body></w:document>"#
    );
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    writer.start_file("word/styles.xml", options).unwrap();
    writer.write_all(STYLES.as_bytes()).unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn plain_row(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|t| format!("<w:tc><w:p><w:r><w:t>{t}</w:t></w:r></w:p></w:tc>"))
        .collect();
    format!("<w:tr>{cells}</w:tr>")
}

/// A MOP whose header sits in row 2 (index 1), column 1, with one styled
/// step.
fn mop_fixture() -> Vec<u8> {
    let styled_step = concat!(
        "<w:tr><w:tc><w:p><w:r><w:t>2</w:t></w:r></w:p></w:tc><w:tc><w:p>",
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Disconnect </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:highlight w:val="yellow"/></w:rPr><w:t>the main breaker.</w:t></w:r>"#,
        "</w:p></w:tc></w:tr>",
    );

    let rows = [
        plain_row(&["Project Alpha", "Rev 3"]),
        plain_row(&["No.", "DESCRIPTION OF WORK OPERATION"]),
        plain_row(&["1", "Contact the client."]),
        styled_step.to_string(),
        plain_row(&["3", "xx"]),
    ];
    docx_bytes(&format!("<w:tbl>{}</w:tbl>", rows.concat()))
}

fn template_fixture() -> Vec<u8> {
    let header = plain_row(&[
        "Sequence of Basic Job Steps",
        "Potential Hazards",
        "Recommended Controls",
    ]);
    let sample = concat!(
        "<w:tr><w:tc><w:p><w:r>",
        r#"<w:rPr><w:rFonts w:ascii="Arial"/><w:sz w:val="20"/></w:rPr>"#,
        "<w:t>sample step</w:t></w:r></w:p></w:tc>",
        "<w:tc><w:p><w:r><w:t>sample hazard</w:t></w:r></w:p></w:tc>",
        "<w:tc><w:p><w:r><w:t>sample control</w:t></w:r></w:p></w:tc></w:tr>",
    );
    // A preceding table that must stay untouched.
    let intro = format!("<w:tbl>{}</w:tbl>", plain_row(&["Project info"]));
    docx_bytes(&format!("{intro}<w:tbl>{header}{sample}</w:tbl>"))
}

fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("Template.docx");
    std::fs::write(&path, template_fixture()).unwrap();
    path
}

struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    fn classify(&self, step_text: &str) -> Result<Classification, ClassifyError> {
        if step_text.contains("breaker") {
            Ok(Classification {
                hazard: "Electrical Shock".to_string(),
                control: "LOTO & Verify Zero Energy".to_string(),
            })
        } else {
            Ok(Classification::administrative())
        }
    }
}

#[test]
fn converts_mop_into_populated_template() {
    let tmp = TempDir::new().unwrap();
    let template_path = write_template(tmp.path());

    let config = Arc::new(ConvertConfig {
        template_path,
        header_primary_token: "DESCRIPTION".to_string(),
        header_qualifier_token: "OPERATION".to_string(),
        noise_tokens: vec![],
        min_step_chars: 3,
    });
    let converter = Converter::new(config, Box::new(KeywordClassifier));

    let (result, ctx) = converter.run(ConvertContext::new(mop_fixture()), &NoopProgress);
    let outcome = result.unwrap();

    // Three data rows in the source, one rejected for length.
    assert_eq!(outcome.rows_built, 2);

    let output = read_document(ctx.output.as_ref().unwrap()).unwrap();
    assert_eq!(output.tables.len(), 2);

    // The intro table is untouched.
    assert_eq!(output.tables[0].rows[0].cells[0].text(), "Project info");

    // Header row preserved, old sample row gone, one row per step.
    let table = &output.tables[1];
    assert_eq!(table.rows.len(), 1 + 2);
    assert!(table.rows[0].cells[0].text().contains("Sequence"));

    let step1 = &table.rows[1];
    assert!(step1.cells[0].text().starts_with("Step 1:"));
    assert!(step1.cells[0].text().contains("Contact the client."));
    assert_eq!(step1.cells[1].text(), "N/A");
    assert_eq!(step1.cells[2].text(), "N/A");

    let step2 = &table.rows[2];
    assert!(step2.cells[0].text().contains("Disconnect the main breaker."));
    assert_eq!(step2.cells[1].text(), "Electrical Shock");
    assert_eq!(step2.cells[2].text(), "LOTO & Verify Zero Energy");

    // Source formatting survives; font family is cloned from the template.
    let runs = &step2.cells[0].paragraphs[0].runs;
    let disconnect = runs.iter().find(|r| r.text.contains("Disconnect")).unwrap();
    assert_eq!(disconnect.bold, Some(true));
    assert_eq!(disconnect.font_name.as_deref(), Some("Arial"));
    assert_eq!(disconnect.font_size_half_points, Some(20));
    let highlighted = runs.iter().find(|r| r.text.contains("main breaker")).unwrap();
    assert_eq!(highlighted.highlight.as_deref(), Some("yellow"));
    assert_eq!(highlighted.font_name.as_deref(), Some("Arial"));
}

#[test]
fn output_package_keeps_unrelated_entries() {
    let tmp = TempDir::new().unwrap();
    let template_path = write_template(tmp.path());

    let config = Arc::new(ConvertConfig {
        template_path,
        header_primary_token: "DESCRIPTION".to_string(),
        header_qualifier_token: "OPERATION".to_string(),
        noise_tokens: vec![],
        min_step_chars: 3,
    });
    let converter = Converter::new(config, Box::new(KeywordClassifier));
    let (result, ctx) = converter.run(ConvertContext::new(mop_fixture()), &NoopProgress);
    result.unwrap();

    let output = ctx.output.unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(&output[..])).unwrap();
    let mut styles = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("word/styles.xml").unwrap(),
        &mut styles,
    )
    .unwrap();
    assert_eq!(styles, STYLES);
}

#[test]
fn convert_mop_wires_credential_and_live_classifier() {
    let tmp = TempDir::new().unwrap();
    let template_path = write_template(tmp.path());

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Output: N/A | N/A" } }]
        }));
    });

    let config = Config {
        template_path: template_path.display().to_string(),
        api_base_url: server.base_url(),
        api_key: Some("test-key".to_string()),
        api_key_env_var: None,
        ..Config::default()
    };

    let output = convert_mop(mop_fixture(), &config, &NoopProgress).unwrap();

    // One call per retained step, strictly sequential.
    mock.assert_hits(2);

    let doc = read_document(&output).unwrap();
    assert_eq!(doc.tables[1].rows.len(), 3);
    assert_eq!(doc.tables[1].rows[1].cells[1].text(), "N/A");
}
