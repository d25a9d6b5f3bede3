use std::sync::Arc;

use tracing::{info_span, warn};

use crate::classify::{Classification, Classifier};
use crate::docx::{read_document, write_document};
use crate::extract::{locate_header, step_records};
use crate::template::{append_step_row, clear_data_rows, locate_target_table, reference_font};

use super::config::ConvertConfig;
use super::context::{ConvertContext, TemplateTarget};
use super::error::{ConvertError, ConvertWarning};
use super::progress::{ConvertPhase, ProgressEvent, ProgressReporter};

/// Summary of a finished conversion; the output bytes live in the context.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOutcome {
    pub rows_built: usize,
    pub warnings: usize,
}

pub struct Converter {
    config: Arc<ConvertConfig>,
    classifier: Box<dyn Classifier>,
}

impl Converter {
    pub fn new(config: Arc<ConvertConfig>, classifier: Box<dyn Classifier>) -> Self {
        Self { config, classifier }
    }

    /// Run the full conversion for one MOP document.
    /// Returns a (outcome, context) pair; `ctx.output` holds the document
    /// bytes on success.
    pub fn run(
        &self,
        mut ctx: ConvertContext,
        progress: &dyn ProgressReporter,
    ) -> (Result<ConvertOutcome, ConvertError>, ConvertContext) {
        let _convert_span = info_span!("convert").entered();

        let result = self.run_steps(&mut ctx, progress);
        match &result {
            Ok(outcome) => progress.report(ProgressEvent::Completed {
                rows: outcome.rows_built,
                warnings: outcome.warnings,
            }),
            Err(e) => progress.report(ProgressEvent::Failed {
                error: e.to_string(),
            }),
        }

        (result, ctx)
    }

    fn run_steps(
        &self,
        ctx: &mut ConvertContext,
        progress: &dyn ProgressReporter,
    ) -> Result<ConvertOutcome, ConvertError> {
        {
            let _step = info_span!("load_documents").entered();
            progress.report(ProgressEvent::Phase {
                phase: ConvertPhase::LoadingDocuments,
                message: "Loading MOP and template...".to_string(),
            });
            self.step_load_documents(ctx)?;
        }

        {
            let _step = info_span!("extract_steps").entered();
            progress.report(ProgressEvent::Phase {
                phase: ConvertPhase::ExtractingSteps,
                message: "Scanning MOP for work steps...".to_string(),
            });
            self.step_extract_steps(ctx)?;
        }

        {
            let _step = info_span!("locate_template").entered();
            progress.report(ProgressEvent::Phase {
                phase: ConvertPhase::LocatingTemplate,
                message: "Preparing JHA template...".to_string(),
            });
            self.step_locate_template(ctx)?;
        }

        {
            let _step = info_span!("classify_and_build").entered();
            progress.report(ProgressEvent::Phase {
                phase: ConvertPhase::Classifying,
                message: "Running safety analysis...".to_string(),
            });
            self.step_classify_and_build(ctx, progress);
        }

        {
            let _step = info_span!("serialize").entered();
            progress.report(ProgressEvent::Phase {
                phase: ConvertPhase::Serializing,
                message: "Writing final document...".to_string(),
            });
            self.step_serialize(ctx)?;
        }

        Ok(ConvertOutcome {
            rows_built: ctx.steps.len(),
            warnings: ctx.warnings.len(),
        })
    }

    fn step_load_documents(&self, ctx: &mut ConvertContext) -> Result<(), ConvertError> {
        let template_path = &self.config.template_path;
        if !template_path.exists() {
            return Err(ConvertError::TemplateMissing {
                path: template_path.clone(),
            });
        }

        let template_bytes =
            std::fs::read(template_path).map_err(|e| ConvertError::ReadTemplate {
                path: template_path.clone(),
                source: e,
            })?;

        ctx.mop = Some(read_document(&ctx.mop_bytes)?);
        ctx.template_doc = Some(read_document(&template_bytes)?);
        ctx.template_bytes = template_bytes;
        Ok(())
    }

    fn step_extract_steps(&self, ctx: &mut ConvertContext) -> Result<(), ConvertError> {
        let mop = ctx.mop.as_ref().expect("step 1 completed");

        let header = locate_header(
            &mop.tables,
            &self.config.header_primary_token,
            &self.config.header_qualifier_token,
        )
        .ok_or_else(|| ConvertError::HeaderNotFound {
            primary: self.config.header_primary_token.clone(),
            qualifier: self.config.header_qualifier_token.clone(),
        })?;

        ctx.steps = step_records(
            &mop.tables[header.table],
            &header,
            &self.config.header_primary_token,
            &self.config.noise_tokens,
            self.config.min_step_chars,
        )
        .collect();

        if ctx.steps.is_empty() {
            return Err(ConvertError::NoStepsFound);
        }
        Ok(())
    }

    fn step_locate_template(&self, ctx: &mut ConvertContext) -> Result<(), ConvertError> {
        let template_doc = ctx.template_doc.as_ref().expect("step 1 completed");

        let table_index =
            locate_target_table(template_doc).ok_or(ConvertError::TargetTableNotFound)?;

        let mut table = template_doc.tables[table_index].clone();
        let reference = reference_font(&table);
        clear_data_rows(&mut table);

        ctx.target = Some(TemplateTarget {
            bytes: std::mem::take(&mut ctx.template_bytes),
            table_index,
            table,
            reference,
        });
        Ok(())
    }

    fn step_classify_and_build(&self, ctx: &mut ConvertContext, progress: &dyn ProgressReporter) {
        let target = ctx.target.as_mut().expect("step 3 completed");
        let total = ctx.steps.len();

        for (i, step) in ctx.steps.iter().enumerate() {
            let index = i + 1;
            let classification = match self.classifier.classify(&step.plain_text) {
                Ok(classification) => classification,
                Err(e) => {
                    // One step's failure must not abort the batch.
                    warn!(step = index, "classification failed: {e}");
                    ctx.warnings.push(ConvertWarning::ClassificationFailed {
                        step: index,
                        error: e.to_string(),
                    });
                    Classification::manual_review()
                }
            };

            append_step_row(
                &mut target.table,
                step,
                &classification,
                index,
                &target.reference,
            );
            progress.report(ProgressEvent::StepClassified { index, total });
        }
    }

    fn step_serialize(&self, ctx: &mut ConvertContext) -> Result<(), ConvertError> {
        let target = ctx.target.as_ref().expect("step 3 completed");

        let output = write_document(&target.bytes, target.table_index, &target.table.rows[1..])?;
        ctx.output = Some(output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyError;
    use crate::docx::read_document;
    use crate::pipeline::progress::NoopProgress;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    fn docx_bytes(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document {NS}><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn row(cells: &[&str]) -> String {
        let cells: String = cells
            .iter()
            .map(|t| format!("<w:tc><w:p><w:r><w:t>{t}</w:t></w:r></w:p></w:tc>"))
            .collect();
        format!("<w:tr>{cells}</w:tr>")
    }

    fn mop_bytes(step_texts: &[&str]) -> Vec<u8> {
        let mut rows = vec![
            row(&["Preamble", "before the header"]),
            row(&["No.", "DESCRIPTION OF WORK OPERATION"]),
        ];
        for (i, text) in step_texts.iter().enumerate() {
            rows.push(row(&[&(i + 1).to_string(), text]));
        }
        docx_bytes(&format!("<w:tbl>{}</w:tbl>", rows.concat()))
    }

    fn template_bytes() -> Vec<u8> {
        let body = format!(
            "<w:tbl>{}{}</w:tbl>",
            row(&["Sequence of Basic Job Steps", "Potential Hazards", "Controls"]),
            row(&["sample", "old hazard", "old control"]),
        );
        docx_bytes(&body)
    }

    fn write_template(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("Template.docx");
        std::fs::write(&path, template_bytes()).unwrap();
        path
    }

    fn convert_config(template_path: &Path) -> Arc<ConvertConfig> {
        Arc::new(ConvertConfig {
            template_path: template_path.to_path_buf(),
            header_primary_token: "DESCRIPTION".to_string(),
            header_qualifier_token: "OPERATION".to_string(),
            noise_tokens: vec![],
            min_step_chars: 3,
        })
    }

    /// Classifies by keyword; deterministic and offline.
    struct FakeClassifier;

    impl Classifier for FakeClassifier {
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

    /// Fails on a marker word, succeeds otherwise.
    struct FlakyClassifier;

    impl Classifier for FlakyClassifier {
        fn classify(&self, step_text: &str) -> Result<Classification, ClassifyError> {
            if step_text.contains("breaker") {
                Err(ClassifyError::Api {
                    status: 500,
                    body: "upstream down".to_string(),
                })
            } else {
                Ok(Classification::administrative())
            }
        }
    }

    #[test]
    fn test_full_conversion_builds_one_row_per_retained_step() {
        let tmp = TempDir::new().unwrap();
        let template = write_template(tmp.path());
        let converter = Converter::new(convert_config(&template), Box::new(FakeClassifier));

        // Third row is rejected for length.
        let mop = mop_bytes(&["Contact the client.", "Disconnect the main breaker.", "xx"]);
        let (result, ctx) = converter.run(ConvertContext::new(mop), &NoopProgress);

        let outcome = result.unwrap();
        assert_eq!(outcome.rows_built, 2);
        assert_eq!(outcome.warnings, 0);

        let output = read_document(ctx.output.as_ref().unwrap()).unwrap();
        let table = &output.tables[0];
        assert_eq!(table.rows.len(), 3); // header + 2 steps
        assert!(table.rows[1].cells[0].text().contains("Step 1:"));
        assert_eq!(table.rows[1].cells[1].text(), "N/A");
        assert_eq!(table.rows[2].cells[1].text(), "Electrical Shock");
        assert_eq!(table.rows[2].cells[2].text(), "LOTO & Verify Zero Energy");
    }

    #[test]
    fn test_repeated_header_row_is_not_classified() {
        let tmp = TempDir::new().unwrap();
        let template = write_template(tmp.path());
        let converter = Converter::new(convert_config(&template), Box::new(FakeClassifier));

        let mop = mop_bytes(&["Contact the client.", "DESCRIPTION OF WORK OPERATION"]);
        let (result, ctx) = converter.run(ConvertContext::new(mop), &NoopProgress);

        assert_eq!(result.unwrap().rows_built, 1);
        let output = read_document(ctx.output.as_ref().unwrap()).unwrap();
        assert_eq!(output.tables[0].rows.len(), 2);
    }

    #[test]
    fn test_classification_failure_degrades_step_but_continues() {
        let tmp = TempDir::new().unwrap();
        let template = write_template(tmp.path());
        let converter = Converter::new(convert_config(&template), Box::new(FlakyClassifier));

        let mop = mop_bytes(&[
            "Contact the client.",
            "Disconnect the main breaker.",
            "Update the software tags.",
        ]);
        let (result, ctx) = converter.run(ConvertContext::new(mop), &NoopProgress);

        let outcome = result.unwrap();
        assert_eq!(outcome.rows_built, 3);
        assert_eq!(outcome.warnings, 1);
        assert!(matches!(
            ctx.warnings[0],
            ConvertWarning::ClassificationFailed { step: 2, .. }
        ));

        let output = read_document(ctx.output.as_ref().unwrap()).unwrap();
        let table = &output.tables[0];
        assert_eq!(table.rows[2].cells[1].text(), "Manual Review Required");
        assert_eq!(table.rows[2].cells[2].text(), "Manual Review Required");
        // The step after the failure still classified normally.
        assert_eq!(table.rows[3].cells[1].text(), "N/A");
    }

    #[test]
    fn test_missing_template_aborts_before_classification() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.docx");
        let converter = Converter::new(convert_config(&missing), Box::new(FakeClassifier));

        let (result, ctx) = converter.run(
            ConvertContext::new(mop_bytes(&["Contact the client."])),
            &NoopProgress,
        );

        assert!(matches!(result, Err(ConvertError::TemplateMissing { .. })));
        assert!(ctx.output.is_none());
    }

    #[test]
    fn test_header_not_found_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let template = write_template(tmp.path());
        let converter = Converter::new(convert_config(&template), Box::new(FakeClassifier));

        let mop = docx_bytes(&format!(
            "<w:tbl>{}</w:tbl>",
            row(&["No.", "Some unrelated column"])
        ));
        let (result, _ctx) = converter.run(ConvertContext::new(mop), &NoopProgress);

        assert!(matches!(result, Err(ConvertError::HeaderNotFound { .. })));
    }

    #[test]
    fn test_zero_retained_steps_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let template = write_template(tmp.path());
        let converter = Converter::new(convert_config(&template), Box::new(FakeClassifier));

        let (result, _ctx) =
            converter.run(ConvertContext::new(mop_bytes(&["xx"])), &NoopProgress);

        assert!(matches!(result, Err(ConvertError::NoStepsFound)));
    }

    #[test]
    fn test_template_without_target_table_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Template.docx");
        let body = format!("<w:tbl>{}</w:tbl>", row(&["Not the marker"]));
        std::fs::write(&path, docx_bytes(&body)).unwrap();

        let converter = Converter::new(convert_config(&path), Box::new(FakeClassifier));
        let (result, _ctx) = converter.run(
            ConvertContext::new(mop_bytes(&["Contact the client."])),
            &NoopProgress,
        );

        assert!(matches!(result, Err(ConvertError::TargetTableNotFound)));
    }
}
