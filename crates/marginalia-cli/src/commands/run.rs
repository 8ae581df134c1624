//! The run command: the documents-by-cases processing loop.

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use chrono::Local;
use marginalia_domain::traits::{CompletionClient, PageSource, Tokenizer};
use marginalia_domain::InsightRenderer;
use marginalia_extract::PdfSource;
use marginalia_llm::openai::DEFAULT_ENDPOINT;
use marginalia_llm::{EstimatingTokenizer, OpenAiClient};
use marginalia_pipeline::{
    CaseSet, Executor, PipelineConfig, PromptAssembler, RetryPolicy, Runner,
};
use marginalia_report::{HtmlRenderer, MarkdownRenderer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Execute the run command
pub async fn execute_run(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let documents = discover_documents(&args.documents)?;
    let cases = load_cases(&args.cases);

    let tokenizer: Option<Arc<dyn Tokenizer + Send + Sync>> =
        match EstimatingTokenizer::for_model(&args.model) {
            Some(t) => Some(Arc::new(t)),
            None => {
                warn!(
                    model = %args.model,
                    "no tokenizer for this model family, every document takes the full-document path"
                );
                None
            }
        };

    let output_root = if args.no_timestamp {
        args.output.clone()
    } else {
        args.output
            .join(Local::now().format("%y%m%d%H%M").to_string())
    };

    let endpoint = args.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
    let client = OpenAiClient::new(endpoint, &args.api_key, &args.model)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let runner = Runner::new(
        Executor::new(client, RetryPolicy::from_config(&config)),
        PromptAssembler::new(),
        config,
        tokenizer,
    );

    info!(
        documents = documents.len(),
        cases = cases.len(),
        model = %args.model,
        output = %output_root.display(),
        "starting run"
    );

    let summary = process_documents(
        &documents,
        &PdfSource::new(),
        &runner,
        &cases,
        &output_root,
        &args.model,
    )
    .await;

    info!(
        documents = documents.len(),
        documents_failed = summary.documents_failed,
        cases_failed = summary.cases_failed,
        "run complete"
    );
    Ok(())
}

/// Counts accumulated over one run
struct RunSummary {
    documents_failed: usize,
    cases_failed: usize,
}

/// Process every document against every case, isolating failures at the
/// document boundary: an unreadable document or an unwritable report is
/// logged and counted, and the remaining documents still run.
async fn process_documents<S, C>(
    documents: &[PathBuf],
    source: &S,
    runner: &Runner<C>,
    cases: &CaseSet,
    output_root: &Path,
    model: &str,
) -> RunSummary
where
    S: PageSource,
    S::Error: std::fmt::Display,
    C: CompletionClient + Send + Sync + 'static,
    C::Error: Send + 'static,
{
    let html = HtmlRenderer::new();
    let markdown = MarkdownRenderer::new();
    let mut summary = RunSummary {
        documents_failed: 0,
        cases_failed: 0,
    };

    'documents: for document in documents {
        // A document that cannot be read never stops the rest of the run.
        let pages = match source.pages(document) {
            Ok(pages) => pages,
            Err(e) => {
                error!(document = %document.display(), error = %e, "skipping unreadable document");
                summary.documents_failed += 1;
                continue;
            }
        };

        let base = file_base(document);
        let folder = output_root.join(model).join(&base);
        let run = runner.run_document(&pages, cases).await;
        summary.cases_failed += run.failed_cases();

        for outcome in &run.outcomes {
            let artifact_base = format!("{}_{}", outcome.case_name, base);

            // Partial records are still worth a report; the failure is
            // already logged by the runner.
            let case_text = cases
                .iter()
                .find(|c| c.name == outcome.case_name)
                .map(|c| c.text.as_str())
                .unwrap_or_default();
            let rendered = html
                .render(
                    &outcome.records,
                    &run.source_id,
                    case_text,
                    model,
                    &folder.join(format!("{}.html", artifact_base)),
                )
                .and_then(|_| {
                    markdown.render(
                        &outcome.records,
                        &run.source_id,
                        case_text,
                        model,
                        &folder.join(format!("{}.md", artifact_base)),
                    )
                });

            // An unwritable artifact fails this document, not the run.
            if let Err(e) = rendered {
                error!(document = %document.display(), error = %e, "skipping document with unwritable reports");
                summary.documents_failed += 1;
                continue 'documents;
            }
        }
    }

    summary
}

/// Load pipeline configuration, defaulting when no file is given
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            PipelineConfig::from_toml(&raw).map_err(CliError::Config)?
        }
        None => PipelineConfig::default(),
    };
    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

/// Load the case set, falling back to the built-in cases on any failure
fn load_cases(path: &Path) -> CaseSet {
    match fs::read_to_string(path) {
        Ok(raw) => match CaseSet::from_json(&raw) {
            Ok(cases) => cases,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "case file unusable, using built-in cases");
                CaseSet::builtin()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "case file unreadable, using built-in cases");
            CaseSet::builtin()
        }
    }
}

/// Find the PDF documents in a folder, in name order
fn discover_documents(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut documents: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    documents.sort();

    if documents.is_empty() {
        return Err(CliError::NoDocuments(folder.display().to_string()));
    }
    Ok(documents)
}

/// Artifact-safe base name for a document: file stem with spaces removed
fn file_base(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(' ', ""))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_domain::Page;
    use marginalia_llm::MockClient;
    use std::time::Duration;

    /// Page source that never touches the filesystem
    struct FakeSource;

    impl PageSource for FakeSource {
        type Error = std::io::Error;

        fn pages(&self, path: &Path) -> std::result::Result<Vec<Page>, Self::Error> {
            Ok(vec![Page::new(path.to_string_lossy(), 0, "some text")])
        }
    }

    fn fast_runner() -> Runner<MockClient> {
        let policy = RetryPolicy {
            max_attempts: 2,
            base: Duration::from_millis(1),
            floor: Duration::ZERO,
            cap: Duration::from_millis(2),
            cooldown: Duration::ZERO,
        };
        Runner::new(
            Executor::new(MockClient::new("{}"), policy),
            PromptAssembler::new(),
            PipelineConfig::default(),
            None,
        )
    }

    #[tokio::test]
    async fn test_render_failure_does_not_stop_remaining_documents() {
        let out = tempfile::tempdir().unwrap();
        let output_root = out.path().to_path_buf();
        // Block the first document's report folder with a plain file so
        // every render for it fails.
        fs::create_dir_all(output_root.join("model")).unwrap();
        fs::write(output_root.join("model/first"), b"in the way").unwrap();

        let cases = CaseSet::from_json(r#"{"only": "the question"}"#).unwrap();
        let documents = vec![PathBuf::from("first.pdf"), PathBuf::from("second.pdf")];

        let summary = process_documents(
            &documents,
            &FakeSource,
            &fast_runner(),
            &cases,
            &output_root,
            "model",
        )
        .await;

        assert_eq!(summary.documents_failed, 1);
        assert!(output_root.join("model/second/only_second.html").exists());
        assert!(output_root.join("model/second/only_second.md").exists());
        assert!(!output_root.join("model/first/only_first.html").exists());
    }

    #[test]
    fn test_file_base_strips_spaces() {
        assert_eq!(file_base(Path::new("/tmp/My Paper Final.pdf")), "MyPaperFinal");
        assert_eq!(file_base(Path::new("plain.pdf")), "plain");
    }

    #[test]
    fn test_discover_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let documents = discover_documents(dir.path()).unwrap();
        let names: Vec<String> = documents.iter().map(|p| file_base(p)).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_discover_documents_empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_documents(dir.path()),
            Err(CliError::NoDocuments(_))
        ));
    }

    #[test]
    fn test_load_cases_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_cases(&dir.path().join("nope.json"));
        assert_eq!(missing.len(), CaseSet::builtin().len());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert_eq!(load_cases(&bad).len(), CaseSet::builtin().len());
    }

    #[test]
    fn test_load_cases_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, r#"{"only": "one question"}"#).unwrap();

        let cases = load_cases(&path);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases.cases()[0].name, "only");
    }

    #[test]
    fn test_load_config_default_and_file() {
        assert!(load_config(None).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        fs::write(&path, PipelineConfig::default().to_toml().unwrap()).unwrap();
        assert!(load_config(Some(&path)).is_ok());

        fs::write(&path, "batch_token_ceiling = 0").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
