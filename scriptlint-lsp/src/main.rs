//! Scriptlint LSP Server - real-time lint diagnostics for JavaScript.
//!
//! Provides IDE integration with:
//! - Live diagnostics on file open/change/save
//! - Severity markers for semicolon, undeclared, and unused findings
//!
//! Never panics; parse failures surface as a single document diagnostic.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use scriptlint_core::{diagnostic, line_col, Linter, Severity};

/// Scriptlint Language Server state.
struct ScriptlintLsp {
    client: Client,
    /// Latest known text per open document; lint runs against this,
    /// not the filesystem.
    documents: Arc<RwLock<HashMap<Url, String>>>,
}

impl ScriptlintLsp {
    fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Lint the cached text for `uri` and publish diagnostics.
    async fn run_analysis(&self, uri: Url) {
        let source = {
            let docs = self.documents.read().await;
            match docs.get(&uri) {
                Some(text) => text.clone(),
                None => return,
            }
        };

        let result = Linter::new().analyze_lenient(&source);
        let diagnostics = to_lsp_diagnostics(&source, &result.diagnostics);

        self.log_info(&format!(
            "Analysis complete: {} finding(s) in {}",
            diagnostics.len(),
            uri.path()
        ))
        .await;

        self.client
            .publish_diagnostics(uri, diagnostics, None)
            .await;
    }

    async fn log_info(&self, message: &str) {
        self.client.log_message(MessageType::INFO, message).await;
    }
}

/// Convert byte-offset findings into LSP positions. Inverted ranges are
/// filtered out before conversion.
fn to_lsp_diagnostics(
    source: &str,
    findings: &[scriptlint_core::Diagnostic],
) -> Vec<Diagnostic> {
    diagnostic::for_display(findings)
        .into_iter()
        .map(|d| {
            let (start_line, start_col) = line_col(source, d.start);
            let (end_line, end_col) = line_col(source, d.end);
            let severity = match d.severity {
                Severity::Error => DiagnosticSeverity::ERROR,
                Severity::Warning => DiagnosticSeverity::WARNING,
            };
            let message = if d.fix_hint.is_empty() {
                d.message
            } else {
                format!("{} ({})", d.message, d.fix_hint)
            };
            Diagnostic {
                range: Range {
                    // LSP positions are zero-based
                    start: Position {
                        line: (start_line - 1) as u32,
                        character: (start_col - 1) as u32,
                    },
                    end: Position {
                        line: (end_line - 1) as u32,
                        character: (end_col - 1) as u32,
                    },
                },
                severity: Some(severity),
                code: None,
                code_description: None,
                source: Some("scriptlint".to_string()),
                message,
                related_information: None,
                tags: None,
                data: None,
            }
        })
        .collect()
}

#[tower_lsp::async_trait]
impl LanguageServer for ScriptlintLsp {
    async fn initialize(&self, _params: InitializeParams) -> LspResult<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "scriptlint-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Scriptlint LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let mut docs = self.documents.write().await;
            docs.insert(uri.clone(), params.text_document.text);
        }
        self.run_analysis(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync: the last change carries the whole document
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.write().await;
            docs.insert(uri.clone(), change.text);
        }
        self.run_analysis(uri).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(text) = params.text {
            let mut docs = self.documents.write().await;
            docs.insert(uri.clone(), text);
        }
        self.run_analysis(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        {
            let mut docs = self.documents.write().await;
            docs.remove(&params.text_document.uri);
        }
        // Clear diagnostics for closed file
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook for graceful error handling
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] scriptlint-lsp internal error: {}", info);
    }));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(ScriptlintLsp::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_map_to_zero_based_positions() {
        let source = "let a = 1;\nconsole.log(b);";
        let findings = vec![scriptlint_core::Diagnostic::error(
            "Undeclared variable: 'b'",
            "declare the variable with `let`, `const`, or `var`",
            23,
            24,
        )];

        let lsp = to_lsp_diagnostics(source, &findings);
        assert_eq!(lsp.len(), 1);
        assert_eq!(lsp[0].range.start.line, 1);
        assert_eq!(lsp[0].range.start.character, 12);
        assert_eq!(lsp[0].severity, Some(DiagnosticSeverity::ERROR));
        assert!(lsp[0].message.contains("Undeclared variable"));
    }

    #[test]
    fn test_inverted_ranges_are_dropped() {
        let mut d = scriptlint_core::Diagnostic::warning("weird", "", 0, 0);
        d.start = 9;
        d.end = 3;
        assert!(to_lsp_diagnostics("let a = 1;", &[d]).is_empty());
    }
}
