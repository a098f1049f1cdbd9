use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::*;
use tower_lsp_server::{Client, LanguageServer, LspService, Server};

use crate::analyzer::Analyzer;
use crate::config::{self, SettingsEventKind};
use crate::service::{HoverInfo, LanguageService};
use crate::synthesis::Synthesizer;
use crate::uri::{path_to_uri, uri_to_path};

pub struct StitchLs {
    client: Client,
    service: Arc<LanguageService>,
}

impl std::fmt::Debug for StitchLs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StitchLs").finish_non_exhaustive()
    }
}

/// Params of the `stitch/syntheticText` request: the original document
/// whose synthesized module text the client wants to inspect.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticTextParams {
    pub uri: Uri,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticTextResult {
    pub uri: Uri,
    pub text: String,
}

impl StitchLs {
    pub fn new(
        client: Client,
        analyzer: Arc<dyn Analyzer>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            client,
            service: Arc::new(LanguageService::new(analyzer, synthesizer)),
        }
    }

    pub fn service(&self) -> &Arc<LanguageService> {
        &self.service
    }

    /// Debugging side channel: returns the synthetic text of the logical
    /// module the given document belongs to, or `None` for documents that
    /// form no analyzable module.
    pub async fn synthetic_text(
        &self,
        params: SyntheticTextParams,
    ) -> Result<Option<SyntheticTextResult>> {
        Ok(self
            .service
            .synthetic_text_for(&params.uri)
            .map(|(uri, text)| SyntheticTextResult { uri, text }))
    }

    async fn publish_for(&self, uri: &Uri) {
        let diagnostics = self.service.diagnostics(uri);
        let version = uri_to_path(uri)
            .ok()
            .and_then(|path| self.service.store().version_of(&path))
            .map(|v| v.min(i32::MAX as u64) as i32);
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, version)
            .await;
    }

    /// Publish for the edited document, and for its open companion: an edit
    /// to one half of a module changes what the other half sees.
    async fn refresh_diagnostics(&self, uri: &Uri) {
        self.publish_for(uri).await;

        let Ok(path) = uri_to_path(uri) else {
            return;
        };
        let companion = {
            let store = self.service.store();
            store.companion_of(&path).filter(|companion| {
                store
                    .get(companion)
                    .is_some_and(|file| file.is_open_in_editor())
            })
        };
        if let Some(companion) = companion
            && let Ok(companion_uri) = path_to_uri(&companion)
        {
            self.publish_for(&companion_uri).await;
        }
    }
}

impl LanguageServer for StitchLs {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let outcome = config::load_settings(params.initialization_options);
        for event in &outcome.events {
            let message_type = match event.kind {
                SettingsEventKind::Info => MessageType::INFO,
                SettingsEventKind::Warning => MessageType::WARNING,
            };
            self.client
                .log_message(message_type, event.message.clone())
                .await;
        }
        self.service.apply_settings(outcome.settings);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some(vec![
                        ".".to_string(),
                        "\"".to_string(),
                        "'".to_string(),
                        "<".to_string(),
                    ]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "stitch-ls initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.service.open_document(&uri, params.text_document.text);
        self.refresh_diagnostics(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().next_back() {
            self.service.update_document(&uri, change.text);
        }
        self.refresh_diagnostics(&uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.service.close_document(&uri);
        self.client
            .publish_diagnostics(uri.clone(), Vec::new(), None)
            .await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for change in params.changes {
            match change.typ {
                FileChangeType::DELETED => self.service.remove_document(&change.uri),
                _ => self.service.mark_document_stale(&change.uri),
            }
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self
            .service
            .hover(&uri, position)
            .map(|info| to_hover(info, &uri)))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        Ok(self
            .service
            .completions(&uri, position)
            .map(CompletionResponse::Array))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(self.service.resolve_completion(item))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let locations = self.service.definition(&uri, position);
        Ok((!locations.is_empty()).then_some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let locations = self.service.references(&uri, position);
        Ok((!locations.is_empty()).then_some(locations))
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        Ok(self
            .service
            .rename_prepare(&params.text_document.uri, params.position)
            .map(PrepareRenameResponse::Range))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        Ok(self.service.rename_apply(&uri, position, &params.new_name))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let actions = self.service.quick_fixes(
            &params.text_document.uri,
            params.range,
            &params.context.diagnostics,
        );
        Ok((!actions.is_empty()).then(|| {
            actions
                .into_iter()
                .map(CodeActionOrCommand::CodeAction)
                .collect()
        }))
    }
}

fn to_hover(info: HoverInfo, request_uri: &Uri) -> Hover {
    let mut value = format!("```typescript\n{}\n```", info.display);
    if let Some(documentation) = &info.documentation {
        value.push_str("\n\n");
        value.push_str(documentation);
    }
    // A quick-info span can resolve into the companion file; the protocol
    // range is only meaningful within the hovered document.
    let range = (info.location.uri == *request_uri).then_some(info.location.range);
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range,
    }
}

/// Run the server over stdio.
pub async fn serve(analyzer: Arc<dyn Analyzer>, synthesizer: Arc<dyn Synthesizer>) {
    let (service, socket) = LspService::build(move |client| {
        StitchLs::new(client, analyzer, synthesizer)
    })
    .custom_method("stitch/syntheticText", StitchLs::synthetic_text)
    .finish();
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
