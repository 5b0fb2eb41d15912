//! Translation orchestration over the batch input list.
//!
//! # Design
//! - Single and batch calls track their status independently; the combined
//!   view ORs them with the single call checked first.
//! - Every `translate` invocation takes a ticket from one monotonically
//!   increasing sequence. Only the most recently invoked call may write the
//!   result list, and only the latest call of a kind may settle that kind's
//!   status. Older responses are dropped when they land.
//! - Precondition failures (no credential, invalid options) never reach the
//!   network and do not invalidate the translations cache entry.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lingo_api_models::{
    BatchTranslateRequest, BatchTranslateResponse, MAX_LENGTH_RANGE, MAX_TEXT_CHARS,
    TranslateRequest, TranslateResponse, max_length_in_range,
};

use crate::core::batch::{BatchInputManager, TranslationResult};
use crate::core::cache::TRANSLATIONS_KEY;
use crate::core::config::ClientConfig;
use crate::core::context::SessionContext;
use crate::core::error::RequestError;
use crate::core::status::{CombinedStatus, RequestStatus};

/// Result entry shown when a translate call fails at the transport.
pub const TRANSLATION_FAILED_MESSAGE: &str = "Translation failed. Please try again.";

/// Result entry shown when translate is invoked without a credential.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Translation failed: no credential. Please sign in.";

const TRANSLATE_PATH: &str = "/translate";
const BATCH_TRANSLATE_PATH: &str = "/translate/batch";

/// Per-call options forwarded to the translate endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Maximum decoder output length.
    pub max_length: u32,
    /// Whether to request an attention visualization.
    pub viz: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            max_length: lingo_api_models::DEFAULT_MAX_LENGTH,
            viz: false,
        }
    }
}

impl TranslationOptions {
    /// Options seeded from the client configuration defaults.
    #[must_use]
    pub const fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_length: config.default_max_length,
            viz: config.default_viz,
        }
    }

    /// Check the options against the server's accepted bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Invalid`] when `max_length` is out of range.
    pub fn validate(&self) -> Result<(), RequestError> {
        if max_length_in_range(self.max_length) {
            return Ok(());
        }
        Err(RequestError::Invalid {
            field: "max_length",
            reason: format!(
                "max_length must be between {} and {}",
                MAX_LENGTH_RANGE.start(),
                MAX_LENGTH_RANGE.end()
            ),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CallKind {
    Single,
    Batch,
}

impl CallKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
        }
    }
}

/// Successful translate payload normalised across both call kinds.
struct Translated {
    translations: Vec<String>,
    viz_url: Option<String>,
}

/// Drives translate calls for one view's input list.
#[derive(Debug)]
pub struct TranslationOrchestrator {
    context: Rc<SessionContext>,
    inputs: RefCell<BatchInputManager>,
    options: Cell<TranslationOptions>,
    single: RefCell<RequestStatus<TranslateResponse>>,
    batch: RefCell<RequestStatus<BatchTranslateResponse>>,
    viz: RefCell<RequestStatus<String>>,
    last_viz_url: RefCell<Option<String>>,
    sequence: Cell<u64>,
    latest_single: Cell<u64>,
    latest_batch: Cell<u64>,
    latest_viz: Cell<u64>,
}

impl TranslationOrchestrator {
    /// Orchestrator with one empty input and options from the context config.
    #[must_use]
    pub fn new(context: Rc<SessionContext>) -> Self {
        let options = TranslationOptions::from_config(context.config());
        Self {
            context,
            inputs: RefCell::new(BatchInputManager::new()),
            options: Cell::new(options),
            single: RefCell::new(RequestStatus::Idle),
            batch: RefCell::new(RequestStatus::Idle),
            viz: RefCell::new(RequestStatus::Idle),
            last_viz_url: RefCell::new(None),
            sequence: Cell::new(0),
            latest_single: Cell::new(0),
            latest_batch: Cell::new(0),
            latest_viz: Cell::new(0),
        }
    }

    /// Snapshot of the input list and results.
    #[must_use]
    pub fn inputs(&self) -> BatchInputManager {
        self.inputs.borrow().clone()
    }

    /// Apply an edit to the input list and return its result.
    pub fn edit<R>(&self, apply: impl FnOnce(&mut BatchInputManager) -> R) -> R {
        apply(&mut self.inputs.borrow_mut())
    }

    /// Current results in display order.
    #[must_use]
    pub fn results(&self) -> Vec<TranslationResult> {
        self.inputs.borrow().results().to_vec()
    }

    /// Options applied to the next call.
    #[must_use]
    pub fn options(&self) -> TranslationOptions {
        self.options.get()
    }

    /// Replace the options applied to subsequent calls.
    pub fn set_options(&self, options: TranslationOptions) {
        self.options.set(options);
    }

    /// Translate the non-blank inputs according to the current mode.
    ///
    /// Does nothing when every input is blank. Outcomes are recorded in the
    /// result list and the per-kind status rather than returned.
    pub async fn translate(&self) {
        let (texts, batch_mode) = {
            let inputs = self.inputs.borrow();
            let texts: Vec<String> = inputs.non_empty_inputs().map(str::to_string).collect();
            (texts, inputs.is_batch_mode())
        };
        if texts.is_empty() {
            tracing::debug!("translate skipped: no non-empty inputs");
            return;
        }
        let kind = if batch_mode {
            CallKind::Batch
        } else {
            CallKind::Single
        };
        let ticket = self.issue_ticket(kind);
        let options = self.options.get();

        if let Err(err) = self.check_preconditions(&texts, kind, options) {
            tracing::warn!(kind = kind.label(), error = %err, "translate rejected before sending");
            self.fail(kind, ticket, err);
            return;
        }

        match kind {
            CallKind::Single => {
                let outcome = self.send_single(&texts[0], options).await;
                let normalised = outcome.as_ref().map(|response| Translated {
                    translations: vec![response.translation.clone()],
                    viz_url: response.viz_url.clone(),
                });
                self.complete(kind, ticket, normalised.map_err(Clone::clone));
                if self.latest_single.get() == ticket {
                    self.single.replace(outcome.into());
                }
            }
            CallKind::Batch => {
                let outcome = self.send_batch(texts, options).await;
                let normalised = outcome.as_ref().map(|response| Translated {
                    translations: response.translation.clone(),
                    viz_url: response.viz_url.clone(),
                });
                self.complete(kind, ticket, normalised.map_err(Clone::clone));
                if self.latest_batch.get() == ticket {
                    self.batch.replace(outcome.into());
                }
            }
        }
        self.context.cache().invalidate(TRANSLATIONS_KEY);
    }

    /// Fetch the rendered visualization behind a `viz_url`.
    ///
    /// The body is recorded in the visualization status; only the most
    /// recently requested fetch may settle it.
    pub async fn fetch_visualization(&self, url: &str) -> RequestStatus<String> {
        let ticket = self.latest_viz.get() + 1;
        self.latest_viz.set(ticket);
        self.viz.replace(RequestStatus::Pending);
        let status: RequestStatus<String> = self
            .context
            .api()
            .get_text(url)
            .await
            .map_err(RequestError::from)
            .into();
        if self.latest_viz.get() == ticket {
            self.viz.replace(status.clone());
        } else {
            tracing::debug!(%url, "discarding superseded visualization response");
        }
        status
    }

    /// Pending if either call kind is in flight; the single call's failure wins.
    #[must_use]
    pub fn status(&self) -> CombinedStatus {
        CombinedStatus::of(&*self.single.borrow(), &*self.batch.borrow())
    }

    /// Status of the latest single-text call.
    #[must_use]
    pub fn single_status(&self) -> RequestStatus<TranslateResponse> {
        self.single.borrow().clone()
    }

    /// Status of the latest batch call.
    #[must_use]
    pub fn batch_status(&self) -> RequestStatus<BatchTranslateResponse> {
        self.batch.borrow().clone()
    }

    /// Status of the latest visualization fetch.
    #[must_use]
    pub fn viz_status(&self) -> RequestStatus<String> {
        self.viz.borrow().clone()
    }

    /// Visualization link from the latest successful translate call.
    #[must_use]
    pub fn last_viz_url(&self) -> Option<String> {
        self.last_viz_url.borrow().clone()
    }

    /// Return every status to idle; inputs and results are kept.
    pub fn reset_status(&self) {
        self.single.borrow_mut().reset();
        self.batch.borrow_mut().reset();
        self.viz.borrow_mut().reset();
    }

    /// Discard inputs, results, and statuses, and fence off in-flight calls.
    ///
    /// Responses to calls issued before the reset are dropped when they land.
    pub fn reset(&self) {
        self.next_sequence();
        self.latest_single.set(self.sequence.get());
        self.latest_batch.set(self.sequence.get());
        self.latest_viz.set(self.latest_viz.get() + 1);
        self.inputs.replace(BatchInputManager::new());
        self.last_viz_url.replace(None);
        self.reset_status();
        tracing::debug!("translation state reset");
    }

    fn next_sequence(&self) -> u64 {
        let ticket = self.sequence.get() + 1;
        self.sequence.set(ticket);
        ticket
    }

    fn issue_ticket(&self, kind: CallKind) -> u64 {
        let ticket = self.next_sequence();
        match kind {
            CallKind::Single => {
                self.latest_single.set(ticket);
                self.single.replace(RequestStatus::Pending);
            }
            CallKind::Batch => {
                self.latest_batch.set(ticket);
                self.batch.replace(RequestStatus::Pending);
            }
        }
        ticket
    }

    fn check_preconditions(
        &self,
        texts: &[String],
        kind: CallKind,
        options: TranslationOptions,
    ) -> Result<(), RequestError> {
        if !self.context.tokens().has_credential() {
            return Err(RequestError::MissingCredential);
        }
        options.validate()?;
        // The batch endpoint bounds only the list, not each text.
        if kind == CallKind::Single && texts[0].chars().count() > MAX_TEXT_CHARS {
            return Err(RequestError::Invalid {
                field: "text",
                reason: format!("text exceeds {MAX_TEXT_CHARS} characters"),
            });
        }
        Ok(())
    }

    async fn send_single(
        &self,
        text: &str,
        options: TranslationOptions,
    ) -> Result<TranslateResponse, RequestError> {
        let request = TranslateRequest {
            text: text.to_string(),
            max_length: options.max_length,
            viz: options.viz,
        };
        Ok(self.context.api().post(TRANSLATE_PATH, &request).await?)
    }

    async fn send_batch(
        &self,
        texts: Vec<String>,
        options: TranslationOptions,
    ) -> Result<BatchTranslateResponse, RequestError> {
        let request = BatchTranslateRequest {
            texts,
            max_length: options.max_length,
            viz: options.viz,
        };
        let response: BatchTranslateResponse = self
            .context
            .api()
            .post(BATCH_TRANSLATE_PATH, &request)
            .await?;
        if response.translation.len() != request.texts.len() {
            tracing::warn!(
                sent = request.texts.len(),
                received = response.translation.len(),
                "batch translation count differs from request"
            );
        }
        Ok(response)
    }

    fn fail(&self, kind: CallKind, ticket: u64, err: RequestError) {
        if self.is_latest(ticket) {
            self.inputs.borrow_mut().fail_results(&failure_message(&err));
        }
        match kind {
            CallKind::Single if self.latest_single.get() == ticket => {
                self.single.replace(RequestStatus::Failed(err));
            }
            CallKind::Batch if self.latest_batch.get() == ticket => {
                self.batch.replace(RequestStatus::Failed(err));
            }
            CallKind::Single | CallKind::Batch => {}
        }
    }

    fn complete(&self, kind: CallKind, ticket: u64, outcome: Result<Translated, RequestError>) {
        if !self.is_latest(ticket) {
            tracing::debug!(kind = kind.label(), ticket, "discarding superseded translate response");
            return;
        }
        match outcome {
            Ok(translated) => {
                tracing::debug!(
                    kind = kind.label(),
                    items = translated.translations.len(),
                    "translate succeeded"
                );
                self.inputs.borrow_mut().replace_results(
                    translated
                        .translations
                        .into_iter()
                        .map(TranslationResult::Translated)
                        .collect(),
                );
                self.last_viz_url.replace(translated.viz_url);
            }
            Err(err) => {
                tracing::warn!(kind = kind.label(), error = %err, "translate failed");
                self.inputs.borrow_mut().fail_results(&failure_message(&err));
            }
        }
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.sequence.get() == ticket
    }
}

fn failure_message(err: &RequestError) -> String {
    match err {
        RequestError::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
        RequestError::Invalid { reason, .. } => reason.clone(),
        RequestError::Transport(_) => TRANSLATION_FAILED_MESSAGE.to_string(),
    }
}
