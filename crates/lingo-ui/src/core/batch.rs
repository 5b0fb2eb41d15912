//! Ordered translation inputs and their positional results.
//!
//! # Design
//! - `inputs[i]` pairs with `results[i]`; edits keep the two aligned by
//!   position, not by content.
//! - At least one input slot always exists.
//! - Leaving batch mode collapses both lists to their first element. The
//!   collapse is destructive; the discarded count is returned so a caller can
//!   warn about it.

/// Outcome shown at one result position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslationResult {
    /// Translated text returned by the server.
    Translated(String),
    /// Synthetic failure message.
    Failed(String),
}

impl TranslationResult {
    /// Text to display at this position.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) | Self::Failed(text) => text,
        }
    }

    /// Whether this entry reports a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Input list, result list, and batch-mode flag owned by one view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchInputManager {
    inputs: Vec<String>,
    results: Vec<TranslationResult>,
    batch_mode: bool,
}

impl Default for BatchInputManager {
    fn default() -> Self {
        Self {
            inputs: vec![String::new()],
            results: Vec::new(),
            batch_mode: false,
        }
    }
}

impl BatchInputManager {
    /// One empty input, no results, single mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current inputs in display order.
    #[must_use]
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Current results in display order.
    #[must_use]
    pub fn results(&self) -> &[TranslationResult] {
        &self.results
    }

    /// Whether batch mode is on.
    #[must_use]
    pub const fn is_batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Switch modes; turning batch mode off keeps only position 0.
    ///
    /// Returns the number of inputs discarded by the collapse.
    pub fn set_mode(&mut self, batch_mode: bool) -> usize {
        self.batch_mode = batch_mode;
        if batch_mode || self.inputs.len() <= 1 {
            return 0;
        }
        let discarded = self.inputs.len() - 1;
        self.inputs.truncate(1);
        self.results.truncate(1);
        tracing::debug!(discarded, "batch mode disabled; inputs collapsed");
        discarded
    }

    /// Append an empty input; ignored outside batch mode.
    pub fn add_input(&mut self) -> bool {
        if !self.batch_mode {
            return false;
        }
        self.inputs.push(String::new());
        true
    }

    /// Remove position `index` from inputs and results.
    ///
    /// Ignored when only one input remains or `index` is out of range.
    pub fn remove_input(&mut self, index: usize) -> bool {
        if self.inputs.len() <= 1 || index >= self.inputs.len() {
            return false;
        }
        self.inputs.remove(index);
        if index < self.results.len() {
            self.results.remove(index);
        }
        true
    }

    /// Replace the text at `index`; results are left untouched.
    pub fn update_input(&mut self, index: usize, text: impl Into<String>) -> bool {
        let Some(slot) = self.inputs.get_mut(index) else {
            return false;
        };
        *slot = text.into();
        true
    }

    /// Inputs that are not blank after trimming, in order.
    pub fn non_empty_inputs(&self) -> impl Iterator<Item = &str> + '_ {
        self.inputs
            .iter()
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Replace every result; entries beyond the input count are dropped.
    pub fn replace_results(&mut self, results: Vec<TranslationResult>) {
        self.results = results;
        self.results.truncate(self.inputs.len());
    }

    /// Replace every result with one failure entry.
    pub fn fail_results(&mut self, message: &str) {
        self.replace_results(vec![TranslationResult::Failed(message.to_string())]);
    }
}
