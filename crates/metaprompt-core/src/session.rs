/// Per-session UI state.
///
/// Idle until the first successful generation; afterwards it holds the
/// current prompt text, which is overwritten by every new generation and
/// every manual edit. There is no history.
///
/// `generation` counts successful generations and `revision` counts edits
/// applied since the last one. Clients echo both back so that edits sent
/// out of order, or from a page showing an older generation, are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    result: Option<String>,
    /// Last text submitted for generation, kept so the input box can be
    /// re-rendered with it.
    last_input: String,
    generation: u64,
    revision: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn last_input(&self) -> &str {
        &self.last_input
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_last_input(&mut self, input: impl Into<String>) {
        self.last_input = input.into();
    }

    /// Store freshly generated text, replacing whatever was held. Starts a
    /// new generation, so edits addressed to the previous one no longer apply.
    pub fn store_generated(&mut self, text: impl Into<String>) {
        self.result = Some(text.into());
        self.generation += 1;
        self.revision = 0;
    }

    /// Overwrite the held result with user-edited text.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.result = Some(text.into());
        self.revision += 1;
    }

    /// Apply an edit only if it targets the current generation and is newer
    /// than the last applied revision. Returns whether it was applied.
    pub fn apply_edit(&mut self, text: impl Into<String>, generation: u64, revision: u64) -> bool {
        if generation != self.generation || revision <= self.revision {
            return false;
        }
        self.result = Some(text.into());
        self.revision = revision;
        true
    }
}
