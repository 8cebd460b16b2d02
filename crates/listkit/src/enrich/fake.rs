//! Scripted research page for session tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::EnrichError;
use super::page::ResearchPage;

#[derive(Default)]
struct FakeState {
    count_calls: usize,
    typed: String,
    focused: Option<usize>,
    submitted: Vec<String>,
    shown: Vec<String>,
    pending: Option<(usize, Vec<String>)>,
    failing: bool,
    closed: bool,
}

/// Simulates the keyword explorer: each submitted query replaces the result
/// table after `render_after_reads` reads, unless scripted otherwise.
pub(crate) struct FakePage {
    input_count: usize,
    inputs_ready_after: usize,
    render_after_reads: usize,
    blank_while_loading: bool,
    responses: HashMap<String, Vec<String>>,
    stale_queries: HashSet<String>,
    failing_queries: HashSet<String>,
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            input_count: 2,
            inputs_ready_after: 0,
            render_after_reads: 0,
            blank_while_loading: false,
            responses: HashMap::new(),
            stale_queries: HashSet::new(),
            failing_queries: HashSet::new(),
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn respond(mut self, query: &str, results: &[&str]) -> Self {
        self.responses.insert(
            query.to_string(),
            results.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    pub fn render_after_reads(mut self, reads: usize) -> Self {
        self.render_after_reads = reads;
        self
    }

    /// The result table reads empty until a submitted query renders.
    pub fn blank_while_loading(mut self) -> Self {
        self.blank_while_loading = true;
        self
    }

    pub fn with_inputs(mut self, count: usize) -> Self {
        self.input_count = count;
        self
    }

    /// Inputs only appear after this many `count_elements` calls.
    pub fn inputs_ready_after(mut self, calls: usize) -> Self {
        self.inputs_ready_after = calls;
        self
    }

    /// Submitting `query` leaves the previous results on screen.
    pub fn stale(mut self, query: &str) -> Self {
        self.stale_queries.insert(query.to_string());
        self
    }

    /// After submitting `query`, reading results fails.
    pub fn failing(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub async fn submit(&self, query: &str) {
        self.clear_and_focus("input", 1).await.unwrap();
        self.type_text(query).await.unwrap();
        self.press_enter().await.unwrap();
    }

    pub fn submitted(&self) -> Vec<String> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn focused(&self) -> Option<usize> {
        self.state.lock().unwrap().focused
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[async_trait]
impl ResearchPage for FakePage {
    async fn count_elements(&self, _selector: &str) -> Result<usize, EnrichError> {
        let mut state = self.state.lock().unwrap();
        state.count_calls += 1;
        if state.count_calls > self.inputs_ready_after {
            Ok(self.input_count)
        } else {
            Ok(0)
        }
    }

    async fn clear_and_focus(&self, _selector: &str, index: usize) -> Result<(), EnrichError> {
        if index >= self.input_count {
            return Err(EnrichError::Page(format!("no input at index {}", index)));
        }
        let mut state = self.state.lock().unwrap();
        state.typed.clear();
        state.focused = Some(index);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), EnrichError> {
        self.state.lock().unwrap().typed.push_str(text);
        Ok(())
    }

    async fn press_enter(&self) -> Result<(), EnrichError> {
        let mut state = self.state.lock().unwrap();
        let query = std::mem::take(&mut state.typed);
        state.failing = self.failing_queries.contains(&query);
        if !self.stale_queries.contains(&query) {
            let results = self.responses.get(&query).cloned().unwrap_or_default();
            state.pending = Some((self.render_after_reads, results));
        }
        state.submitted.push(query);
        Ok(())
    }

    async fn read_texts(&self, _selector: &str, limit: usize) -> Result<Vec<String>, EnrichError> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(EnrichError::Page("result table detached".to_string()));
        }
        match state.pending.take() {
            Some((0, results)) => state.shown = results,
            Some((n, results)) => {
                if self.blank_while_loading {
                    state.shown.clear();
                }
                state.pending = Some((n - 1, results));
            }
            None => {}
        }
        Ok(state.shown.iter().take(limit).cloned().collect())
    }

    async fn close(&self) -> Result<(), EnrichError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}
