//! # Interactive session
//!
//! The `Controller` drives one run at a time through
//! `Idle → Detecting → (Collecting(i) ...) → Running → Done`, with `Stop`
//! (or a new Run) moving a live run to `Cancelled`.
//!
//! It never awaits anything itself. `run` and `submit_line` hand back a
//! [`Job`] once stdin is complete; the caller drives [`execute`] and passes
//! the outcome to [`Controller::finish`]. Every step leaves its trace in the
//! [`Transcript`].

mod state;

pub use state::{Accepted, Session};

use crate::detector;
use crate::execution::{ExecutionError, ExecutionRequest, ExecutionResponse, RunReport, Sandbox, Verdict};
use crate::model::Field;
use crate::transcript::{LineKind, Transcript};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub const CANCELLED_NOTICE: &str = "Execution cancelled by user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Detecting,
    /// Waiting for the values of group `i`.
    Collecting(usize),
    Running,
    Done,
    Cancelled,
}

impl Phase {
    pub fn is_live(&self) -> bool {
        matches!(self, Phase::Collecting(_) | Phase::Running)
    }
}

/// A ready-to-submit execution, tied to the run that produced it.
#[derive(Debug, Clone)]
pub struct Job {
    pub run_id: RunId,
    pub request: ExecutionRequest,
    /// Prompts already rendered during collection.
    pub prompts: Vec<String>,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct LiveRun {
    id: RunId,
    cancel: CancellationToken,
    prompts: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Controller {
    phase: Phase,
    session: Option<Session>,
    live: Option<LiveRun>,
    transcript: Transcript,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the run whose result `finish` would accept.
    pub fn live_run(&self) -> Option<RunId> {
        self.live.as_ref().map(|l| l.id)
    }

    /// Starts a run. Returns a job right away when the program reads nothing;
    /// otherwise the first group's prompt is shown and input is collected.
    #[instrument(skip(self, source), fields(source_len = source.len()))]
    pub fn run(&mut self, source: &str, language_id: u32) -> Option<Job> {
        if self.phase.is_live() {
            info!("new run replaces the live one");
            self.cancel_live();
        }

        self.phase = Phase::Detecting;
        let groups = detector::detect(source, language_id);
        let session = Session::new(source, language_id, groups);
        let live = LiveRun {
            id: RunId::new(),
            cancel: CancellationToken::new(),
            prompts: Vec::new(),
        };
        debug!(run_id = %live.id, groups = session.groups().len(), "detected input groups");
        self.live = Some(live);

        if session.groups().is_empty() {
            return Some(self.start(session));
        }

        self.session = Some(session);
        self.phase = Phase::Collecting(0);
        self.show_prompt();
        None
    }

    /// Consumes one line typed by the user. Returns the job when it filled
    /// the last group. Lines outside `Collecting` are ignored.
    #[instrument(skip(self, line))]
    pub fn submit_line(&mut self, line: &str) -> Option<Job> {
        let Phase::Collecting(_) = self.phase else {
            debug!(phase = ?self.phase, "input ignored outside collection");
            return None;
        };
        let line = line.trim_end_matches(['\r', '\n']);
        self.transcript.input(line);

        let session = self.session.as_mut()?;
        let accepted = session.accept(line);
        if let Some((value, kind)) = &accepted.mismatch {
            self.transcript.notice(format!(
                "`{}` does not look like {}; sent as typed",
                value,
                kind.placeholder()
            ));
        }
        if accepted.dropped > 0 {
            self.transcript.notice(format!(
                "Ignored {} extra value{} on this line",
                accepted.dropped,
                if accepted.dropped == 1 { "" } else { "s" }
            ));
        }
        if !accepted.group_complete {
            return None;
        }

        if session.advance() {
            self.phase = Phase::Collecting(session.current_index());
            self.show_prompt();
            return None;
        }

        let session = self.session.take()?;
        Some(self.start(session))
    }

    /// Cancels the live run, if any. Returns whether there was one.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> bool {
        if !self.phase.is_live() {
            return false;
        }
        self.cancel_live();
        true
    }

    /// Records the outcome of `run_id`. Outcomes of runs that are no longer
    /// live are dropped; returns whether this one was accepted.
    #[instrument(skip(self, outcome))]
    pub fn finish(&mut self, run_id: RunId, outcome: Result<ExecutionResponse, ExecutionError>) -> bool {
        let accepted = self.phase == Phase::Running && self.live_run() == Some(run_id);
        if !accepted {
            debug!(%run_id, "dropping stale result");
            return false;
        }
        let Some(live) = self.live.take() else {
            return false;
        };

        match outcome {
            Ok(response) => {
                let report = RunReport::from_response(&response, &live.prompts);
                self.render(&report);
                self.phase = Phase::Done;
            }
            Err(ExecutionError::Cancelled) => {
                self.transcript.notice(CANCELLED_NOTICE);
                self.phase = Phase::Cancelled;
            }
            Err(e) => {
                self.transcript.error(format!("Execution error: {}", e));
                self.phase = Phase::Done;
            }
        }
        true
    }

    /// The field the next typed value will fill.
    pub fn pending_field(&self) -> Option<&Field> {
        match self.phase {
            Phase::Collecting(_) => self.session.as_ref()?.pending_field(),
            _ => None,
        }
    }

    /// Input hint for the current group (`a b`, `<int> <int>`, `<text>`).
    pub fn placeholder(&self) -> Option<String> {
        match self.phase {
            Phase::Collecting(_) => self.session.as_ref()?.placeholder(),
            _ => None,
        }
    }

    fn start(&mut self, session: Session) -> Job {
        let stdin = session.compose();
        let prompts = session.prompts();
        let request = ExecutionRequest::new(session.source(), session.language_id(), stdin);

        self.phase = Phase::Running;
        let live = self.live.get_or_insert_with(|| LiveRun {
            id: RunId::new(),
            cancel: CancellationToken::new(),
            prompts: Vec::new(),
        });
        live.prompts = prompts.clone();
        info!(run_id = %live.id, stdin_len = request.stdin.len(), "run ready for execution");

        Job {
            run_id: live.id,
            request,
            prompts,
            cancel: live.cancel.clone(),
        }
    }

    fn cancel_live(&mut self) {
        if let Some(live) = self.live.take() {
            live.cancel.cancel();
            info!(run_id = %live.id, "run cancelled");
        }
        self.session = None;
        self.phase = Phase::Cancelled;
        self.transcript.notice(CANCELLED_NOTICE);
    }

    fn show_prompt(&mut self) {
        let Some(group) = self.session.as_ref().and_then(Session::current_group) else {
            return;
        };
        let prompt = group.prompt.clone();
        if let Some(literals) = group.format_literals() {
            let notice = format!(
                "`{}` expects `{}` typed between the values; keep a space after it",
                group.spec, literals
            );
            self.transcript.notice(notice);
        }
        if let Some(prompt) = prompt {
            self.transcript.prompt(prompt);
        }
    }

    fn render(&mut self, report: &RunReport) {
        match &report.verdict {
            Verdict::CompilationError { output } => {
                self.push_lines(output, LineKind::Error);
            }
            Verdict::RuntimeError { stdout, error } => {
                self.push_lines(stdout, LineKind::Output);
                self.push_lines(error, LineKind::Error);
            }
            Verdict::Success { .. } => {
                self.push_lines(report.display_text(), LineKind::Output);
            }
        }
        self.transcript.meta(report.metadata());
    }

    fn push_lines(&mut self, text: &str, kind: LineKind) {
        for line in text.lines() {
            self.transcript.push(kind, line);
        }
    }
}

/// Submits `job` to `sandbox`, racing it against the job's cancellation.
pub async fn execute(job: &Job, sandbox: &dyn Sandbox) -> (RunId, Result<ExecutionResponse, ExecutionError>) {
    let outcome = tokio::select! {
        biased;
        _ = job.cancel.cancelled() => Err(ExecutionError::Cancelled),
        result = sandbox.submit(&job.request, &job.cancel) => result,
    };
    (job.run_id, outcome)
}

#[cfg(test)]
mod tests;
