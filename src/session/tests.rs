use super::*;
use crate::execution::Status;
use crate::transcript::LineKind;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

const C: u32 = 50;
const PYTHON: u32 = 71;

/// Replies with a fixed response and remembers what it was sent.
struct ScriptedSandbox {
    reply: ExecutionResponse,
    seen: Mutex<Vec<ExecutionRequest>>,
}

impl ScriptedSandbox {
    fn stdout(text: &str) -> Self {
        Self {
            reply: ExecutionResponse {
                stdout: Some(text.to_string()),
                time: Some("0.001".into()),
                memory: Some(900),
                status: Some(Status {
                    id: Status::ACCEPTED,
                    description: "Accepted".into(),
                }),
                ..Default::default()
            },
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Sandbox for ScriptedSandbox {
    async fn submit(
        &self,
        request: &ExecutionRequest,
        _cancel: &CancellationToken,
    ) -> Result<ExecutionResponse, ExecutionError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

/// Never answers on its own.
struct StalledSandbox;

#[async_trait]
impl Sandbox for StalledSandbox {
    async fn submit(
        &self,
        _request: &ExecutionRequest,
        _cancel: &CancellationToken,
    ) -> Result<ExecutionResponse, ExecutionError> {
        std::future::pending::<()>().await;
        Err(ExecutionError::Transport("unreachable".into()))
    }
}

fn texts(controller: &Controller, kind: LineKind) -> Vec<String> {
    controller
        .transcript()
        .lines()
        .iter()
        .filter(|l| l.kind == kind)
        .map(|l| l.text.clone())
        .collect()
}

#[test]
fn program_without_reads_runs_immediately() {
    let mut controller = Controller::new();
    let job = controller
        .run("int main(){ printf(\"hi\"); }", C)
        .expect("job");

    assert_eq!(controller.phase(), Phase::Running);
    assert_eq!(job.request.stdin, "");
    assert_eq!(job.request.language_id, C);
    assert!(job.prompts.is_empty());
    assert!(controller.session().is_none());
}

#[test]
fn unknown_language_runs_without_collection() {
    let mut controller = Controller::new();
    let job = controller.run("read x", 9999).expect("job");
    assert_eq!(job.request.language_id, 9999);
    assert_eq!(controller.phase(), Phase::Running);
}

#[tokio::test]
async fn scanf_sum_scenario() {
    let source = "int main(){ int a, b; scanf(\"%d %d\", &a, &b); printf(\"sum=%d\", a+b); }";
    let mut controller = Controller::new();

    assert!(controller.run(source, C).is_none());
    assert_eq!(controller.phase(), Phase::Collecting(0));
    assert_eq!(controller.placeholder().as_deref(), Some("a b"));

    let job = controller.submit_line("3 4").expect("job");
    assert_eq!(job.request.stdin, "3 4");
    assert_eq!(controller.phase(), Phase::Running);

    let sandbox = ScriptedSandbox::stdout("sum=7");
    let (run_id, outcome) = execute(&job, &sandbox).await;
    assert!(controller.finish(run_id, outcome));

    assert_eq!(controller.phase(), Phase::Done);
    assert_eq!(texts(&controller, LineKind::Input), vec!["3 4"]);
    assert_eq!(texts(&controller, LineKind::Output), vec!["sum=7"]);
    assert_eq!(
        texts(&controller, LineKind::Meta),
        vec!["Accepted | 0.001 s | 900 KB"]
    );
    assert_eq!(sandbox.seen.lock().unwrap()[0].stdin, "3 4");
}

#[tokio::test]
async fn prompts_show_during_collection_and_leave_stdout() {
    let source = "name = input(\"Name: \")\nprint(\"Age?\")\nage = int(input())\nprint(name, age)\n";
    let mut controller = Controller::new();

    assert!(controller.run(source, PYTHON).is_none());
    assert_eq!(texts(&controller, LineKind::Prompt), vec!["Name: "]);
    assert_eq!(controller.placeholder().as_deref(), Some("<text>"));

    assert!(controller.submit_line("alice").is_none());
    assert_eq!(controller.phase(), Phase::Collecting(1));
    assert_eq!(texts(&controller, LineKind::Prompt), vec!["Name: ", "Age?"]);
    assert_eq!(
        controller.pending_field().map(|f| f.kind),
        Some(crate::model::FieldType::Int)
    );

    let job = controller.submit_line("5\n").expect("job");
    assert_eq!(job.request.stdin, "alice\n5");
    assert_eq!(job.prompts, vec!["Name: ", "Age?"]);

    let sandbox = ScriptedSandbox::stdout("Name: Age?\nalice 5\n");
    let (run_id, outcome) = execute(&job, &sandbox).await;
    controller.finish(run_id, outcome);
    assert_eq!(texts(&controller, LineKind::Output), vec!["alice 5"]);
}

#[test]
fn whole_line_answer_keeps_spaces() {
    let mut controller = Controller::new();
    controller.run("line = input()\n", PYTHON);
    let job = controller.submit_line("  two words ").expect("job");
    assert_eq!(job.request.stdin, "  two words ");
}

#[test]
fn token_group_spans_lines_and_drops_extras() {
    let source = "int main(){ int a, b, c; scanf(\"%d %d %d\", &a, &b, &c); }";
    let mut controller = Controller::new();
    controller.run(source, C);

    assert!(controller.submit_line("1").is_none());
    assert_eq!(controller.placeholder().as_deref(), Some("b c"));
    assert!(controller.submit_line("").is_none());
    assert_eq!(controller.phase(), Phase::Collecting(0));

    let job = controller.submit_line("2 3 4 5").expect("job");
    assert_eq!(job.request.stdin, "1 2 3");
    assert_eq!(
        texts(&controller, LineKind::Notice),
        vec!["Ignored 2 extra values on this line"]
    );
}

#[test]
fn stop_while_collecting_cancels() {
    let mut controller = Controller::new();
    controller.run("x = input()\n", PYTHON);
    assert!(controller.stop());

    assert_eq!(controller.phase(), Phase::Cancelled);
    assert!(controller.session().is_none());
    assert!(controller.live_run().is_none());
    assert_eq!(texts(&controller, LineKind::Notice), vec![CANCELLED_NOTICE]);

    assert!(controller.submit_line("late").is_none());
    assert!(texts(&controller, LineKind::Input).is_empty());
    assert!(!controller.stop());
}

#[tokio::test]
async fn stop_while_running_cancels_the_request() {
    let mut controller = Controller::new();
    let job = controller.run("print(1)\n", PYTHON).expect("job");

    let pending = {
        let job = job.clone();
        tokio::spawn(async move { execute(&job, &StalledSandbox).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(controller.stop());
    assert!(job.cancel.is_cancelled());

    let (run_id, outcome) = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("execution returns once cancelled")
        .unwrap();
    assert!(matches!(outcome, Err(ExecutionError::Cancelled)));

    assert!(!controller.finish(run_id, outcome));
    assert_eq!(controller.phase(), Phase::Cancelled);
    assert_eq!(texts(&controller, LineKind::Notice), vec![CANCELLED_NOTICE]);
}

#[test]
fn new_run_cancels_the_live_one() {
    let mut controller = Controller::new();
    let first = controller.run("print(1)\n", PYTHON).expect("job");

    assert!(controller.run("x = input()\n", PYTHON).is_none());
    assert!(first.cancel.is_cancelled());
    assert_eq!(controller.phase(), Phase::Collecting(0));
    assert_eq!(texts(&controller, LineKind::Notice), vec![CANCELLED_NOTICE]);

    let stale = ExecutionResponse {
        stdout: Some("1".into()),
        ..Default::default()
    };
    assert!(!controller.finish(first.run_id, Ok(stale)));
    assert_eq!(controller.phase(), Phase::Collecting(0));
    assert!(texts(&controller, LineKind::Output).is_empty());
}

#[test]
fn finish_renders_errors() {
    let mut controller = Controller::new();
    let job = controller.run("int main(){}", C).expect("job");
    controller.finish(
        job.run_id,
        Err(ExecutionError::Http {
            status: 401,
            body: String::new(),
        }),
    );
    assert_eq!(controller.phase(), Phase::Done);
    assert_eq!(
        texts(&controller, LineKind::Error),
        vec!["Execution error: Authentication failed - check your API key"]
    );

    let job = controller.run("int main(){}", C).expect("job");
    let response = ExecutionResponse {
        stdout: Some("partial\n".into()),
        stderr: Some("Segmentation fault\n".into()),
        ..Default::default()
    };
    controller.finish(job.run_id, Ok(response));
    assert_eq!(texts(&controller, LineKind::Output), vec!["partial"]);
    assert_eq!(
        texts(&controller, LineKind::Error).last().map(String::as_str),
        Some("Segmentation fault")
    );
    assert_eq!(texts(&controller, LineKind::Meta).last().map(String::as_str), Some("Unknown"));
}

#[test]
fn compile_error_hides_output() {
    let mut controller = Controller::new();
    let job = controller.run("int main(){", C).expect("job");
    let response = ExecutionResponse {
        stdout: Some("never".into()),
        compile_output: Some("main.c:1:12: error: expected '}'\n".into()),
        ..Default::default()
    };
    controller.finish(job.run_id, Ok(response));
    assert!(texts(&controller, LineKind::Output).is_empty());
    assert_eq!(
        texts(&controller, LineKind::Error),
        vec!["main.c:1:12: error: expected '}'"]
    );
}

#[test]
fn empty_success_shows_placeholder() {
    let mut controller = Controller::new();
    let job = controller.run("pass\n", PYTHON).expect("job");
    controller.finish(job.run_id, Ok(ExecutionResponse::default()));
    assert_eq!(
        texts(&controller, LineKind::Output),
        vec![crate::execution::report::NO_OUTPUT]
    );
}

#[test]
fn session_offsets_follow_field_counts() {
    let groups = crate::detector::detect(
        "a, b = map(int, input().split())\nc = input()\nd, e, f = input().split()\n",
        PYTHON,
    );
    let session = Session::new("", PYTHON, groups);
    assert_eq!(session.offset(0), 0);
    assert_eq!(session.offset(1), 2);
    assert_eq!(session.offset(2), 3);
    assert_eq!(session.offset(3), 6);
    assert_eq!(session.offset(10), 6);
}

#[test]
fn mistyped_value_is_flagged_and_still_sent() {
    let source = "int main(){ int n; scanf(\"%d\", &n); }";
    let mut controller = Controller::new();
    controller.run(source, C);

    let job = controller.submit_line("abc").expect("job");
    assert_eq!(job.request.stdin, "abc");
    assert_eq!(
        texts(&controller, LineKind::Notice),
        vec!["`abc` does not look like <int>; sent as typed"]
    );
}

#[test]
fn literal_separators_in_format_are_announced() {
    let source = "int main(){ int a, b; scanf(\"%d,%d\", &a, &b); }";
    let mut controller = Controller::new();
    controller.run(source, C);
    assert_eq!(
        texts(&controller, LineKind::Notice),
        vec!["`%d,%d` expects `,` typed between the values; keep a space after it"]
    );

    let job = controller.submit_line("3, 4").expect("job");
    assert_eq!(job.request.stdin, "3, 4");
    assert_eq!(texts(&controller, LineKind::Notice).len(), 1);
}
