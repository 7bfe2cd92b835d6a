// Integration tests for the turn state machine, with every seam faked

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wren::api::{ChatReply, CompletionsApi, ModelEntry};
use wren::chat::{Conversation, Message, TurnController, TurnOutcome};
use wren::cli::Renderer;
use wren::command::{CommandRunner, Confirmer, Decision, ExecOutcome, ExecutionResult};

/// Serves a scripted sequence of replies, recording call counts and how
/// much history each request carried.
struct ScriptedApi {
    replies: Mutex<VecDeque<Result<ChatReply, String>>>,
    calls: AtomicUsize,
    sent_lens: Mutex<Vec<usize>>,
}

impl ScriptedApi {
    fn new(replies: Vec<Result<ChatReply, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            sent_lens: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn sent_lens(&self) -> Vec<usize> {
        self.sent_lens.lock().unwrap().clone()
    }
}

fn reply(content: &str, tokens: u64) -> Result<ChatReply, String> {
    Ok(ChatReply {
        content: content.to_string(),
        total_tokens: tokens,
    })
}

#[async_trait]
impl CompletionsApi for ScriptedApi {
    async fn chat(&self, _model: &str, messages: &[Message]) -> Result<ChatReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent_lens.lock().unwrap().push(messages.len());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");
        next.map_err(|e| anyhow::anyhow!(e))
    }

    async fn list_models(&self) -> Result<Vec<ModelEntry>> {
        Ok(Vec::new())
    }
}

/// What the scripted confirmer should answer with.
enum Script {
    Approve,
    Deny,
    Edit(&'static str),
}

struct ScriptedConfirmer {
    script: VecDeque<Script>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, command: &str) -> Result<Decision> {
        self.seen.lock().unwrap().push(command.to_string());
        Ok(match self.script.pop_front().expect("unexpected confirm") {
            Script::Approve => Decision::Run(command.to_string()),
            Script::Deny => Decision::Cancelled,
            Script::Edit(edited) => Decision::Run(edited.to_string()),
        })
    }
}

struct ScriptedRunner {
    results: Mutex<VecDeque<ExecutionResult>>,
    ran: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> Result<ExecutionResult> {
        self.ran.lock().unwrap().push(command.to_string());
        Ok(self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected run"))
    }
}

struct RecordingRenderer {
    rendered: Arc<Mutex<Vec<String>>>,
}

impl Renderer for RecordingRenderer {
    fn render(&self, text: &str) -> Result<()> {
        self.rendered.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn success(output: &str) -> ExecutionResult {
    ExecutionResult {
        output: output.to_string(),
        exit_code: 0,
        outcome: ExecOutcome::Succeeded,
    }
}

fn failure(output: &str, exit_code: i32) -> ExecutionResult {
    ExecutionResult {
        output: output.to_string(),
        exit_code,
        outcome: ExecOutcome::Failed,
    }
}

/// Everything a scenario needs to drive a turn and inspect what happened.
struct Harness {
    controller: TurnController,
    api: Arc<ScriptedApi>,
    confirmed: Arc<Mutex<Vec<String>>>,
    ran: Arc<Mutex<Vec<String>>>,
    rendered: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new(
        replies: Vec<Result<ChatReply, String>>,
        script: Vec<Script>,
        results: Vec<ExecutionResult>,
    ) -> Self {
        let api = ScriptedApi::new(replies);
        let confirmed = Arc::new(Mutex::new(Vec::new()));
        let ran = Arc::new(Mutex::new(Vec::new()));
        let rendered = Arc::new(Mutex::new(Vec::new()));

        let controller = TurnController::new(
            Conversation::new(Some("context".to_string())),
            "test-model",
            api.clone() as Arc<dyn CompletionsApi>,
            Box::new(ScriptedConfirmer {
                script: script.into(),
                seen: confirmed.clone(),
            }),
            Box::new(ScriptedRunner {
                results: Mutex::new(results.into()),
                ran: ran.clone(),
            }),
            Box::new(RecordingRenderer {
                rendered: rendered.clone(),
            }),
            false,
        );

        Self {
            controller,
            api,
            confirmed,
            ran,
            rendered,
        }
    }

    fn messages(&self) -> Vec<Message> {
        self.controller.conversation().messages().to_vec()
    }

    fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_plain_turn_stores_and_renders_reply() {
    let mut h = Harness::new(vec![reply("The answer is 42.", 10)], vec![], vec![]);

    let outcome = h.controller.run_turn("what is the answer?").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.api.calls(), 1);

    let messages = h.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].role, "user");
    assert_eq!(messages[1].content, "what is the answer?");
    assert_eq!(messages[2].role, "assistant");
    assert_eq!(messages[2].content, "The answer is 42.");

    assert_eq!(h.rendered(), vec!["The answer is 42.".to_string()]);
    assert!(h.ran().is_empty());
}

#[tokio::test]
async fn test_directive_turn_executes_and_follows_up() {
    let mut h = Harness::new(
        vec![
            reply("Let me check. [RUN:ls]", 5),
            reply("There are two files.", 7),
        ],
        vec![Script::Approve],
        vec![success("a.txt\nb.txt\n")],
    );

    let outcome = h.controller.run_turn("what files are here?").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.api.calls(), 2);
    assert_eq!(h.ran(), vec!["ls".to_string()]);
    assert_eq!(h.confirmed.lock().unwrap().clone(), vec!["ls".to_string()]);

    let messages = h.messages();
    assert_eq!(messages.len(), 5);
    // The directive reply joins history verbatim.
    assert_eq!(messages[2].role, "assistant");
    assert!(messages[2].content.contains("[RUN:ls]"));
    // The output goes back as a user-role message.
    assert_eq!(messages[3].role, "user");
    assert_eq!(messages[3].content, "Command output:\na.txt\nb.txt\n");
    assert_eq!(messages[4].content, "There are two files.");

    // Only the follow-up reply is rendered, never the directive reply.
    assert_eq!(h.rendered(), vec!["There are two files.".to_string()]);

    // First request carried [system, user]; second carried four messages.
    assert_eq!(h.api.sent_lens(), vec![2, 4]);
}

#[tokio::test]
async fn test_denied_command_rolls_the_turn_back() {
    let mut h = Harness::new(
        vec![reply("[RUN:rm -rf /tmp/scratch]", 3)],
        vec![Script::Deny],
        vec![],
    );

    let outcome = h.controller.run_turn("clean up").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Cancelled);
    assert_eq!(h.api.calls(), 1);
    assert!(h.ran().is_empty());
    assert!(h.rendered().is_empty());

    // History is exactly as before the turn: just the system prompt.
    let messages = h.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, "system");
}

#[tokio::test]
async fn test_deny_preserves_earlier_history() {
    let mut h = Harness::new(
        vec![
            reply("Sure thing.", 2),
            reply("[RUN:reboot]", 2),
        ],
        vec![Script::Deny],
        vec![],
    );

    h.controller.run_turn("hello").await.unwrap();
    let outcome = h.controller.run_turn("restart the box").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Cancelled);
    let messages = h.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].content, "Sure thing.");
}

#[tokio::test]
async fn test_failed_command_reports_failure_marker() {
    let mut h = Harness::new(
        vec![
            reply("[RUN:ls /nope]", 2),
            reply("That directory does not exist.", 4),
        ],
        vec![Script::Approve],
        vec![failure("ls: cannot access '/nope'\n", 2)],
    );

    let outcome = h.controller.run_turn("list /nope").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.api.calls(), 2);

    let messages = h.messages();
    // The model sees only the fixed marker, not the captured output.
    assert_eq!(messages[3].role, "user");
    assert_eq!(messages[3].content, "Command failed.");
    assert_eq!(h.rendered(), vec!["That directory does not exist.".to_string()]);
}

#[tokio::test]
async fn test_transport_error_keeps_user_message() {
    let mut h = Harness::new(vec![Err("connection refused".to_string())], vec![], vec![]);

    let outcome = h.controller.run_turn("hello?").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Failed);
    let messages = h.messages();
    // The question stays so the model sees it on the next attempt.
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, "user");
    assert!(h.rendered().is_empty());
}

#[tokio::test]
async fn test_follow_up_directives_are_inert() {
    let mut h = Harness::new(
        vec![
            reply("[RUN:date]", 1),
            reply("It is Saturday. [RUN:date] confirms it.", 2),
        ],
        vec![Script::Approve],
        vec![success("Sat Aug 23\n")],
    );

    let outcome = h.controller.run_turn("what day is it?").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    // The second directive triggers no confirm, no run, no third request.
    assert_eq!(h.api.calls(), 2);
    assert_eq!(h.ran().len(), 1);
    assert_eq!(h.confirmed.lock().unwrap().len(), 1);

    let messages = h.messages();
    let stored = &messages[4].content;
    assert!(!stored.contains("[RUN"), "follow-up must be stripped: {stored}");
    assert_eq!(stored, "It is Saturday.  confirms it.");
    assert_eq!(h.rendered().last().unwrap(), "It is Saturday.  confirms it.");
}

#[tokio::test]
async fn test_edited_command_runs_but_reply_stays_verbatim() {
    let mut h = Harness::new(
        vec![reply("[RUN:ls]", 1), reply("Done.", 1)],
        vec![Script::Edit("ls -la /tmp")],
        vec![success("total 0\n")],
    );

    h.controller.run_turn("show temp files").await.unwrap();

    assert_eq!(h.ran(), vec!["ls -la /tmp".to_string()]);
    // History keeps what the model actually said, not the edited command.
    let messages = h.messages();
    assert!(messages[2].content.contains("[RUN:ls]"));
    assert!(!messages[2].content.contains("ls -la"));
}

#[tokio::test]
async fn test_empty_reply_is_stored_without_rendering() {
    let mut h = Harness::new(vec![reply("", 0)], vec![], vec![]);

    let outcome = h.controller.run_turn("say nothing").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    let messages = h.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, "assistant");
    assert_eq!(messages[2].content, "");
    assert!(h.rendered().is_empty());
}

#[tokio::test]
async fn test_cancelled_execution_rolls_back_before_storing() {
    let mut h = Harness::new(
        vec![reply("[RUN:sleep 100]", 1)],
        vec![Script::Approve],
        vec![ExecutionResult::cancelled()],
    );

    let outcome = h.controller.run_turn("wait a bit").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Cancelled);
    // Neither the question nor the directive reply survives.
    assert_eq!(h.messages().len(), 1);
}

#[tokio::test]
async fn test_clear_history_reseeds_system_prompt() {
    let mut h = Harness::new(vec![reply("Hi.", 1)], vec![], vec![]);

    h.controller.run_turn("hello").await.unwrap();
    assert_eq!(h.messages().len(), 3);

    h.controller.clear_history();
    let messages = h.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[0].content, "context");
}

#[tokio::test]
async fn test_set_model_applies_to_next_request() {
    let mut h = Harness::new(vec![reply("ok", 1)], vec![], vec![]);

    assert_eq!(h.controller.model(), "test-model");
    h.controller.set_model("other-model");
    assert_eq!(h.controller.model(), "other-model");

    h.controller.run_turn("ping").await.unwrap();
    assert_eq!(h.api.calls(), 1);
}
