//! Chat loop behaviour over a mocked assistant.

use std::sync::Arc;
use async_trait::async_trait;
use mockall::mock;
use tokio::io::BufReader;

use newsagent::{
    AgentError, Assistant, ChatReply, ChatSession, ChatTurn, FileThreadStore,
    MemoryThreadStore, ThreadStore,
};

mock! {
    pub Assistant {}

    #[async_trait]
    impl Assistant for Assistant {
        async fn ask(&self, transcript: &[ChatTurn], prompt: &str, max_steps: usize) -> Result<String, AgentError>;
    }
}

/// Replies with how many earlier turns it was shown; "break" fails.
fn counting_assistant() -> MockAssistant {
    let mut assistant = MockAssistant::new();
    assistant.expect_ask().returning(|transcript, prompt, _| {
        if prompt == "break" {
            return Err(AgentError::AgentFailed("LLM error: timeout".to_string()));
        }
        Ok(format!("seen {} turns", transcript.len()))
    });
    assistant
}

#[tokio::test]
async fn blank_and_quit_lines_never_reach_the_assistant() {
    let mut assistant = MockAssistant::new();
    assistant.expect_ask().never();
    let session = ChatSession::new(Arc::new(assistant), Arc::new(MemoryThreadStore::new()), "t", 5);

    assert_eq!(session.handle_line("   ").await, ChatReply::Ignore);
    assert_eq!(session.handle_line("Quit").await, ChatReply::Quit);
    assert_eq!(session.handle_line(" 終了 ").await, ChatReply::Quit);
}

#[tokio::test]
async fn transcript_grows_per_thread() {
    let store: Arc<dyn ThreadStore> = Arc::new(MemoryThreadStore::new());
    let assistant: Arc<dyn Assistant> = Arc::new(counting_assistant());

    let main = ChatSession::new(Arc::clone(&assistant), Arc::clone(&store), "main", 5);
    let other = ChatSession::new(Arc::clone(&assistant), Arc::clone(&store), "other", 5);

    assert_eq!(main.handle_line("hello").await, ChatReply::Answer("seen 0 turns".into()));
    assert_eq!(main.handle_line("again").await, ChatReply::Answer("seen 2 turns".into()));
    assert_eq!(other.handle_line("hi").await, ChatReply::Answer("seen 0 turns".into()));

    let turns = store.load("main").await.unwrap();
    assert_eq!(turns, vec![
        ChatTurn::user("hello"),
        ChatTurn::assistant("seen 0 turns"),
        ChatTurn::user("again"),
        ChatTurn::assistant("seen 2 turns"),
    ]);
}

#[tokio::test]
async fn failed_turn_is_reported_and_not_remembered() {
    let store = Arc::new(MemoryThreadStore::new());
    let session = ChatSession::new(Arc::new(counting_assistant()), store.clone(), "main", 5);

    match session.handle_line("break").await {
        ChatReply::Failed(msg) => assert!(msg.contains("timeout")),
        other => panic!("expected a failure, got {other:?}"),
    }
    assert!(store.load("main").await.unwrap().is_empty());
    assert_eq!(session.handle_line("ok?").await, ChatReply::Answer("seen 0 turns".into()));
}

#[tokio::test]
async fn run_loop_keeps_going_after_errors_and_stops_on_quit() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileThreadStore::new(dir.path()).unwrap());
    let session = ChatSession::new(Arc::new(counting_assistant()), store.clone(), "main_conversation", 5);

    let input = BufReader::new(&b"hello\n\nbreak\nagain\nexit\nnever read\n"[..]);
    let mut output = Vec::new();
    session.run(input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("AI: seen 0 turns"));
    assert!(text.contains("An error occurred: Agent failed: LLM error: timeout"));
    assert!(text.contains("AI: seen 2 turns"));
    assert!(text.trim_end().ends_with("Goodbye!"));

    // Persisted to disk under the thread id.
    assert!(dir.path().join("main_conversation.json").exists());
    assert_eq!(store.load("main_conversation").await.unwrap().len(), 4);
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let session = ChatSession::new(Arc::new(counting_assistant()), Arc::new(MemoryThreadStore::new()), "t", 5);
    let mut output = Vec::new();
    session.run(BufReader::new(&b"hello"[..]), &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("AI: seen 0 turns"));
    assert!(!text.contains("Goodbye!"));
}
