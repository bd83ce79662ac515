//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Covers: a guard stopping the chain in `before`, a command-style handler ending the handle
//! phase with Stop, a reply reaching every `after`, and hook ordering across handlers.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use dbot_core::{Chat, Handler, HandlerResponse, Message, User};
use handler_chain::HandlerChain;

fn create_test_message(content: &str) -> Message {
    Message {
        id: "test_message_id".to_string(),
        content: content.to_string(),
        user: User {
            id: 123,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}

type Log = Arc<Mutex<Vec<String>>>;

/// Records every hook; `handle` answers with `response`.
struct Recorder {
    name: &'static str,
    log: Log,
    admit: bool,
    response: HandlerResponse,
}

impl Recorder {
    fn new(name: &'static str, log: &Log, response: HandlerResponse) -> Arc<Self> {
        Arc::new(Self {
            name,
            log: log.clone(),
            admit: true,
            response,
        })
    }

    fn guard(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name,
            log: log.clone(),
            admit: false,
            response: HandlerResponse::Continue,
        })
    }

    fn push(&self, event: &str) {
        self.log.lock().unwrap().push(format!("{}_{}", event, self.name));
    }
}

#[async_trait::async_trait]
impl Handler for Recorder {
    async fn before(&self, _message: &Message) -> dbot_core::Result<bool> {
        self.push("before");
        Ok(self.admit)
    }

    async fn handle(&self, _message: &Message) -> dbot_core::Result<HandlerResponse> {
        self.push("handle");
        Ok(self.response.clone())
    }

    async fn after(&self, _message: &Message, response: &HandlerResponse) -> dbot_core::Result<()> {
        self.push(&format!("after({:?})", response));
        Ok(())
    }
}

/// **Test: A guard returning false in before stops everything; no handle, no after.**
#[tokio::test]
async fn test_guard_stops_chain() {
    let log = Log::default();
    let chain = HandlerChain::new()
        .add_handler(Recorder::guard("guard", &log))
        .add_handler(Recorder::new("chat", &log, HandlerResponse::Continue));

    let result = chain.handle(&create_test_message("hi")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(*log.lock().unwrap(), vec!["before_guard"]);
}

/// **Test: Stop from a command handler skips later handlers; after hooks still run in reverse.**
#[tokio::test]
async fn test_stop_skips_later_handlers() {
    let log = Log::default();
    let chain = HandlerChain::new()
        .add_handler(Recorder::new("command", &log, HandlerResponse::Stop))
        .add_handler(Recorder::new("chat", &log, HandlerResponse::Continue));

    let result = chain.handle(&create_test_message("/reset")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before_command",
            "before_chat",
            "handle_command",
            "after(Stop)_chat",
            "after(Stop)_command",
        ]
    );
}

/// **Test: A Reply ends the handle phase and is passed to every after hook.**
#[tokio::test]
async fn test_reply_reaches_after_hooks() {
    let log = Log::default();
    let reply = HandlerResponse::Reply("answer".to_string());
    let chain = HandlerChain::new()
        .add_handler(Recorder::new("command", &log, HandlerResponse::Continue))
        .add_handler(Recorder::new("chat", &log, reply.clone()));

    let result = chain.handle(&create_test_message("question")).await.unwrap();

    assert_eq!(result, reply);
    let log = log.lock().unwrap();
    assert_eq!(log[2..4], ["handle_command", "handle_chat"]);
    assert_eq!(
        log[4..],
        [
            "after(Reply(\"answer\"))_chat",
            "after(Reply(\"answer\"))_command"
        ]
    );
}

/// **Test: An empty chain answers Continue.**
#[tokio::test]
async fn test_empty_chain_continues() {
    let chain = HandlerChain::new();
    assert!(chain.is_empty());
    let result = chain.handle(&create_test_message("x")).await.unwrap();
    assert_eq!(result, HandlerResponse::Continue);
}
