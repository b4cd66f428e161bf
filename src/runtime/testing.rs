//! Mock gateways and runtime-level tests
//!
//! These mocks enable testing the runtime without a hint service.

use crate::gateway::{ConversationRequest, GatewayError, HintGateway, HintRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Mock gateway that returns queued responses
#[derive(Default)]
pub struct MockGateway {
    hints: Mutex<VecDeque<Result<String, GatewayError>>>,
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    /// Record of all hint requests made
    pub hint_requests: Mutex<Vec<HintRequest>>,
    /// Record of all conversation requests made
    pub conversation_requests: Mutex<Vec<ConversationRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_hint(&self, result: Result<&str, GatewayError>) {
        self.hints
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
    }

    pub fn queue_reply(&self, result: Result<&str, GatewayError>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
    }

    pub fn recorded_hint_requests(&self) -> Vec<HintRequest> {
        self.hint_requests.lock().unwrap().clone()
    }

    pub fn recorded_conversation_requests(&self) -> Vec<ConversationRequest> {
        self.conversation_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HintGateway for MockGateway {
    async fn request_hint(&self, request: &HintRequest) -> Result<String, GatewayError> {
        self.hint_requests.lock().unwrap().push(request.clone());
        self.hints
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::transport("No mock hint queued")))
    }

    async fn send_conversation_message(
        &self,
        request: &ConversationRequest,
    ) -> Result<String, GatewayError> {
        self.conversation_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::transport("No mock reply queued")))
    }
}

// ============================================================================
// Gated Mock Gateway (for in-flight testing)
// ============================================================================

/// Mock gateway whose calls block until released
pub struct GatedGateway {
    pub inner: MockGateway,
    /// Number of calls that have started
    pub calls: AtomicUsize,
    /// Notified when a call starts (for test synchronization)
    pub request_started: Notify,
    release: Notify,
}

impl GatedGateway {
    pub fn new() -> Self {
        Self {
            inner: MockGateway::new(),
            calls: AtomicUsize::new(0),
            request_started: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Let one blocked call complete
    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn gate(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.request_started.notify_one();
        self.release.notified().await;
    }
}

#[async_trait]
impl HintGateway for GatedGateway {
    async fn request_hint(&self, request: &HintRequest) -> Result<String, GatewayError> {
        self.gate().await;
        self.inner.request_hint(request).await
    }

    async fn send_conversation_message(
        &self,
        request: &ConversationRequest,
    ) -> Result<String, GatewayError> {
        self.gate().await;
        self.inner.send_conversation_message(request).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{CoachHandle, IntentError, RenderEvent};
    use crate::state_machine::state::{Mode, Session};
    use crate::state_machine::{
        CoachState, Control, MessageType, ModeKind, Render, Sender, TransitionError,
    };
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    async fn wait_for(
        handle: &CoachHandle,
        predicate: impl FnMut(&CoachState) -> bool,
    ) -> CoachState {
        tokio::time::timeout(WAIT, handle.wait_for(predicate))
            .await
            .expect("timed out waiting for state")
            .expect("runtime stopped")
    }

    async fn conversing_on_two_sum(gateway: Arc<MockGateway>) -> CoachHandle {
        gateway.queue_hint(Ok("What do you need to remember as you scan?"));
        let (handle, _task) = CoachHandle::spawn(gateway);
        handle.submit_problem("Two Sum", "").await.unwrap();
        wait_for(&handle, |s| s.mode == Mode::Conversing).await;
        handle
    }

    fn rejected(err: TransitionError) -> Result<(), IntentError> {
        Err(IntentError::Rejected(err))
    }

    #[tokio::test]
    async fn test_no_op_guards_leave_state_unchanged() {
        let (handle, _task) = CoachHandle::spawn(MockGateway::new());

        assert_eq!(
            handle.submit_problem("", "").await,
            rejected(TransitionError::EmptyInput)
        );
        assert_eq!(
            handle.send_message("   ").await,
            rejected(TransitionError::EmptyInput)
        );
        assert_eq!(
            handle.request_another_hint().await,
            rejected(TransitionError::NoActiveProblem)
        );
        assert_eq!(
            handle.invoke_quick_action(MessageType::Analyze).await,
            rejected(TransitionError::NoActiveProblem)
        );
        assert_eq!(handle.snapshot(), CoachState::default());
    }

    #[tokio::test]
    async fn test_commit_branch() {
        let gateway = Arc::new(MockGateway::new());
        let handle = conversing_on_two_sum(gateway.clone()).await;

        let state = handle.snapshot();
        assert_eq!(state.mode, Mode::Conversing);
        assert_eq!(state.session.active_problem, "Two Sum");
        assert_eq!(state.session.history.len(), 1);
        assert_eq!(state.session.history[0].message_type, MessageType::Hint);

        let requests = gateway.recorded_hint_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].problem_name, "Two Sum");
    }

    #[tokio::test]
    async fn test_recognition_branch() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_hint(Ok(
            "I'm Not Familiar With That Problem. Could you please check the spelling?",
        ));
        let (handle, _task) = CoachHandle::spawn(gateway.clone());
        let mut renders = handle.subscribe();

        handle.submit_problem("Tow Summ", "").await.unwrap();
        // Wait for the response to be applied: the runtime publishes Idle again
        let mut seen_idle_after_request = false;
        let mut shown = Vec::new();
        while !seen_idle_after_request {
            match tokio::time::timeout(WAIT, renders.recv()).await {
                Ok(Ok(RenderEvent::ModeChanged(ModeKind::Idle))) => seen_idle_after_request = true,
                Ok(Ok(RenderEvent::Render(render))) => shown.push(render),
                Ok(Ok(RenderEvent::ModeChanged(_))) => {}
                other => panic!("unexpected: {other:?}"),
            }
        }

        let state = handle.snapshot();
        assert_eq!(state.mode, Mode::Idle);
        assert_eq!(state.session.active_problem, "");
        assert!(state.session.history.is_empty());
        assert!(shown.iter().any(|r| matches!(
            r,
            Render::AppendMessage { sender: Sender::Coach, text, .. } if text.starts_with("I'm Not Familiar")
        )));
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_single_flight() {
        let gateway = Arc::new(GatedGateway::new());
        gateway
            .inner
            .queue_hint(Ok("Think about what you have already seen."));
        let (handle, _task) = CoachHandle::spawn(gateway.clone());

        handle.submit_problem("Two Sum", "").await.unwrap();
        gateway.request_started.notified().await;

        assert_eq!(
            handle.submit_problem("Two Sum", "").await,
            rejected(TransitionError::Busy)
        );
        assert_eq!(
            handle.submit_problem("Three Sum", "").await,
            rejected(TransitionError::Busy)
        );
        assert_eq!(gateway.call_count(), 1);

        gateway.release_one();
        let state = wait_for(&handle, |s| s.mode == Mode::Conversing).await;
        assert_eq!(state.session.history.len(), 1);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_history_ordering_over_sequential_sends() {
        let gateway = Arc::new(MockGateway::new());
        let handle = conversing_on_two_sum(gateway.clone()).await;

        let messages = [
            ("Should I sort first?", "Sorting costs O(n log n)."),
            ("What about a hash map?", "Now you're on to something."),
            ("Is one pass enough?", "Try it and see!"),
        ];
        for (i, (message, reply)) in messages.iter().enumerate() {
            gateway.queue_reply(Ok(*reply));
            handle.send_message(*message).await.unwrap();
            wait_for(&handle, |s| {
                s.mode == Mode::Conversing && s.session.history.len() == i + 2
            })
            .await;
        }

        let history = handle.snapshot().session.history;
        assert_eq!(history.len(), 4);
        for (record, (message, reply)) in history[1..].iter().zip(messages) {
            assert_eq!(record.user_input, message);
            assert_eq!(record.bot_response, reply);
            assert_eq!(record.message_type, MessageType::General);
        }

        // Each request replays the history as it stood when sent
        let requests = gateway.recorded_conversation_requests();
        let replayed: Vec<usize> = requests
            .iter()
            .map(|r| r.conversation_history.len())
            .collect();
        assert_eq!(replayed, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_transport_error_not_persisted() {
        let gateway = Arc::new(MockGateway::new());
        let handle = conversing_on_two_sum(gateway.clone()).await;
        let mut renders = handle.subscribe();

        gateway.queue_hint(Err(GatewayError::transport("connection refused")));
        handle.request_another_hint().await.unwrap();

        // Wait for the failure to come back through the runtime
        loop {
            match tokio::time::timeout(WAIT, renders.recv()).await {
                Ok(Ok(RenderEvent::Render(Render::AppendMessage { sender, text, .. }))) => {
                    assert_eq!(sender, Sender::System);
                    assert_eq!(text, crate::gateway::UNREACHABLE_MESSAGE);
                    break;
                }
                Ok(Ok(_)) => {}
                other => panic!("unexpected: {other:?}"),
            }
        }

        let state = wait_for(&handle, |s| s.mode == Mode::Conversing).await;
        assert_eq!(state.session.history.len(), 1);
        assert_eq!(gateway.recorded_hint_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_from_awaiting_reply_discards_late_response() {
        let gateway = Arc::new(GatedGateway::new());
        gateway.inner.queue_hint(Ok("Start with a brute force."));
        gateway.inner.queue_reply(Ok("This reply arrives too late."));
        let (handle, _task) = CoachHandle::spawn(gateway.clone());

        handle.submit_problem("Two Sum", "O(n^2) is too slow").await.unwrap();
        gateway.release_one();
        wait_for(&handle, |s| s.mode == Mode::Conversing).await;

        handle.invoke_quick_action(MessageType::Suggest).await.unwrap();
        gateway.request_started.notified().await;
        assert_eq!(handle.snapshot().mode.kind(), ModeKind::AwaitingReply);

        handle.start_new_problem().await.unwrap();
        let state = handle.snapshot();
        assert_eq!(state.mode, Mode::Idle);
        assert_eq!(state.session, Session::default());

        // Let the abandoned request finish; its response must not resurrect anything
        let mut renders = handle.subscribe();
        gateway.release_one();
        handle.submit_problem("Valid Parentheses", "").await.unwrap();
        assert_eq!(handle.snapshot().mode.kind(), ModeKind::AwaitingFirstHint);
        assert!(handle.snapshot().session.history.is_empty());
        while let Ok(Ok(event)) = tokio::time::timeout(Duration::from_millis(200), renders.recv()).await {
            assert_ne!(
                event,
                RenderEvent::Render(Render::AppendMessage {
                    sender: Sender::Coach,
                    text: "This reply arrives too late.".to_string(),
                    message_type: MessageType::Suggest,
                })
            );
        }
    }

    #[tokio::test]
    async fn test_quick_action_message_type_then_revert() {
        let gateway = Arc::new(MockGateway::new());
        let handle = conversing_on_two_sum(gateway.clone()).await;

        gateway.queue_reply(Ok("Can you avoid the second loop?"));
        handle
            .invoke_quick_action(MessageType::Optimize)
            .await
            .unwrap();
        let state = wait_for(&handle, |s| {
            s.mode == Mode::Conversing && s.session.history.len() == 2
        })
        .await;
        assert_eq!(state.session.history[1].message_type, MessageType::Optimize);
        assert_eq!(
            state.session.history[1].user_input,
            "How can I optimize my solution?"
        );
        assert_eq!(state.session.pending_message_type, MessageType::General);

        gateway.queue_reply(Ok("You're welcome!"));
        handle.send_message("Thanks").await.unwrap();
        let state = wait_for(&handle, |s| {
            s.mode == Mode::Conversing && s.session.history.len() == 3
        })
        .await;
        assert_eq!(state.session.history[2].message_type, MessageType::General);

        let sent: Vec<MessageType> = gateway
            .recorded_conversation_requests()
            .iter()
            .map(|r| r.message_type)
            .collect();
        assert_eq!(sent, vec![MessageType::Optimize, MessageType::General]);
    }

    #[tokio::test]
    async fn test_controls_disabled_while_awaiting_reply() {
        let gateway = Arc::new(MockGateway::new());
        let handle = conversing_on_two_sum(gateway.clone()).await;
        let mut renders = handle.subscribe();

        gateway.queue_reply(Ok("Good question."));
        handle.send_message("Why a hash map?").await.unwrap();

        let mut seen = Vec::new();
        loop {
            match tokio::time::timeout(WAIT, renders.recv()).await {
                Ok(Ok(RenderEvent::Render(render))) => seen.push(render),
                Ok(Ok(RenderEvent::ModeChanged(ModeKind::Conversing))) => break,
                Ok(Ok(RenderEvent::ModeChanged(_))) => {}
                other => panic!("unexpected: {other:?}"),
            }
        }

        let disabled = seen.iter().position(|r| {
            *r == Render::SetEnabled {
                control: Control::ConversationInput,
                enabled: false,
            }
        });
        let enabled = seen.iter().position(|r| {
            *r == Render::SetEnabled {
                control: Control::ConversationInput,
                enabled: true,
            }
        });
        assert!(matches!((disabled, enabled), (Some(d), Some(e)) if d < e));
        assert_eq!(
            seen.first(),
            Some(&Render::AppendMessage {
                sender: Sender::User,
                text: "Why a hash map?".to_string(),
                message_type: MessageType::General,
            })
        );
    }
}
