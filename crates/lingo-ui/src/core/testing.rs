//! Scripted transport and context harness shared by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::core::config::ClientConfig;
use crate::core::context::SessionContext;
use crate::core::error::ApiError;
use crate::core::navigation::HistoryNavigator;
use crate::core::token::TokenStore;
use crate::core::transport::{ApiRequest, Transport};

type Reply = Result<String, ApiError>;

enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Transport answering from a FIFO script and recording every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: RefCell<VecDeque<Scripted>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn respond_ok(&self, body: Value) {
        self.replies
            .borrow_mut()
            .push_back(Scripted::Ready(Ok(body.to_string())));
    }

    pub(crate) fn respond_text(&self, body: &str) {
        self.replies
            .borrow_mut()
            .push_back(Scripted::Ready(Ok(body.to_string())));
    }

    pub(crate) fn respond_status(&self, status: u16, body: Value) {
        self.replies
            .borrow_mut()
            .push_back(Scripted::Ready(Err(ApiError::from_response(
                status,
                &body.to_string(),
            ))));
    }

    /// Queue a reply released later through the returned sender.
    pub(crate) fn respond_gated(&self) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.replies
            .borrow_mut()
            .push_back(Scripted::Gated(receiver));
        sender
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, ApiError> {
        self.requests.borrow_mut().push(request);
        let next = self.replies.borrow_mut().pop_front();
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Gated(receiver)) => receiver.await.unwrap_or_else(|_| {
                Err(ApiError::Network {
                    detail: "gate dropped".to_string(),
                })
            }),
            None => Err(ApiError::Network {
                detail: "no scripted reply".to_string(),
            }),
        }
    }
}

pub(crate) struct Harness {
    pub(crate) transport: Rc<ScriptedTransport>,
    pub(crate) navigator: Rc<HistoryNavigator>,
    pub(crate) context: Rc<SessionContext>,
}

pub(crate) fn harness() -> Harness {
    let transport = Rc::new(ScriptedTransport::default());
    let navigator = Rc::new(HistoryNavigator::default());
    let context = SessionContext::new(
        ClientConfig::default(),
        transport.clone(),
        TokenStore::in_memory(),
        navigator.clone(),
    );
    Harness {
        transport,
        navigator,
        context,
    }
}
