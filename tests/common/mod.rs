//! Shared in-process gateway fake for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use freedata_bot::errors::GatewayError;
use freedata_bot::gateway::{ApiInfo, Direction, Gateway, Message, OutgoingMessage, RadioStatus};

pub struct FakeGateway {
    pub name: String,
    pub messages: Mutex<Vec<Message>>,
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub radio_up: AtomicBool,
    pub fail_messages: AtomicBool,
    pub fail_radio: AtomicBool,
    pub fail_send: AtomicBool,
}

impl FakeGateway {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            name: "FreeDATA API".to_string(),
            messages: Mutex::new(messages),
            sent: Mutex::new(Vec::new()),
            radio_up: AtomicBool::new(true),
            fail_messages: AtomicBool::new(false),
            fail_radio: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
        }
    }

    pub fn set_radio(&self, up: bool) {
        self.radio_up.store(up, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn push(&self, message: Message) {
        self.messages.lock().unwrap().push(message);
    }

    fn unavailable(path: &str) -> GatewayError {
        GatewayError::Status {
            url: format!("http://fake{}", path),
            status: 503,
        }
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn info(&self) -> Result<ApiInfo, GatewayError> {
        Ok(ApiInfo {
            name: self.name.clone(),
            modem_version: "v0.test".to_string(),
        })
    }

    async fn radio_status(&self) -> Result<RadioStatus, GatewayError> {
        if self.fail_radio.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/radio"));
        }
        Ok(RadioStatus {
            radio_status: self.radio_up.load(Ordering::SeqCst),
            radio_frequency: Some(14_093_000.0),
        })
    }

    async fn messages(&self) -> Result<Vec<Message>, GatewayError> {
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/messages"));
        }
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), GatewayError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/messages"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn received(id: &str, ts: &str, origin: &str, body: &str) -> Message {
    Message {
        id: id.into(),
        timestamp: ts.to_string(),
        direction: Direction::Received,
        origin: origin.to_string(),
        body: body.to_string(),
    }
}

pub fn sent(id: &str, ts: &str, body: &str) -> Message {
    Message {
        id: id.into(),
        timestamp: ts.to_string(),
        direction: Direction::Sent,
        origin: String::new(),
        body: body.to_string(),
    }
}
