// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{
    collections::VecDeque,
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, LevelFilter};
use simplelog::SimpleLogger;

use ledger_algorand::{Config, DeviceHandle, Error, Transport};

/// Request recorded by the [`MockTransport`]
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

/// Scripted response for the [`MockTransport`]
#[derive(Debug)]
pub enum Reply {
    /// Raw response (payload and status word)
    Response(Vec<u8>),
    /// Transport failure
    Fail(Error),
    /// Never respond
    Hang,
}

#[derive(Default)]
struct State {
    requests: Vec<Request>,
    replies: VecDeque<Reply>,
}

/// In-memory transport, recording requests and replaying scripted replies
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

#[allow(unused)]
impl MockTransport {
    /// Queue a response with the provided payload and status word
    pub fn reply(&self, payload: &[u8], status: u16) -> &Self {
        let mut resp = payload.to_vec();
        resp.extend_from_slice(&status.to_be_bytes());

        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Reply::Response(resp));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, e: Error) -> &Self {
        self.state.lock().unwrap().replies.push_back(Reply::Fail(e));
        self
    }

    /// Queue a request that never completes
    pub fn hang(&self) -> &Self {
        self.state.lock().unwrap().replies.push_back(Reply::Hang);
        self
    }

    /// Fetch recorded requests
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Fetch the number of unused replies
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
        acceptable: &[u16],
    ) -> Result<Vec<u8>, Error> {
        let reply = {
            let mut s = self.state.lock().unwrap();

            s.requests.push(Request {
                cla,
                ins,
                p1,
                p2,
                data: data.to_vec(),
            });

            s.replies.pop_front()
        };

        debug!("Mock request ins: 0x{ins:02x} p1: 0x{p1:02x} p2: 0x{p2:02x} reply: {reply:02x?}");

        match reply {
            Some(Reply::Response(r)) => {
                let status = u16::from_be_bytes([r[r.len() - 2], r[r.len() - 1]]);
                match acceptable.contains(&status) {
                    true => Ok(r),
                    false => Err(Error::Status(status)),
                }
            }
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::Transport("mock hang elapsed".into()))
            }
            None => Err(Error::Transport("no reply queued".into())),
        }
    }
}

/// Setup logging and a mock-backed device handle
#[allow(unused)]
pub fn setup() -> (MockTransport, DeviceHandle<MockTransport>) {
    setup_with(Config::default())
}

/// Setup logging and a mock-backed device handle with the provided configuration
#[allow(unused)]
pub fn setup_with(cfg: Config) -> (MockTransport, DeviceHandle<MockTransport>) {
    // Setup logging
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());

    let t = MockTransport::default();
    let h = DeviceHandle::new(t.clone(), cfg);

    (t, h)
}
