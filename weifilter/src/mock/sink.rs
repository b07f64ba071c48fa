//! Test mock for sink
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::{
    error::{Error, Result},
    sink::Sink,
};

#[derive(Debug, Clone, Default)]
pub struct MockSink {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    opened: bool,
    written: Option<Bytes>,
    should_fail: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_opened(&self) -> bool {
        self.inner.lock().unwrap().opened
    }

    pub fn written(&self) -> Option<Bytes> {
        self.inner.lock().unwrap().written.clone()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.inner.lock().unwrap().should_fail = fail;
    }
}

impl Sink for MockSink {
    async fn open(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.should_fail {
            return Err(Error::Other("Mock error".into()));
        }
        inner.opened = true;
        Ok(())
    }

    async fn write_all_and_close(self, content: Bytes) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.opened {
            return Err(Error::Other("sink written before open".into()));
        }
        inner.written = Some(content);
        Ok(())
    }
}
