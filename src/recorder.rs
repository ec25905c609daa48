//! An in-memory [`ResponseWriter`] that captures written `{header, body}`
//! pairs instead of writing to a socket, so handlers can be unit-tested
//! without a network.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::header::Header;
use crate::response::ResponseWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub header: Header,
    pub body: Vec<u8>,
}

/// Captures every `write` call for later assertion.
#[derive(Default)]
pub struct Recorder {
    written: Mutex<Vec<Recorded>>,
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::default()
    }

    /// The first message written, if any.
    pub async fn first(&self) -> Option<Recorded> {
        self.written.lock().await.first().cloned()
    }

    /// Every message written, in write order.
    pub async fn all(&self) -> Vec<Recorded> {
        self.written.lock().await.clone()
    }
}

#[async_trait]
impl ResponseWriter for Recorder {
    async fn write(&mut self, mut header: Header, body: &[u8]) -> Result<()> {
        if header.version == 0 {
            header.version = crate::header::VERSION;
        }
        header.length = (crate::header::HEADER_LEN + body.len()) as u16;
        self.written.lock().await.push(Recorded {
            header,
            body: body.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Type;

    #[tokio::test]
    async fn records_every_write_in_order() {
        let mut recorder = Recorder::new();
        recorder
            .write(Header::new(Type::EchoReply, 42), &[1, 2, 3])
            .await
            .unwrap();
        recorder
            .write(Header::new(Type::EchoReply, 42), &[4, 5])
            .await
            .unwrap();

        let all = recorder.all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(recorder.first().await.unwrap().body, vec![1, 2, 3]);
        assert_eq!(all[1].body, vec![4, 5]);
    }
}
