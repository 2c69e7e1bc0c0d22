
use bytes::Bytes;

use crate::cipher_suite::CipherSuite;
use crate::error::{Error, Result};
use crate::header::Header;

/// Encrypting half of one media direction: a single active key and a
/// frame counter that never repeats under it.
pub struct Sender {
    sender_id: u64,
    counter: u64,
    key: Option<CipherSuite>,
}

impl Sender {
    pub fn new(sender_id: u64) -> Self {
        Sender {
            sender_id,
            counter: 0,
            key: None,
        }
    }

    pub fn sender_id(&self) -> u64 {
        self.sender_id
    }

    /// Changes the id stamped into outgoing headers. The frame counter
    /// keeps running.
    pub fn set_sender_id(&mut self, sender_id: u64) {
        self.sender_id = sender_id;
    }

    /// Replaces the active key.
    pub fn set_encryption_key(&mut self, key: CipherSuite) {
        self.key = Some(key);
    }

    pub fn has_encryption_key(&self) -> bool {
        self.key.is_some()
    }

    /// Protects one frame. The first `skip` bytes travel in the clear
    /// ahead of the SFrame header; the rest is encrypted and
    /// authenticated. The counter is allocated post-increment, so the
    /// first frame goes out with counter 0.
    pub fn encrypt(&mut self, plaintext: &[u8], skip: usize) -> Result<Bytes> {
        let key = self.key.as_ref().ok_or(Error::MissingSenderKey)?;

        let counter = self.counter;
        self.counter = self.counter.checked_add(1).ok_or(Error::ExceededMaxCounter)?;

        let header = Header::new(self.sender_id, counter);
        key.encrypt_frame(&header, plaintext, skip)
    }
}
