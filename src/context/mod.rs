
use std::collections::HashMap;

use bytes::Bytes;
use log::debug;

use crate::cipher_suite::{CipherSuite, CipherSuiteVariant};
use crate::error::{Error, Result};
use crate::header::Header;
use crate::receiver::Receiver;
use crate::sender::Sender;

/// One end-to-end crypto context per peer and direction: a lazily
/// created sender plus receivers routed by the key id each frame header
/// carries.
///
/// The sender id doubles as the wire key id, so peers must register the
/// remote sender's id as the receiver key id.
pub struct Context {
    variant: CipherSuiteVariant,
    sender: Option<Sender>,
    receivers: HashMap<u64, Receiver>,
}

impl Default for Context {
    fn default() -> Self {
        Context::new(CipherSuiteVariant::default())
    }
}

impl Context {
    pub fn new(variant: CipherSuiteVariant) -> Self {
        Context {
            variant,
            sender: None,
            receivers: HashMap::new(),
        }
    }

    pub fn cipher_suite_variant(&self) -> CipherSuiteVariant {
        self.variant
    }

    /// Creates the sender on first use, then installs a key freshly
    /// derived from `key_material` under its id.
    pub fn set_sender_encryption_key(&mut self, sender_id: u64, key_material: &[u8]) -> Result<()> {
        let key = CipherSuite::derive(self.variant, key_material)?;
        let sender = self.sender.get_or_insert_with(|| Sender::new(sender_id));
        sender.set_sender_id(sender_id);
        sender.set_encryption_key(key);
        Ok(())
    }

    /// Upserts the receiver registered at `key_id` and appends a freshly
    /// derived key to its keyring.
    pub fn set_receiver_encryption_key(&mut self, key_id: u64, key_material: &[u8]) -> Result<()> {
        let key = CipherSuite::derive(self.variant, key_material)?;
        self.receivers
            .entry(key_id)
            .or_insert_with(|| Receiver::new(key_id))
            .set_encryption_key(key);
        Ok(())
    }

    /// Removes the receiver registered at `key_id`, reporting whether
    /// one existed.
    pub fn delete_receiver(&mut self, key_id: u64) -> bool {
        let existed = self.receivers.remove(&key_id).is_some();
        if existed {
            debug!("deleted receiver for key id {key_id}");
        }
        existed
    }

    /// Protects one outgoing frame, leaving the first `skip` bytes in
    /// the clear.
    pub fn encrypt(&mut self, plaintext: &[u8], skip: usize) -> Result<Bytes> {
        let sender = self.sender.as_mut().ok_or(Error::MissingSenderKey)?;
        sender.encrypt(plaintext, skip)
    }

    /// Unprotects one incoming frame: parses the header past the `skip`
    /// region and routes to the receiver registered under its key id.
    pub fn decrypt(&mut self, encrypted: &[u8], skip: usize) -> Result<Bytes> {
        if encrypted.len() < skip {
            return Err(Error::FrameTooShort(encrypted.len(), skip));
        }

        let header = Header::parse(&encrypted[skip..])?;
        let receiver = self
            .receivers
            .get_mut(&header.key_id())
            .ok_or(Error::MissingReceiverKey(header.key_id()))?;

        receiver.decrypt(&header, encrypted, skip)
    }

    pub fn can_encrypt(&self) -> bool {
        self.sender
            .as_ref()
            .is_some_and(Sender::has_encryption_key)
    }

    pub fn can_decrypt(&self, key_id: u64) -> bool {
        self.receivers
            .get(&key_id)
            .is_some_and(Receiver::has_encryption_keys)
    }

    /// Peeks at the key id of a protected frame without touching any
    /// receiver state.
    pub fn read_key_id(encrypted: &[u8], skip: usize) -> Result<u64> {
        if encrypted.len() < skip {
            return Err(Error::FrameTooShort(encrypted.len(), skip));
        }
        Ok(Header::parse(&encrypted[skip..])?.key_id())
    }
}
