
use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, trace};

use crate::cipher_suite::CipherSuite;
use crate::error::{Error, Result};
use crate::header::Header;

/// Number of counters at or below the highest decrypted one that are
/// still accepted: `max-127 ..= max` decrypt, anything older is rejected
/// as replayed. Frames ahead of `max` always pass.
pub const REPLAY_WINDOW: u64 = 128;

/// Grace period during which keys superseded by a rotation stay usable.
pub const KEY_TIMEOUT: Duration = Duration::from_millis(1000);

struct KeyringEntry {
    serial: u64,
    key: CipherSuite,
}

/// A rotation deadline anchored to the entry whose installation started
/// it. When it expires, every key older than the anchor is dropped. The
/// deadline is fixed at installation time; later rotations never extend
/// it.
struct PendingRetirement {
    anchor: u64,
    deadline: Instant,
}

/// Decrypting half of one remote sender: an ordered keyring
/// (oldest-first) plus replay bookkeeping.
pub struct Receiver {
    key_id: u64,
    max_received_counter: Option<u64>,
    keyring: Vec<KeyringEntry>,
    pending_retirements: Vec<PendingRetirement>,
    next_serial: u64,
}

impl Receiver {
    pub fn new(key_id: u64) -> Self {
        Receiver {
            key_id,
            max_received_counter: None,
            keyring: Vec::new(),
            pending_retirements: Vec::new(),
            next_serial: 0,
        }
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn has_encryption_keys(&self) -> bool {
        !self.keyring.is_empty()
    }

    /// Appends a rotated-in key at the tail of the keyring. When older
    /// keys are present, their retirement is scheduled one `KEY_TIMEOUT`
    /// from now, anchored to this installation.
    pub fn set_encryption_key(&mut self, key: CipherSuite) {
        self.sweep_retired_keys();

        let serial = self.next_serial;
        self.next_serial += 1;
        let superseded = !self.keyring.is_empty();
        self.keyring.push(KeyringEntry { serial, key });

        if superseded {
            self.pending_retirements.push(PendingRetirement {
                anchor: serial,
                deadline: Instant::now() + KEY_TIMEOUT,
            });
        }
    }

    /// Tries the frame against every live key, oldest-first, swallowing
    /// per-key failures. The replay check runs before any key is
    /// touched; the high-water counter moves only on success.
    pub fn decrypt(&mut self, header: &Header, encrypted: &[u8], skip: usize) -> Result<Bytes> {
        self.sweep_retired_keys();

        let counter = header.counter();
        if let Some(max) = self.max_received_counter {
            if counter < max && max - counter >= REPLAY_WINDOW {
                return Err(Error::ReplayAttack(counter, max));
            }
        }

        let mut plaintext = None;
        for entry in &self.keyring {
            match entry.key.decrypt_frame(header, encrypted, skip) {
                Ok(out) => {
                    plaintext = Some(out);
                    break;
                }
                Err(e) => {
                    trace!(
                        "receiver {}: key {} cannot decrypt counter {}: {}",
                        self.key_id,
                        entry.serial,
                        counter,
                        e
                    );
                }
            }
        }

        let plaintext = plaintext.ok_or(Error::DecryptionFailure)?;

        self.max_received_counter = Some(match self.max_received_counter {
            Some(max) => max.max(counter),
            None => counter,
        });

        Ok(plaintext)
    }

    /// Drops every key older than the anchor of each expired retirement.
    /// The anchor itself is never dropped by its own deadline.
    fn sweep_retired_keys(&mut self) {
        let now = Instant::now();
        while let Some(pos) = self
            .pending_retirements
            .iter()
            .position(|p| p.deadline <= now)
        {
            let pending = self.pending_retirements.remove(pos);
            if let Some(anchor_pos) = self
                .keyring
                .iter()
                .position(|e| e.serial == pending.anchor)
            {
                if anchor_pos > 0 {
                    debug!(
                        "receiver {}: retiring {} superseded key(s)",
                        self.key_id, anchor_pos
                    );
                    self.keyring.drain(..anchor_pos);
                }
            }
        }
    }
}
