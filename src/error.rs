use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("no sender encryption key installed")]
    MissingSenderKey,
    #[error("no receiver registered for key id {0}")]
    MissingReceiverKey(u64),
    #[error("initialization vector: invalid counter length {0}")]
    InitializationVector(usize),
    #[error("frame too short: only {0} bytes, expected at least {1} bytes")]
    FrameTooShort(usize, usize),
    #[error("key material must be at least {1} bytes, got {0}")]
    ShortKeyMaterial(usize, usize),
    #[error("aead encryption failed")]
    EncryptionFailure,
    #[error("no key in the keyring could decrypt the frame")]
    DecryptionFailure,
    #[error("failed to verify auth tag")]
    AuthenticationError,
    #[error("frame counter {0} outside replay window, highest received {1}")]
    ReplayAttack(u64, u64),
    #[error("sender frame counter exhausted")]
    ExceededMaxCounter,

    #[error("{0}")]
    Unknown(String),
}
