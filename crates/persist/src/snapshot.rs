use gridworld_common::GridError;
use gridworld_kernel::State;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },
    #[error("decoded state is malformed: {0}")]
    InvalidState(GridError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A content-addressed, self-contained encoding of one [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Step counter of the captured state.
    pub step: u64,
    /// `State::state_hash` at capture time.
    pub state_hash: u64,
    /// CBOR encoding of the state.
    pub bytes: Vec<u8>,
    /// Lowercase hex SHA-256 of `bytes`.
    pub digest: String,
}

impl Snapshot {
    pub fn capture(state: &State) -> Result<Self, SnapshotError> {
        let bytes = cbor_serialize(state)?;
        let digest = sha256_hex(&bytes);
        tracing::debug!(step = state.step(), %digest, size = bytes.len(), "snapshot captured");
        Ok(Self {
            step: state.step(),
            state_hash: state.state_hash(),
            bytes,
            digest,
        })
    }

    /// Recompute the digest over the stored bytes.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let actual = sha256_hex(&self.bytes);
        if actual != self.digest {
            return Err(SnapshotError::IntegrityFailure {
                expected: self.digest.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Verify, then decode the state. Fails closed on any corruption,
    /// including well-formed CBOR that describes an impossible state.
    pub fn restore(&self) -> Result<State, SnapshotError> {
        self.verify()?;
        let state: State = cbor_deserialize(&self.bytes)?;
        state.validate().map_err(SnapshotError::InvalidState)?;
        if state.state_hash() != self.state_hash {
            return Err(SnapshotError::IntegrityFailure {
                expected: format!("{:016x}", self.state_hash),
                actual: format!("{:016x}", state.state_hash()),
            });
        }
        Ok(state)
    }

    /// The whole snapshot as CBOR, for shipping between processes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        cbor_serialize(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        cbor_deserialize(data)
    }
}

pub(crate) fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SnapshotError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| SnapshotError::CborEncode(e.to_string()))?;
    Ok(buf)
}

pub(crate) fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, SnapshotError> {
    ciborium::from_reader(data).map_err(|e| SnapshotError::CborDecode(e.to_string()))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
