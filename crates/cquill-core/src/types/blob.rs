use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

///
/// Blob
///
/// Owned byte payload for blob-typed columns. Record fields use this
/// newtype rather than `Vec<u8>` so element-wise list conversion stays
/// unambiguous for `Vec<T>` columns.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Blob(Vec<u8>);

impl Blob {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Blob> for Vec<u8> {
    fn from(blob: Blob) -> Self {
        blob.0
    }
}
