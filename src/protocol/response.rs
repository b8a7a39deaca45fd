//! Response definitions
//!
//! Represents replies owed to the remote client.

use std::fmt;

use bytes::Bytes;

/// A reply to the client: empty, canned, or read from the companion
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Response(Bytes);

impl Response {
    /// Empty response (no reply owed)
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Response from a static literal
    pub fn from_static(text: &'static str) -> Self {
        Self(Bytes::from_static(text.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for exactly `0#` or `1#`
    pub fn is_boolean(&self) -> bool {
        matches!(&self.0[..], b"0#" | b"1#")
    }

    /// Strip the terminator from boolean replies
    ///
    /// `0#` becomes `0` and `1#` becomes `1`; anything else, `10#` included,
    /// is returned unchanged.
    pub fn normalized(self) -> Self {
        if self.is_boolean() {
            Self(self.0.slice(..1))
        } else {
            self
        }
    }
}

impl From<Bytes> for Response {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Response {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static str> for Response {
    fn from(text: &'static str) -> Self {
        Self::from_static(text)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&String::from_utf8_lossy(&self.0))
    }
}
