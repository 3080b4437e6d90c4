use base64::Engine as _;
use std::fmt;

/// Value sent in the `Signature` header.
///
/// The registry expects the detached signature of the document body,
/// base64-encoded. Callers that already hold the encoded string use
/// [`Signature::new`]; callers holding raw signature bytes use
/// [`Signature::from_detached`].
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn from_detached(raw: &[u8]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Signature {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Signature {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Signatures end up in logs via Debug; keep them short.
impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "Signature({}…, {} chars)", prefix, self.0.chars().count())
    }
}
