use std::fmt;

/// A wrapper that keeps credential material out of logs.
///
/// Bearer tokens pulled off a request and the HMAC signing key are both held
/// in `Secret<T>`. Formatting never shows the inner value; the only way in is
/// [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use wecare_core::Secret;
///
/// let token = Secret::new("eyJhbGciOiJIUzI1NiJ9.e30.sig".to_string());
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(format!("{}", token), "[REDACTED]");
/// assert!(token.expose_secret().starts_with("eyJ"));
/// ```
// Do NOT derive Clone, Copy, or Default: a credential must not be duplicated silently.
pub struct Secret<T> {
    // Must stay private; a public field bypasses redaction (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// Callers must not log or echo what this returns.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl Secret<String> {
    /// Returns true when the wrapped string is empty or only whitespace.
    ///
    /// The credential gate treats such tokens as absent.
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
