//! Credential extraction boundary.
//!
//! Framework integrations implement [`ExtractCredential`] for their request
//! type; [`extract_credential`] applies the bearer/cookie rules on top.

use crate::secret::Secret;

const AUTHORIZATION: &str = "authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Read access to the parts of a request that can carry a credential.
///
/// # Examples
///
/// ```
/// use wecare_core::web::{extract_credential, ExtractCredential};
///
/// struct MyFrameworkRequest {
///     id: String,
///     uri_path: String,
///     auth: Option<String>,
/// }
///
/// impl ExtractCredential for MyFrameworkRequest {
///     fn request_id(&self) -> &str {
///         &self.id
///     }
///     fn path(&self) -> &str {
///         &self.uri_path
///     }
///     fn header(&self, name: &str) -> Option<&str> {
///         if name.eq_ignore_ascii_case("authorization") {
///             self.auth.as_deref()
///         } else {
///             None
///         }
///     }
///     fn cookie(&self, _name: &str) -> Option<&str> {
///         None
///     }
/// }
///
/// let req = MyFrameworkRequest {
///     id: "r".into(),
///     uri_path: "/driver".into(),
///     auth: Some("Bearer t0k".into()),
/// };
/// assert_eq!(extract_credential(&req, "token").unwrap().expose_secret(), "t0k");
/// ```
pub trait ExtractCredential {
    /// Correlation id of the request.
    fn request_id(&self) -> &str;

    /// Request path, checked against route allow-lists.
    fn path(&self) -> &str;

    /// Header value; `name` must be matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Cookie value.
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Pulls the bearer token out of a request.
///
/// The `Authorization` header wins when it holds `Bearer <token>` with the
/// prefix in exactly that case. A header with any other prefix, or a blank
/// token, counts as absent and the `cookie_name` cookie is tried instead.
/// Returns `None` when neither yields a non-blank token.
pub fn extract_credential<R>(request: &R, cookie_name: &str) -> Option<Secret<String>>
where
    R: ExtractCredential + ?Sized,
{
    let from_header = request
        .header(AUTHORIZATION)
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    from_header
        .and_then(non_blank)
        .or_else(|| request.cookie(cookie_name).and_then(non_blank))
        .map(|token| Secret::new(token.to_string()))
}

fn non_blank(token: &str) -> Option<&str> {
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::RequestAdapter;

    fn extract(adapter: &RequestAdapter) -> Option<String> {
        extract_credential(adapter, "token").map(|s| s.expose_secret().clone())
    }

    #[test]
    fn exact_bearer_prefix_required() {
        for header in ["bearer abc", "BEARER abc", "Bearerabc", "Token abc", "abc"] {
            let mut adapter = RequestAdapter::new("req");
            adapter.add_header("Authorization", header);
            assert_eq!(extract(&adapter), None, "header {:?}", header);
        }
    }

    #[test]
    fn token_is_trimmed() {
        let mut adapter = RequestAdapter::new("req");
        adapter.add_header("Authorization", "Bearer  abc ");
        assert_eq!(extract(&adapter).as_deref(), Some("abc"));
    }

    #[test]
    fn malformed_header_falls_back_to_cookie() {
        let mut adapter = RequestAdapter::new("req");
        adapter.add_header("Authorization", "bearer abc");
        adapter.add_cookie("token", "from-cookie");
        assert_eq!(extract(&adapter).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn blank_cookie_is_missing() {
        let mut adapter = RequestAdapter::new("req");
        adapter.add_cookie("token", "   ");
        assert_eq!(extract(&adapter), None);
    }

    #[test]
    fn cookie_name_is_configurable() {
        let mut adapter = RequestAdapter::new("req");
        adapter.add_cookie("session", "s1");
        assert_eq!(extract(&adapter), None);
        assert_eq!(
            extract_credential(&adapter, "session").map(|s| s.expose_secret().clone()),
            Some("s1".to_string())
        );
    }
}
