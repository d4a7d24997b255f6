//! Single sign-out redirect target.
//!
//! The identity provider's logout endpoint is configured as a template with a
//! `%s` placeholder. After logging the user out everywhere it sends them back
//! to the return URL we substitute there.

/// Placeholder replaced by the encoded return URL.
pub const RETURN_URL_PLACEHOLDER: &str = "%s";

const STYLESHEETS_SEGMENT: &str = "/stylesheets/";

/// Computes where the identity provider should send the user after logout.
///
/// A trailing `/stylesheets/<resource>` is stripped first. The landing page
/// then replaces everything after the last remaining `/`.
#[must_use]
pub fn return_url(request_url: &str, landing_page: &str) -> String {
    let base = strip_stylesheet_resource(request_url).unwrap_or(request_url);
    let cut = base.rfind('/').map_or(0, |idx| idx + 1);
    format!("{}{}", &base[..cut], landing_page)
}

/// Returns `url` without its trailing `/stylesheets/<resource>`, if any.
fn strip_stylesheet_resource(url: &str) -> Option<&str> {
    let idx = url.rfind(STYLESHEETS_SEGMENT)?;
    let resource = &url[idx + STYLESHEETS_SEGMENT.len()..];
    (!resource.contains('/')).then(|| &url[..idx])
}

/// Substitutes the percent-encoded `return_url` into `template`.
///
/// Only the first placeholder is replaced. A template without a placeholder
/// is returned unchanged; configuration validation rejects those up front.
#[must_use]
pub fn single_logout_url(template: &str, return_url: &str) -> String {
    let encoded = urlencoding::encode(return_url);
    template.replacen(RETURN_URL_PLACEHOLDER, &encoded, 1)
}
