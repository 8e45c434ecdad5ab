//! Browser-like request headers.

/// Headers sent with every direct page request.
///
/// Tracker front pages are often behind header-based bot filters; these
/// match what desktop Chrome sends on a top-level navigation.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    const ACCEPT: &'static str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

    /// Applies the browser headers to a `reqwest::RequestBuilder`.
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        builder
            .header(reqwest::header::ACCEPT, Self::ACCEPT)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-dest"),
                "document",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-mode"),
                "navigate",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-site"),
                "none",
            )
            .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
    }
}
