use thiserror::Error;

/// The HTML-fragment-to-Markdown conversion failed for one node.
/// Recoverable: the caller skips the node and reports a diagnostic.
#[derive(Debug, Error)]
#[error("markdown conversion failed: {0}")]
pub struct FragmentError(String);

/// HTML-fragment → Markdown conversion, wrapping `htmd`.
///
/// Constructed once per run and passed by reference into the extractor,
/// so there is no process-global converter state. Conversion itself is
/// pure: fragment string in, Markdown string out, no side effects.
pub struct MarkdownConverter {
    inner: htmd::HtmlToMarkdown,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        let inner = htmd::HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style", "iframe", "noscript"])
            .build();
        Self { inner }
    }

    pub fn convert_fragment(&self, html: &str) -> Result<String, FragmentError> {
        self.inner
            .convert(html)
            .map_err(|e| FragmentError(format!("{e}")))
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}
