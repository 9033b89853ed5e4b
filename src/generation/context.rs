/// External context handed to the generation step
///
/// A plain-text recap of the request and any URLs the user flagged. Web search is
/// not performed; when requested, a note saying so is appended instead.

/// Appended when the caller asks for web search
pub const WEB_SEARCH_NOTE: &str =
    "[Note] Summarized web search results will be added here in a future version.";

/// Inputs collected from the generate request
#[derive(Debug, Clone, Default)]
pub struct ExternalContextOptions<'a> {
    pub description: &'a str,
    pub target_urls: &'a [String],
    pub enable_web_search: bool,
}

/// Build the context text passed alongside the reference templates
pub fn build_external_context(options: &ExternalContextOptions<'_>) -> String {
    let mut lines = vec![
        "[Request summary]".to_string(),
        options.description.to_string(),
    ];

    let urls: Vec<&str> = options
        .target_urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    if !urls.is_empty() {
        lines.push(String::new());
        lines.push("[URLs the user marked as important]".to_string());
        lines.extend(urls.iter().map(|u| format!("- {}", u)));
    }

    if options.enable_web_search {
        tracing::debug!("🌐 Web search requested; not supported, context built from request only");
        lines.push(String::new());
        lines.push(WEB_SEARCH_NOTE.to_string());
    }

    lines.join("\n")
}
