use anyhow::{Context, Result};

/// Open a URL in the user's default browser
///
/// # Arguments
/// * `url` - The URL to open (e.g., a pull request web URL)
///
/// # Errors
/// Returns error if the URL is not http(s) or no browser can be opened
pub fn open_url(url: &str) -> Result<()> {
    if !is_web_url(url) {
        anyhow::bail!("Refusing to open non-web URL: {}", url);
    }
    tracing::debug!(%url, "opening browser");
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

fn is_web_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
