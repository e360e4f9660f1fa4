use anyhow::{Context, Result};

use crate::azure::PullRequest;
use crate::pipeline;

/// Somewhere copied text can go.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// How long a copy keeps serving the clipboard on Linux when no other
/// application takes it over first.
#[cfg(target_os = "linux")]
const LINUX_HOLD: std::time::Duration = std::time::Duration::from_secs(30);

/// The desktop clipboard.
///
/// On X11 and Wayland the contents live in the process that set them, so
/// on Linux `set_text` blocks until a clipboard manager (or another
/// application) takes ownership, or until the hold time runs out.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Fails when no clipboard is reachable (SSH sessions, headless hosts).
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("Clipboard not available")?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    #[cfg(target_os = "linux")]
    fn set_text(&mut self, text: &str) -> Result<()> {
        use arboard::SetExtLinux;

        eprintln!(
            "Holding the clipboard for up to {}s so it can be pasted...",
            LINUX_HOLD.as_secs()
        );
        self.inner
            .set()
            .wait_until(std::time::Instant::now() + LINUX_HOLD)
            .text(text.to_string())
            .context("Failed to write to clipboard")
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .context("Failed to write to clipboard")
    }
}

/// Copy a PR's web URL and return it.
pub fn copy_pull_request_url<S: ClipboardSink>(
    sink: &mut S,
    pr: &PullRequest,
    organization: &str,
    project: &str,
) -> Result<String> {
    let url = pipeline::web_url_for(pr, organization, project);
    sink.set_text(&url)?;
    tracing::debug!(%url, "copied to clipboard");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::types::PullRequestStatus;
    use crate::pipeline::status::tests::sample_pr;
    use crate::pipeline::{project, Locale, ProjectionContext};
    use chrono::Utc;

    #[derive(Default)]
    struct RecordingClipboard {
        texts: Vec<String>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            self.texts.push(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl ClipboardSink for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> Result<()> {
            anyhow::bail!("Clipboard not available")
        }
    }

    #[test]
    fn test_copies_projected_web_url() {
        let mut pr = sample_pr(42, PullRequestStatus::Active, Utc::now());
        pr.repository.name = "web app".to_string();
        let ctx = ProjectionContext {
            organization: "acme",
            project: "Web",
            excluded_reviewers: &[],
            locale: Locale::En,
            now: Utc::now(),
        };

        let mut clipboard = RecordingClipboard::default();
        let url = copy_pull_request_url(&mut clipboard, &pr, "acme", "Web").unwrap();

        assert_eq!(url, project(&pr, &ctx).web_url);
        assert_eq!(clipboard.texts, vec![url]);
    }

    #[test]
    fn test_clipboard_failure_is_error() {
        let pr = sample_pr(1, PullRequestStatus::Active, Utc::now());
        let err = copy_pull_request_url(&mut BrokenClipboard, &pr, "acme", "Web").unwrap_err();
        assert!(err.to_string().contains("Clipboard not available"));
    }
}
