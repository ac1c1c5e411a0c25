use std::process::Command;

use super::UiLinkOpener;

/// Hands material links to the system browser.
pub struct DesktopLinkOpener;

impl UiLinkOpener for DesktopLinkOpener {
    fn open_url(&self, url: &str) {
        let Some(url) = browsable(url) else {
            tracing::warn!(url, "refusing to open non-web link");
            return;
        };
        #[cfg(target_os = "macos")]
        let spawned = Command::new("open").arg(url).spawn();
        #[cfg(target_os = "windows")]
        let spawned = Command::new("cmd").args(["/C", "start", "", url]).spawn();
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let spawned = Command::new("xdg-open").arg(url).spawn();

        if let Err(err) = spawned {
            tracing::warn!(url, error = %err, "failed to open link");
        }
    }
}

/// Only http(s) links leave the app.
fn browsable(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::browsable;

    #[test]
    fn only_web_links_are_opened() {
        assert_eq!(browsable(" https://example.org/a "), Some("https://example.org/a"));
        assert_eq!(browsable("HTTP://example.org"), Some("HTTP://example.org"));
        assert_eq!(browsable("file:///etc/passwd"), None);
        assert_eq!(browsable("javascript:alert(1)"), None);
        assert_eq!(browsable(""), None);
    }
}
