use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::dom::RENDERED_HIDDEN_ATTR;

/// Stamps `data-accname-hidden` on every element whose computed style hides
/// it, naming the property responsible. Returns the number of stamped elements.
pub const MARK_HIDDEN_JS: &str = r#"(function() {
    var attr = 'data-accname-hidden';
    var count = 0;
    var all = document.querySelectorAll('*');
    for (var i = 0; i < all.length; i++) {
        var el = all[i];
        el.removeAttribute(attr);
        var cs = window.getComputedStyle(el);
        var reason = null;
        if (cs.display === 'none') reason = 'display';
        else if (cs.visibility === 'hidden' || cs.visibility === 'collapse') reason = 'visibility';
        else if (parseFloat(cs.opacity) === 0) reason = 'opacity';
        if (reason) {
            el.setAttribute(attr, reason);
            count++;
        }
    }
    return count;
})()"#;

const HIGHLIGHT_STYLE: &str = "3px solid #d6001c";

/// Scrolls the element matching the selector into view and outlines it.
/// Falls back to a lookup by id when the selector is invalid or stale.
/// Returns `FOUND` or `NOT_FOUND`.
pub fn highlight_js(selector: &str) -> String {
    let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".into());
    format!(
        r#"(function() {{
    var sel = {quoted};
    var el = null;
    try {{ el = document.querySelector(sel); }} catch (e) {{ el = null; }}
    if (!el) {{
        var m = sel.match(/#([A-Za-z_][\w-]*)/);
        if (m) el = document.getElementById(m[1]);
    }}
    if (!el) return 'NOT_FOUND';
    var prev = document.querySelector('[data-accname-highlight]');
    if (prev) {{
        prev.style.outline = prev.getAttribute('data-accname-highlight');
        prev.removeAttribute('data-accname-highlight');
    }}
    el.setAttribute('data-accname-highlight', el.style.outline || '');
    el.style.outline = '{HIGHLIGHT_STYLE}';
    el.scrollIntoView({{behavior: 'instant', block: 'center'}});
    return 'FOUND';
}})()"#
    )
}

/// Connect to an already-running Chrome instance via CDP.
///
/// Chrome must be started with `--remote-debugging-port=<port>`, e.g.:
///   google-chrome --remote-debugging-port=9222
pub async fn connect(port: u16) -> Result<Browser> {
    let url = format!("http://127.0.0.1:{port}");
    info!(port = port, "connecting to Chrome via CDP");
    let (browser, mut handler) = Browser::connect(&url)
        .await
        .with_context(|| format!("Failed to connect to Chrome on port {port}. Is Chrome running with --remote-debugging-port={port}?"))?;

    tokio::spawn(async move { while handler.next().await.is_some() {} });

    info!(port = port, "connected to Chrome");
    Ok(browser)
}

/// Launch a new headless Chrome instance.
pub async fn launch() -> Result<Browser> {
    info!("launching headless Chrome");
    let config = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch Chrome. Is Chrome/Chromium installed?")?;

    tokio::spawn(async move { while handler.next().await.is_some() {} });

    info!("headless Chrome launched");
    Ok(browser)
}

pub async fn connect_or_launch(launch_browser: bool, port: u16) -> Result<Browser> {
    if launch_browser {
        launch().await
    } else {
        connect(port).await
    }
}

/// A live page after layout, with computed visibility stamped into its markup.
pub struct RenderedPage {
    pub page: Page,
    pub html: String,
    pub final_url: String,
    pub hidden_marked: usize,
}

/// Navigate to a URL, mark hidden elements from fresh computed style and
/// return the rendered HTML.
pub async fn fetch_rendered(browser: &Browser, url: &str) -> Result<RenderedPage> {
    debug!(url = %url, "fetching page");
    let page = browser
        .new_page(url)
        .await
        .with_context(|| format!("Failed to navigate to {url}"))?;

    page.wait_for_navigation().await.ok();

    let hidden_marked = match page.evaluate(MARK_HIDDEN_JS).await {
        Ok(v) => v.into_value::<usize>().unwrap_or(0),
        Err(e) => {
            warn!(error = %e, attr = RENDERED_HIDDEN_ATTR, "could not stamp computed visibility; falling back to inline styles");
            0
        }
    };

    let html = page.content().await.context("Failed to get page content")?;

    let final_url = page
        .url()
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| url.to_string());

    debug!(final_url = %final_url, html_len = html.len(), hidden_marked, "page fetched");
    Ok(RenderedPage {
        page,
        html,
        final_url,
        hidden_marked,
    })
}

/// Outline the element at `selector` in the live page. `Ok(false)` when no
/// element could be found.
pub async fn highlight(page: &Page, selector: &str) -> Result<bool> {
    debug!(selector = %selector, "highlight");
    let js = highlight_js(selector);
    let result = page
        .evaluate(js.as_str())
        .await
        .context("Failed to run highlight script")?
        .into_value::<String>()
        .unwrap_or_default();
    Ok(result == "FOUND")
}
