use std::sync::Arc;

use anyhow::Context as _;
use chromiumoxide::Browser;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::RwLock;

use tracing::{debug, info};

use crate::audit::{self, Document, RunReport};
use crate::report::{self, OutputFormat, ReportOptions};
use crate::browser;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AuditUrlParams {
    /// The URL to load and audit (e.g., "https://example.com")
    pub url: String,
    /// Leave passing elements out of the listing
    #[serde(default)]
    pub hide_passes: bool,
    /// Return the full result as JSON instead of the text report
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AuditHtmlParams {
    /// The HTML document to audit
    pub html: String,
    /// URL to report the document under
    #[serde(default)]
    pub url: Option<String>,
    /// Leave passing elements out of the listing
    #[serde(default)]
    pub hide_passes: bool,
    /// Return the full result as JSON instead of the text report
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SelectorParams {
    /// CSS selector, e.g. a css_selector value from an audit result
    pub selector: String,
}

struct AuditState {
    browser: Option<Browser>,
    live_page: Option<chromiumoxide::Page>,
    document: Option<Document>,
}

impl AuditState {
    fn new() -> Self {
        Self {
            browser: None,
            live_page: None,
            document: None,
        }
    }
}

#[derive(Clone)]
pub struct AccessibleNameServer {
    tool_router: ToolRouter<Self>,
    state: Arc<RwLock<AuditState>>,
    launch_browser: bool,
    port: u16,
}

#[tool_router]
impl AccessibleNameServer {
    pub fn new(launch_browser: bool, port: u16) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state: Arc::new(RwLock::new(AuditState::new())),
            launch_browser,
            port,
        }
    }

    #[tool(description = "Load a URL in Chrome and audit the accessible names of its images, form controls, buttons, links, landmarks and widgets. Each result is PASS, WARN or FAIL with a reason and a CSS selector.")]
    async fn audit_url(
        &self,
        Parameters(params): Parameters<AuditUrlParams>,
    ) -> String {
        match self.do_audit_url(&params).await {
            Ok(text) => text,
            Err(e) => format!("ERROR: Audit failed: {e:#}"),
        }
    }

    #[tool(description = "Audit the accessible names in an HTML document passed as a string. Visibility is judged from inline styles and the hidden attribute only.")]
    async fn audit_html(
        &self,
        Parameters(params): Parameters<AuditHtmlParams>,
    ) -> String {
        match self.do_audit_html(params).await {
            Ok(text) => text,
            Err(e) => format!("ERROR: Audit failed: {e:#}"),
        }
    }

    #[tool(description = "Explain how the accessible name of the elements matching a CSS selector was computed in the last audited document: name, source, diagnostics and verdict.")]
    async fn explain_element(
        &self,
        Parameters(params): Parameters<SelectorParams>,
    ) -> String {
        match self.do_explain(&params.selector).await {
            Ok(text) => text,
            Err(e) => format!("ERROR: Explain failed: {e:#}"),
        }
    }

    #[tool(description = "Scroll the element matching a CSS selector into view in the last audited live page and outline it.")]
    async fn highlight_element(
        &self,
        Parameters(params): Parameters<SelectorParams>,
    ) -> String {
        match self.do_highlight(&params.selector).await {
            Ok(text) => text,
            Err(e) => format!("ERROR: Highlight failed: {e:#}"),
        }
    }
}

#[tool_handler]
impl ServerHandler for AccessibleNameServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "accname-audit: accessible name checks for web pages. \
                 Use 'audit_url' to load a page in Chrome and audit it, or 'audit_html' for markup you already have. \
                 Results list a verdict, the element's CSS selector and what to fix. \
                 Use 'explain_element' with a selector to see how a name was computed. \
                 Use 'highlight_element' to outline an element in the live page."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn render(report: &RunReport, json: bool, hide_passes: bool) -> anyhow::Result<String> {
    let format = if json { OutputFormat::Json } else { OutputFormat::Text };
    report::render(report, format, &ReportOptions { hide_passes })
}

impl AccessibleNameServer {
    async fn ensure_browser(&self) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        if state.browser.is_some() {
            return Ok(());
        }

        info!(launch = self.launch_browser, port = self.port, "initializing browser connection");
        let b = browser::connect_or_launch(self.launch_browser, self.port).await?;
        state.browser = Some(b);
        info!("browser ready");
        Ok(())
    }

    async fn do_audit_url(&self, params: &AuditUrlParams) -> anyhow::Result<String> {
        info!(url = %params.url, "audit_url");
        self.ensure_browser().await?;

        let rendered = {
            let state = self.state.read().await;
            let browser = state.browser.as_ref().context("No browser")?;
            browser::fetch_rendered(browser, &params.url).await?
        };

        let document = Document {
            html: rendered.html,
            url: rendered.final_url,
            rendered: true,
        };
        let report = document.audit();

        let old = {
            let mut state = self.state.write().await;
            state.document = Some(document);
            state.live_page.replace(rendered.page)
        };
        if let Some(old) = old {
            old.close().await.ok();
        }
        render(&report, params.json, params.hide_passes)
    }

    async fn do_audit_html(&self, params: AuditHtmlParams) -> anyhow::Result<String> {
        let url = params.url.unwrap_or_default();
        debug!(html_len = params.html.len(), url = %url, "audit_html");
        let document = Document {
            html: params.html,
            url,
            rendered: false,
        };
        let report = document.audit();

        if matches!(report, RunReport::Completed(_)) {
            let mut state = self.state.write().await;
            state.document = Some(document);
        }
        render(&report, params.json, params.hide_passes)
    }

    async fn do_explain(&self, selector: &str) -> anyhow::Result<String> {
        debug!(selector = %selector, "explain_element");
        let state = self.state.read().await;
        let document = state
            .document
            .as_ref()
            .context("No document. Use audit_url or audit_html first.")?;
        let page = document.page();
        Ok(report::explanations_to_text(&audit::explain(&page, selector)))
    }

    async fn do_highlight(&self, selector: &str) -> anyhow::Result<String> {
        let state = self.state.read().await;
        let page = state
            .live_page
            .as_ref()
            .context("No live page. Use audit_url first.")?;
        if browser::highlight(page, selector).await? {
            Ok(format!("Highlighted {selector}"))
        } else {
            anyhow::bail!("No element matches {selector}")
        }
    }
}

pub async fn run_mcp_server(launch: bool, port: u16) -> anyhow::Result<()> {
    info!(launch = launch, port = port, "starting MCP server over stdio");
    let server = AccessibleNameServer::new(launch, port);

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP server")?;

    info!("MCP server running, waiting for requests");
    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}

pub async fn run_mcp_http_server(
    launch: bool,
    port: u16,
    host: &str,
    http_port: u16,
) -> anyhow::Result<()> {
    use rmcp::transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService,
        session::local::LocalSessionManager,
    };
    use tokio_util::sync::CancellationToken;

    let ct = CancellationToken::new();

    let service: StreamableHttpService<AccessibleNameServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(AccessibleNameServer::new(launch, port)),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                cancellation_token: ct.child_token(),
                ..Default::default()
            },
        );

    let router = axum::Router::new().nest_service("/mcp", service);

    let bind_addr = format!("{host}:{http_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    info!(addr = %bind_addr, "MCP HTTP server listening on http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .context("HTTP server error")?;

    info!("MCP HTTP server shut down");
    Ok(())
}
