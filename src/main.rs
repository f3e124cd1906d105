use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use accname_audit::audit::{self, Document, RunReport};
use accname_audit::report::{self, FailOn, OutputFormat, ReportOptions};
use accname_audit::{browser, mcp};

#[derive(Parser)]
#[command(name = "accname-audit")]
#[command(about = "Compute accessible names and flag weak or missing ones")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit every named element of an HTML file, URL, or stdin
    Audit {
        /// HTML file path, URL (http/https), or '-' for stdin
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Leave passing elements out of the listing
        #[arg(long)]
        hide_passes: bool,

        /// Exit with status 1 when a result reaches this verdict
        #[arg(long, value_enum, default_value_t = FailOn::Fail)]
        fail_on: FailOn,

        /// Chrome debugging port (for URL mode)
        #[arg(short, long, default_value_t = 9222, env = "ACCNAME_CHROME_PORT")]
        port: u16,

        /// Launch a new headless Chrome instead of connecting
        #[arg(short, long)]
        launch: bool,
    },

    /// Show how the name of the elements matching a selector is computed
    Explain {
        /// HTML file path, URL (http/https), or '-' for stdin
        input: String,

        /// CSS selector of the elements to explain
        selector: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Chrome debugging port (for URL mode)
        #[arg(short, long, default_value_t = 9222, env = "ACCNAME_CHROME_PORT")]
        port: u16,

        /// Launch a new headless Chrome instead of connecting
        #[arg(short, long)]
        launch: bool,
    },

    /// Start as an MCP (Model Context Protocol) server over stdio
    Mcp {
        /// Chrome debugging port to connect to
        #[arg(short, long, default_value_t = 9222, env = "ACCNAME_CHROME_PORT")]
        port: u16,

        /// Launch a new headless Chrome instead of connecting
        #[arg(short, long)]
        launch: bool,
    },

    /// Start as an MCP server over HTTP (Streamable HTTP + SSE transport)
    McpHttp {
        /// Chrome debugging port to connect to
        #[arg(short, long, default_value_t = 9222, env = "ACCNAME_CHROME_PORT")]
        port: u16,

        /// Launch a new headless Chrome instead of connecting
        #[arg(short, long)]
        launch: bool,

        /// Host to bind the HTTP server to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to serve the MCP HTTP endpoint on
        #[arg(long, default_value_t = 8080)]
        http_port: u16,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            input,
            format,
            hide_passes,
            fail_on,
            port,
            launch,
        } => {
            info!(input = %input, ?format, "audit command");
            let report = match load(&input, port, launch) {
                Ok(document) => document.audit(),
                Err(e) => RunReport::failed(&e),
            };
            let output = report::render(&report, format, &ReportOptions { hide_passes })?;
            print!("{output}");
            if format == OutputFormat::Json {
                println!();
            }
            if fail_on.tripped(&report) {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Explain {
            input,
            selector,
            format,
            port,
            launch,
        } => {
            info!(input = %input, selector = %selector, "explain command");
            let document = load(&input, port, launch)?;
            let explained = audit::explain(&document.page(), &selector);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&explained)?),
                OutputFormat::Text => print!("{}", report::explanations_to_text(&explained)),
            }
            Ok(())
        }
        Commands::Mcp { port, launch } => {
            info!(port = port, launch = launch, "starting MCP server");
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(mcp::run_mcp_server(launch, port))
        }
        Commands::McpHttp {
            port,
            launch,
            host,
            http_port,
        } => {
            info!(port = port, launch = launch, host = %host, http_port = http_port, "starting MCP HTTP server");
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(mcp::run_mcp_http_server(launch, port, &host, http_port))
        }
    }
}

fn load(input: &str, port: u16, launch: bool) -> Result<Document> {
    if audit::is_url(input) {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(load_live(input, port, launch))
    } else {
        let html = audit::load_document(input)?;
        let url = if input == "-" { "" } else { input };
        Ok(Document {
            html,
            url: url.to_string(),
            rendered: false,
        })
    }
}

async fn load_live(url: &str, port: u16, launch: bool) -> Result<Document> {
    let browser = browser::connect_or_launch(launch, port).await?;
    let rendered = browser::fetch_rendered(&browser, url).await?;
    debug!(
        html_len = rendered.html.len(),
        final_url = %rendered.final_url,
        hidden = rendered.hidden_marked,
        "fetched page"
    );
    Ok(Document {
        html: rendered.html,
        url: rendered.final_url,
        rendered: true,
    })
}
