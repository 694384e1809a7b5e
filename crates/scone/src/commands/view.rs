//! `scone view` command implementation.
//!
//! Runs the viewer against the configured origin, mirrors the page into an
//! HTML file and reads interactive commands from stdin.

use std::path::PathBuf;

use clap::Args;
use scone_config::{CliSettings, Config};
use scone_renderer::{LinkRewriter, MarkdownRenderer, file_fragment};
use scone_viewer::{Viewer, ViewerEvent, ViewerOptions};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::CliError;
use crate::fetcher;
use crate::output::Output;
use crate::page::HtmlPageView;
use crate::storage::{FilePreferences, HistoryLocation};

const HELP: &str = "Commands:
  open <file>   open a document by path
  go <n>        open the n-th document in the navigation
  back          go back in history
  forward       go forward in history
  theme         toggle light/dark theme
  menu          toggle the sidebar
  close         close the sidebar
  esc           press Escape
  status        show the current document
  quit          exit";

/// Arguments for the view command.
#[derive(Args)]
pub(crate) struct ViewArgs {
    /// Path to configuration file (default: auto-discover scone.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document origin, a directory or http(s) URL (overrides config).
    #[arg(long)]
    origin: Option<String>,

    /// Rendered page output path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document to open first.
    #[arg(long)]
    open: Option<String>,

    /// Enable change polling (default: enabled).
    #[arg(long)]
    poll: Option<bool>,

    /// Disable change polling.
    #[arg(long, conflicts_with = "poll")]
    no_poll: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// A line typed on stdin.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open(String),
    Go(usize),
    Back,
    Forward,
    Theme,
    Menu,
    Close,
    Escape,
    Status,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let command = match name {
            "open" if !arg.is_empty() => Self::Open(arg.to_owned()),
            "open" => return Err("Usage: open <file>".to_owned()),
            "go" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => Self::Go(n),
                _ => return Err("Usage: go <n> (n starts at 1)".to_owned()),
            },
            "back" => Self::Back,
            "forward" => Self::Forward,
            "theme" => Self::Theme,
            "menu" => Self::Menu,
            "close" => Self::Close,
            "esc" | "escape" => Self::Escape,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("Unknown command: {other} (try 'help')")),
        };
        Ok(Some(command))
    }
}

impl ViewArgs {
    /// Execute the view command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the manifest cannot be
    /// loaded, or the page cannot be written.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let poll_enabled = self.resolve_poll_enabled();
        let cli_settings = CliSettings {
            origin: self.origin,
            output: self.output,
            poll_enabled,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Origin: {}", config.origin.display()));
        output.info(&format!("Page: {}", config.page_path.display()));
        if config.poll.enabled {
            output.info(&format!(
                "Change polling: every {}ms",
                config.poll.interval_ms
            ));
        } else {
            output.info("Change polling: disabled");
        }

        let initial = self.open.as_deref().map(file_fragment).unwrap_or_default();
        let location = HistoryLocation::new(&initial);
        let options = ViewerOptions {
            site_title: config.site.title.clone(),
            manifest_path: config.site.manifest.clone(),
            poll_enabled: config.poll.enabled,
            poll_interval: config.poll.interval(),
        };
        let renderer = build_renderer(&config);
        let page = HtmlPageView::new(&config.page_path).with_stylesheet(renderer.stylesheet());
        let mut viewer = Viewer::new(
            page,
            fetcher::for_origin(&config.origin),
            Box::new(location.clone()),
            Box::new(FilePreferences::open(&config.preferences_path)),
            options,
        )
        .with_renderer(renderer);
        viewer.view_mut().flush()?;

        let started = viewer.start().await;
        viewer.view_mut().flush()?;
        started?;

        output.success(&format!(
            "Viewer ready: open {} in a browser",
            viewer.view().path().display()
        ));
        output.info("Type 'help' for commands.");

        run_loop(&mut viewer, &location, &output).await
    }

    fn resolve_poll_enabled(&self) -> Option<bool> {
        self.no_poll.then_some(false).or(self.poll)
    }
}

fn build_renderer(config: &Config) -> MarkdownRenderer {
    let renderer = MarkdownRenderer::new().with_links(LinkRewriter::new(&config.site.docs_root));
    #[cfg(feature = "highlight")]
    let renderer = renderer.with_highlighter(scone_renderer::SyntectHighlighter::new());
    renderer
}

async fn run_loop(
    viewer: &mut Viewer<HtmlPageView>,
    location: &HistoryLocation,
    output: &Output,
) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match Command::parse(&line) {
                        Ok(Some(Command::Quit)) => break,
                        Ok(Some(command)) => apply(command, viewer, location, output),
                        Ok(None) => {}
                        Err(message) => output.warning(&message),
                    },
                    None => {
                        tracing::debug!("Stdin closed, running until interrupted");
                        stdin_open = false;
                    }
                }
            }
            () = viewer.step() => {}
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
        }
        viewer.view_mut().flush()?;
    }

    Ok(())
}

fn apply(
    command: Command,
    viewer: &mut Viewer<HtmlPageView>,
    location: &HistoryLocation,
    output: &Output,
) {
    match command {
        Command::Open(file) => viewer.dispatch(ViewerEvent::NavigationClicked(file)),
        Command::Go(n) => match viewer.navigation().document(n - 1).map(str::to_owned) {
            Some(file) => viewer.dispatch(ViewerEvent::NavigationClicked(file)),
            None => output.warning(&format!("No document #{n}")),
        },
        Command::Back => {
            if location.back() {
                viewer.dispatch(ViewerEvent::HashChanged);
            }
        }
        Command::Forward => {
            if location.forward() {
                viewer.dispatch(ViewerEvent::HashChanged);
            }
        }
        Command::Theme => viewer.dispatch(ViewerEvent::ToggleTheme),
        Command::Menu => viewer.dispatch(ViewerEvent::ToggleSidebar),
        Command::Close => viewer.dispatch(ViewerEvent::CloseSidebar),
        Command::Escape => viewer.dispatch(ViewerEvent::KeyPressed("Escape".to_owned())),
        Command::Status => {
            let current = viewer.current_file().unwrap_or("(none)");
            output.item("document", current);
            output.item("state", &format!("{:?}", viewer.document_state()));
            output.item("theme", viewer.shell().theme().as_str());
            output.item(
                "sidebar",
                if viewer.shell().sidebar_open() { "open" } else { "closed" },
            );
        }
        Command::Help => output.info(HELP),
        Command::Quit => {}
    }
}
