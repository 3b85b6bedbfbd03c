use clap::{Parser, Subcommand};
use folio::fault::{self, Fault};
use folio::site::Site;
use folio::{config, output};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Self-caching renderer for a personal website")]
#[command(long_about = "\
Self-caching renderer for a personal website

Posts and talks are Markdown files with TOML front matter. Every successful
response is written under public/ so the next request is served from disk.

Project structure:

  site.toml                        # Config (optional; see 'folio gen-config')
  resources/views/
  ├── posts/
  │   └── hello-world.md           # Served at /posts/hello-world
  └── talk/
      └── rust-meetup.md           # Served at /talk/rust-meetup
  public/
  ├── assets/                      # site.css, site.js, images
  └── ...                          # Page cache, written on first request
  cache/                           # Collection listings as JSON

Front matter:

  +++
  title = \"Hello world\"
  description = \"The first post\"
  date = \"2024-06-01\"
  +++

Run 'folio gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Project root containing site.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Local development: re-render every request and list hidden posts
    #[arg(long, global = true, env = "LOCAL", value_parser = clap::builder::FalseyValueParser::new())]
    local: bool,

    /// Override the configured base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle one request and write the HTTP response to stdout
    Request {
        /// Request method
        #[arg(long, default_value = "GET")]
        method: String,
        /// Request path, e.g. /posts/hello-world
        path: String,
    },
    /// Request every known route, warming the page cache
    Build,
    /// Validate every content file without rendering pages
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Request { method, path } => {
            let reply = match load_site(&cli) {
                Ok(site) => {
                    fault::install_panic_hook(site.error_log(), true);
                    site.respond(method, path)
                }
                Err(e) => {
                    let log = config::PathsConfig::default().error_log(&cli.root);
                    Fault::from_error(&e).report(&log)
                }
            };
            reply.write_to(io::stdout().lock())?;
        }
        Command::Build => {
            let site = load_site(&cli)?;
            let mode = if site.is_local() { "local" } else { "production" };
            println!(
                "==> Building {} ({mode}) → {}",
                site.base_url(),
                site.public_dir().display()
            );
            let built = site.build()?;
            output::print_build_output(&built, &site.public_dir());
            println!("==> Build complete");
        }
        Command::Check => {
            let site = load_site(&cli)?;
            println!(
                "==> Checking {} in {}",
                site.config().site.title,
                site.views_dir().display()
            );
            let inventory = site.inventory()?;
            output::print_check_output(&inventory, &site.views_dir());
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_site(cli: &Cli) -> folio::error::Result<Site> {
    let site = Site::load(&cli.root, cli.local)?;
    Ok(match &cli.base_url {
        Some(base_url) => site.with_base_url(base_url),
        None => site,
    })
}

/// Compact logs on stderr; stdout is reserved for command output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
