//! # envfig demo application
//!
//! A sample CLI tool that shows how an application binds its configuration
//! from the environment with envfig. It exists to demonstrate and manually
//! check envfig's features, nothing more.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example envfig_demo -- echo
//! cargo run --example envfig_demo -- keys
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                              |
//! |--------------------------|---------------------------------------------------------------------------------|
//! | Conformed defaults       | `cargo run --example envfig_demo -- echo`                                       |
//! | Env var binding          | `DISPLAY_COLOR=red cargo run --example envfig_demo -- echo`                     |
//! | Nested env var           | `SERVER_PORT=9999 cargo run --example envfig_demo -- echo`                      |
//! | Env file seeding         | `cargo run --example envfig_demo -- --env-file demos/envfig_demo/demo.env echo` |
//! | Anchored env files       | `cargo run --example envfig_demo -- --anchor envfig_demo --env-file demo.env echo` |
//! | Explicit override        | `cargo run --example envfig_demo -- --set server.port=9090 echo`                |
//! | Conformance              | `DISPLAY_COLOR=' BLUE ' cargo run --example envfig_demo -- echo`                |
//! | Aggregated validation    | `SERVER_PORT=80 SERVER_HOST=nope cargo run --example envfig_demo -- echo`       |
//! | JSON violation report    | `SERVER_PORT=80 cargo run --example envfig_demo -- echo --json`                 |
//! | Composed key listing     | `cargo run --example envfig_demo -- keys`                                       |
//! | Single key echo          | `cargo run --example envfig_demo -- echo --key display.color`                   |
//! | Logging                  | `RUST_LOG=envfig=debug cargo run --example envfig_demo -- echo`                 |

mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envfig::{EnvArgs, Envfig, EnvfigBuilder, EnvfigError, compose};

use config::DemoConfig;

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// envfig demo: a sample CLI app that reads its configuration from the environment.
#[derive(Parser, Debug)]
#[command(name = "envfig-demo")]
struct Cli {
    #[command(flatten)]
    env: EnvArgs,

    /// Shorthand for --set verbose=true.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print resolved configuration values (colored by display.color).
    Echo {
        /// Print only this dotted key instead of all values.
        #[arg(long)]
        key: Option<String>,

        /// Report validation failures as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the environment variables the demo config binds.
    Keys,
}

// ---------------------------------------------------------------------------
// Builder helper
// ---------------------------------------------------------------------------

/// Create an [`EnvfigBuilder`] wired up for the demo app.
///
/// The shared flags (`--env-file`, `--anchor`, `--set`, ...) come from
/// [`EnvArgs`]; `--verbose` is mapped by hand.
fn make_builder(env: EnvArgs, verbose: bool) -> EnvfigBuilder<'static> {
    env.apply(Envfig::builder())
        .set_opt("verbose", verbose.then_some("true"))
}

// ---------------------------------------------------------------------------
// ANSI color helpers
// ---------------------------------------------------------------------------

/// Foreground escape for a validated `display.color`.
fn paint(name: &str) -> String {
    let code = match name {
        "red" => 31,
        "green" => 32,
        "yellow" => 33,
        "blue" => 34,
        "magenta" => 35,
        "cyan" => 36,
        "white" => 37,
        _ => 0,
    };
    format!("\x1b[{code}m")
}

const RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn entries(config: &DemoConfig) -> Vec<(&'static str, String)> {
    vec![
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        ("server.max_connections", config.server.max_connections.to_string()),
        ("server.read_timeout", format!("{:?}", config.server.read_timeout)),
        ("server.peers", config.server.peers.join(",")),
        ("display.color", config.display.color.clone()),
        ("display.format", config.display.format.clone()),
    ]
}

fn echo_all(config: &DemoConfig) {
    let color = paint(&config.display.color);

    if config.verbose {
        println!(
            "{color}[verbose] Resolved configuration for {:?}{RESET}",
            config.name
        );
        println!();
    }

    let entries = entries(config);
    if config.display.format == "plain" {
        for (key, value) in &entries {
            println!("{key}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

fn echo_key(config: &DemoConfig, key: &str) {
    let color = paint(&config.display.color);
    match entries(config).into_iter().find(|(k, _)| *k == key) {
        Some((key, value)) => println!("{color}{key}{RESET}  {value}"),
        None => {
            eprintln!("Unknown key: {key}");
            std::process::exit(1);
        }
    }
}

fn list_keys(tag: &str) {
    let bindings = compose::<DemoConfig>(tag).unwrap_or_else(|e| {
        eprintln!("Failed to compose keys:\n{e}");
        std::process::exit(1);
    });
    let max_len = bindings.iter().map(|b| b.path.len()).max().unwrap_or(0);
    for binding in &bindings {
        println!("{:<max_len$}  {}", binding.path, binding.env_key());
    }
}

fn report(err: &EnvfigError, json: bool) {
    match err.violations() {
        Some(violations) if json => println!("{}", violations.to_json()),
        Some(violations) => {
            eprintln!("Invalid configuration ({} problems):", violations.len());
            for violation in violations {
                eprintln!("  {violation}");
            }
        }
        None => eprintln!("Failed to load config:\n{err}"),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        env,
        verbose,
        command,
    } = Cli::parse();
    let tag = env.tag.clone().unwrap_or_else(|| envfig::DEFAULT_TAG.to_string());

    match command {
        Commands::Echo { key, json } => {
            let config: DemoConfig = make_builder(env, verbose).load().unwrap_or_else(|e| {
                report(&e, json);
                std::process::exit(1);
            });
            match key {
                Some(k) => echo_key(&config, &k),
                None => echo_all(&config),
            }
        }
        Commands::Keys => list_keys(&tag),
    }
}
