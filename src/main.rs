//! droidhome command-line entry point
//!
//! Thin CLI over the library crates: inspect the machine's toolchain, list
//! the packages in a manifest feed, and install a package.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use droidhome::installer::{InstallPhase, Installer, ProgressCallback};
use droidhome::sdk_repository::ManifestFeed;
use droidhome::ToolchainContext;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("status") => status(),
        Some("list") => {
            let source = args.get(1).context("usage: droidhome list <manifest>")?;
            list(source).await
        }
        Some("install") => {
            let [source, package, target] = match args.get(1..4) {
                Some([a, b, c]) => [a, b, c],
                _ => bail!("usage: droidhome install <manifest> <package> <target-dir>"),
            };
            install(source, package, PathBuf::from(target)).await
        }
        Some(other) => bail!("unknown command {other:?}; commands: status, list, install"),
    }
}

fn status() -> Result<()> {
    let context = ToolchainContext::new();

    match context.preferred_jdk() {
        Some(jdk) => {
            let version = jdk
                .version()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| "unknown version".to_string());
            info!("JDK {} at {:?} (via {})", version, jdk.home(), jdk.locator());
        }
        None => info!("No JDK found"),
    }
    match context.sdk_root() {
        Some(root) => info!("Android SDK at {:?}", root),
        None => info!("No Android SDK found"),
    }
    match context.ndk_root() {
        Some(root) => info!("Android NDK at {:?}", root),
        None => info!("No Android NDK found"),
    }
    if !context.is_complete() {
        info!("Missing: {}", context.missing_components().join(", "));
    }
    Ok(())
}

async fn list(source: &str) -> Result<()> {
    let mut feed = ManifestFeed::new();
    let client = reqwest::Client::new();
    feed.load(source, &client, &CancellationToken::new())
        .await
        .with_context(|| format!("failed to load manifest from {source}"))?;

    for package in feed.packages() {
        let revision = package
            .revision
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        info!(
            "{:<40} {:<12} {}",
            package.path,
            revision,
            package.display_name.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn install(source: &str, package: &str, target: PathBuf) -> Result<()> {
    let mut feed = ManifestFeed::new();
    let client = reqwest::Client::new();
    feed.load(source, &client, &CancellationToken::new())
        .await
        .with_context(|| format!("failed to load manifest from {source}"))?;

    let progress: ProgressCallback = Box::new(|phase, percent, message| {
        if phase == InstallPhase::Downloading {
            info!("[{}] {:>5.1}% {}", phase.as_str(), percent, message);
        } else {
            info!("[{}] {}", phase.as_str(), message);
        }
    });

    let installed = Installer::with_client(client)
        .install_package(&feed, package, &target, &CancellationToken::new(), Some(&progress))
        .await
        .with_context(|| format!("failed to install {package}"))?;
    info!("Installed {} to {:?}", package, installed);
    Ok(())
}
