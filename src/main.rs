// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! cms-client command line
//!
//! Restores (or establishes) an admin session against the CMS backend and
//! prints the signed-in identity and the newest posts.

use anyhow::Context;
use cms_client::{config::Config, models::LoginCredentials, models::PageParams, CmsClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.api_base_url, "Starting CMS client");

    let client = CmsClient::from_config(config).context("Failed to build client")?;

    let session = client.auth.initialize().await;
    if !session.authenticated {
        let username = std::env::var("CMS_USERNAME")
            .context("Not signed in and CMS_USERNAME is not set")?;
        let password = std::env::var("CMS_PASSWORD")
            .context("Not signed in and CMS_PASSWORD is not set")?;

        client
            .auth
            .login(&LoginCredentials::new(username, password))
            .await
            .context("Login failed")?;
    }

    let session = client.session.current();
    if let Some(user) = &session.user {
        println!("Signed in as {} <{}> ({:?})", user.display_name, user.email, user.role);
    }

    let page = client
        .resources
        .posts
        .list(&PageParams::default())
        .await
        .context("Failed to list posts")?;

    println!(
        "Posts (page {} of {}, {} total):",
        page.info.current_page + 1,
        page.info.total_pages.max(1),
        page.info.total_count
    );
    for post in &page.items {
        let status = format!("{:?}", post.status);
        println!(
            "  #{:<6} {:<10} {}",
            post.id.unwrap_or_default(),
            status,
            post.title
        );
    }

    Ok(())
}

/// Initialize structured JSON logging to stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cms_client=info,warn")),
        )
        .with(format)
        .init();
}
