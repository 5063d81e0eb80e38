use std::{sync::Arc, time::Duration};

use anyhow::Result;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::{
    ai::{ClassifierService, CompletionClient},
    config::AppConfig,
    contexts::{ActiveTab, BackgroundContext, PageContext, PopupController},
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    messaging::{Endpoint, channel},
    page::{DocumentTree, SharedDocument, badge::badge_state, extractor::USER_NAME},
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RagebaitApp {
    _paths: ResolvedPaths,
    background: Endpoint,
    page: Endpoint,
    location: String,
    document: SharedDocument,
    background_handle: JoinHandle<()>,
    page_handle: JoinHandle<()>,
    shutdown: Shutdown,
}

impl RagebaitApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
        document: SharedDocument,
        location: String,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(format!("detect-ragebait/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        if config.openai.api_key.is_none() {
            tracing::warn!(target: "config", "OPENAI_API_KEY is not set; scoring will fail");
        }
        let completion = CompletionClient::new(http_client, config.openai.clone());
        let classifier = Arc::new(ClassifierService::new(completion));

        let (background, background_inbox) = channel("background");
        let background_handle =
            BackgroundContext::new(classifier).spawn(background_inbox, shutdown.subscribe());

        let (page, page_inbox) = channel("page");
        let page_handle = PageContext::new(document.clone(), location.clone())
            .spawn(page_inbox, shutdown.subscribe());

        Ok(Self {
            _paths: paths,
            background,
            page,
            location,
            document,
            background_handle,
            page_handle,
            shutdown,
        })
    }

    /// Opens the popup once over the loaded page, prints the outcome, then
    /// stops both contexts.
    pub async fn run(self) -> Result<()> {
        let RagebaitApp {
            _paths: _,
            background,
            page,
            location,
            document,
            background_handle,
            page_handle,
            shutdown,
        } = self;

        tracing::info!(%location, "detect-ragebait started");

        let (controller, _views) = PopupController::new(background);
        let tab = ActiveTab {
            url: Some(location),
            page,
        };

        let mut shutdown_listener = shutdown.subscribe();
        tokio::select! {
            _ = shutdown_listener.notified() => {
                tracing::info!("shutdown signal received before the popup finished");
            }
            view = controller.run(Some(&tab)) => {
                debug_assert!(view.is_terminal());
                println!("{view}");
                print_badges(&document);
            }
        }

        shutdown.trigger();
        join_context("background", background_handle).await;
        join_context("page", page_handle).await;

        tracing::info!("detect-ragebait finished");
        Ok(())
    }
}

fn print_badges(document: &SharedDocument) {
    let doc = document.lock();
    let identities = doc.select_all(doc.root(), USER_NAME);
    if identities.is_empty() {
        println!("\nNo identity elements on this page.");
        return;
    }

    println!("\nBadges:");
    for (index, node) in identities.into_iter().enumerate() {
        let name = doc.text_content(node);
        match badge_state(&*doc, node) {
            Some(state) => println!("  {}. {name}: {}", index + 1, state.level),
            None => println!("  {}. {name}: (none)", index + 1),
        }
    }
}

async fn join_context(name: &'static str, mut handle: JoinHandle<()>) {
    let wait = tokio::time::sleep(SHUTDOWN_TIMEOUT);
    tokio::pin!(wait);
    tokio::select! {
        res = &mut handle => {
            if let Err(err) = res {
                if err.is_panic() {
                    tracing::error!(context = name, "context task panicked");
                }
            }
        }
        _ = &mut wait => {
            tracing::warn!(
                context = name,
                "context did not stop within {:?}; aborting",
                SHUTDOWN_TIMEOUT
            );
            handle.abort();
        }
    }
}
