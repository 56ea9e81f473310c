//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Chat transcript, dashboard snapshot, best-times lookup, data upload and
//! user switching. Reads immutable snapshots; all mutation goes through the
//! use cases and the identity binding.

use crate::adapters::identity::WatchIdentityBinding;
use crate::domain::{
    BestTimes, ChatLoadState, ChatSession, DashboardLoadState, DashboardView, DateRange,
    DomainError, MessageOrigin, PostingWindow, Role,
};
use crate::ports::outbound::IdentityPort;
use crate::ports::{AnalyticsGateway, InputPort};
use crate::usecases::{ChatSessionManager, DashboardAggregator, SendOutcome};
use async_trait::async_trait;
use inquire::{Select, Text};
use std::path::Path;
use std::sync::Arc;

const MENU_CHAT: &str = "Chat with the assistant";
const MENU_DASHBOARD: &str = "Dashboard";
const MENU_BEST_TIMES: &str = "Best posting times";
const MENU_UPLOAD: &str = "Upload data";
const MENU_SWITCH_USER: &str = "Switch user";
const MENU_QUIT: &str = "Quit";

const POST_TYPES: &[&str] = &["overall", "reel", "image", "carousel", "video"];

fn role_indicator(role: Role) -> &'static str {
    match role {
        Role::User => "[you]",
        Role::Assistant => "[bot]",
    }
}

/// Console adapter. Inquire prompts.
pub struct ConsoleInputPort {
    chat: Arc<ChatSessionManager>,
    dashboard: Arc<DashboardAggregator>,
    gateway: Arc<dyn AnalyticsGateway>,
    identity: Arc<WatchIdentityBinding>,
}

impl ConsoleInputPort {
    pub fn new(
        chat: Arc<ChatSessionManager>,
        dashboard: Arc<DashboardAggregator>,
        gateway: Arc<dyn AnalyticsGateway>,
        identity: Arc<WatchIdentityBinding>,
    ) -> Self {
        Self {
            chat,
            dashboard,
            gateway,
            identity,
        }
    }

    fn print_transcript(session: &ChatSession) {
        if session.load_state == ChatLoadState::HistoryFailed {
            println!("(could not load earlier messages; new questions still work)");
        }
        for msg in &session.messages {
            let pending = match msg.origin {
                MessageOrigin::LocalPending => " (sending...)",
                MessageOrigin::ServerConfirmed => "",
            };
            println!("{} {}{}", role_indicator(msg.role), msg.text, pending);
        }
    }

    async fn run_chat(&self) -> Result<(), DomainError> {
        Self::print_transcript(&self.chat.snapshot().await);
        println!("(empty input returns to the menu)");

        loop {
            let input = Text::new("You:")
                .prompt_skippable()
                .map_err(|e| DomainError::Input(e.to_string()))?;
            let Some(text) = input else { break };
            if text.trim().is_empty() {
                break;
            }

            match self.chat.send_message(&text).await {
                SendOutcome::Delivered | SendOutcome::Fallback => {
                    let session = self.chat.snapshot().await;
                    if let Some(reply) = session.last_message() {
                        println!("{} {}", role_indicator(reply.role), reply.text);
                    }
                }
                SendOutcome::Busy => println!("(still waiting for the previous reply)"),
                SendOutcome::RejectedEmpty => {}
                SendOutcome::Superseded => break,
            }
        }
        Ok(())
    }

    fn print_dashboard(view: &DashboardView) {
        println!("Dashboard ({})", view.date_range);
        match view.load_state {
            DashboardLoadState::Idle | DashboardLoadState::Loading => {
                println!("  still loading...");
                return;
            }
            DashboardLoadState::Failed => {
                println!("  could not load dashboard data; try refreshing");
                return;
            }
            DashboardLoadState::PartiallyLoaded => {
                println!("  (some sources failed; showing what loaded)");
            }
            DashboardLoadState::Loaded => {}
        }

        if let Some(metrics) = &view.metrics {
            println!("  Total engagements:    {}", metrics.total_engagements);
            println!("  Avg engagement rate:  {}%", metrics.avg_engagement_rate);
            println!("  Best post type:       {}", metrics.best_post_type);
            println!("  Best posting time:    {}", metrics.best_time_overall);
        }
        if let Some(recommendations) = &view.recommendations {
            println!("  Recommendations:");
            for (i, rec) in recommendations.iter().enumerate() {
                println!("    {}. {}", i + 1, rec);
            }
        }
    }

    async fn run_dashboard(&self) -> Result<(), DomainError> {
        let current = self.dashboard.view().await.date_range;
        let options: Vec<String> = DateRange::ALL.iter().map(|r| r.to_string()).collect();
        let selected = Select::new("Reporting window", options)
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let range = DateRange::ALL
            .into_iter()
            .find(|r| r.to_string() == selected)
            .unwrap_or(current);

        if range == current {
            self.dashboard.refresh().await;
        } else {
            self.dashboard.set_date_range(range).await;
        }

        Self::print_dashboard(&self.dashboard.view().await);
        Ok(())
    }

    fn print_window(kind: &str, window: &PostingWindow) {
        println!(
            "  {}: {} {} ({})",
            kind, window.day, window.time, window.reason
        );
    }

    async fn run_best_times(&self) -> Result<(), DomainError> {
        let selected = Select::new("Post type", POST_TYPES.to_vec())
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let post_type = (selected != "overall").then_some(selected);

        match self.gateway.best_times(post_type).await {
            Ok(BestTimes::ForType(window)) => Self::print_window(selected, &window),
            Ok(BestTimes::Overall(map)) => {
                let mut kinds: Vec<&String> = map.keys().collect();
                kinds.sort();
                for kind in kinds {
                    if let Some(window) = map.get(kind) {
                        Self::print_window(kind, window);
                    }
                }
            }
            Err(e) => println!("could not fetch best times: {e}"),
        }
        Ok(())
    }

    async fn run_upload(&self) -> Result<(), DomainError> {
        let path = Text::new("Path to data file:")
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let path = Path::new(path.trim());

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("could not read {}: {}", path.display(), e);
                return Ok(());
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.csv");

        match self.gateway.upload(file_name, bytes).await {
            Ok(receipt) => println!("{}: {}", receipt.status, receipt.message),
            Err(e) => println!("upload failed: {e}"),
        }
        Ok(())
    }

    async fn run_switch_user(&self) -> Result<(), DomainError> {
        let user = Text::new("User id (empty to sign out):")
            .prompt_skippable()
            .map_err(|e| DomainError::Input(e.to_string()))?;

        match user.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            Some(user) => {
                let token = Text::new("Bearer token (optional):")
                    .prompt_skippable()
                    .map_err(|e| DomainError::Input(e.to_string()))?
                    .filter(|t| !t.trim().is_empty());
                self.identity.login(user.as_str().into(), token);
            }
            None => self.identity.logout(),
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for ConsoleInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let user = self
                .identity
                .current_identity()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "not signed in".to_string());

            let choice = Select::new(
                &format!("pulseboard ({user})"),
                vec![
                    MENU_CHAT,
                    MENU_DASHBOARD,
                    MENU_BEST_TIMES,
                    MENU_UPLOAD,
                    MENU_SWITCH_USER,
                    MENU_QUIT,
                ],
            )
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;

            match choice {
                MENU_CHAT => self.run_chat().await?,
                MENU_DASHBOARD => self.run_dashboard().await?,
                MENU_BEST_TIMES => self.run_best_times().await?,
                MENU_UPLOAD => self.run_upload().await?,
                MENU_SWITCH_USER => self.run_switch_user().await?,
                _ => break,
            }
        }
        Ok(())
    }
}
