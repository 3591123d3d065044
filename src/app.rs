// ABOUTME: App orchestrator: wires the wallet session manager, backend services, and TUI together.
// ABOUTME: Runs a single select! loop over terminal input, task completions, and wallet account changes.

use std::future::Future;
use std::sync::Arc;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::backend::{
    AigentService, BackendClient, BackendError, BlendAgent, BlendService, ConversationEntry,
    ConversationHistory, CreateAgentResponse, CreateAgentsResponse, InteractResponse,
    RunAgentRequest, RunAgentResponse, UserAgentsResponse,
};
use crate::config::Config;
use crate::display::{format_address, format_timestamp, short_hash};
use crate::identifier::derive_identifier;
use crate::tui::command::{Command, HELP_TEXT, HistoryPage, Submission, parse_submission};
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::{AgentRef, ChatMessageKind, TuiState};
use crate::tui::ui;
use crate::wallet::{
    AccountsCompletion, AccountsRequest, WalletProvider, WalletSession, WalletSessionManager,
};

/// Completions delivered back to the UI loop by spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
    Wallet(AccountsCompletion),
    /// A backend reply, tagged with the account it was requested for.
    Backend { account: String, reply: BackendReply },
}

#[derive(Debug)]
pub enum BackendReply {
    Agents(Result<UserAgentsResponse, BackendError>),
    BlendAgents(Result<Vec<BlendAgent>, BackendError>),
    Created {
        nft_hash: String,
        result: Result<CreateAgentResponse, BackendError>,
    },
    Interacted {
        nft_hash: String,
        result: Result<InteractResponse, BackendError>,
    },
    History {
        nft_hash: String,
        /// Zero-based page to show once loaded.
        page: usize,
        result: Result<ConversationHistory, BackendError>,
    },
    BlendCreated(Result<CreateAgentsResponse, BackendError>),
    Ran {
        agent: String,
        result: Result<RunAgentResponse, BackendError>,
    },
}

/// Top-level application state and handlers.
pub struct App {
    manager: WalletSessionManager,
    wallet_rx: watch::Receiver<WalletSession>,
    accounts_rx: Option<mpsc::UnboundedReceiver<Vec<String>>>,
    aigent: AigentService,
    blend: BlendService,
    state: TuiState,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    history_fetch_limit: usize,
    /// Agent to select once the next agent list arrives.
    pending_select: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        provider: Option<Arc<dyn WalletProvider>>,
    ) -> anyhow::Result<Self> {
        let client = BackendClient::new(config.backend.client_config())?;
        let manager = WalletSessionManager::new(provider);
        let wallet_rx = manager.watch();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = TuiState::new(client.base_url().to_string(), config.history.page_size);

        Ok(Self {
            manager,
            wallet_rx,
            accounts_rx: None,
            aigent: AigentService::new(client.clone()),
            blend: BlendService::new(client),
            state,
            events_tx,
            events_rx,
            history_fetch_limit: config.history.fetch_limit.max(1),
            pending_select: None,
            should_quit: false,
        })
    }

    pub fn state(&self) -> &TuiState {
        &self.state
    }

    pub fn manager(&self) -> &WalletSessionManager {
        &self.manager
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the application until the user quits.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal).await;
        ratatui::restore();
        self.manager.teardown();
        info!("chainclaw exiting");
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        let mut terminal_events = EventStream::new();
        self.start();

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &mut self.state))?;

            tokio::select! {
                maybe_event = terminal_events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        match handle_key(&mut self.state, key) {
                            InputResult::Submit(line) => self.handle_line(&line),
                            InputResult::Quit => self.should_quit = true,
                            InputResult::None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                accounts = next_accounts(&mut self.accounts_rx) => match accounts {
                    Some(accounts) => self.handle_accounts_changed(accounts),
                    None => self.accounts_rx = None,
                },
            }
        }
        Ok(())
    }

    /// Mount: register the account-change listener and issue the silent restore.
    pub fn start(&mut self) {
        self.state.push_system("Welcome to chainclaw. Type /help for commands.");
        if !self.manager.has_provider() {
            self.state
                .push_system("No wallet provider configured; pass --wallet-rpc to connect.");
        }
        self.accounts_rx = self.manager.subscribe();
        if let Some(request) = self.manager.begin_restore() {
            self.spawn_accounts(request);
        }
    }

    /// Wait for the next task completion. Used by tests that drive the app without a terminal.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    pub fn handle_line(&mut self, line: &str) {
        match parse_submission(line) {
            Ok(Submission::Prompt(prompt)) => self.send_prompt(prompt),
            Ok(Submission::Command(command)) => self.handle_command(command),
            Err(e) => self.state.push_error(e.to_string()),
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => self.connect(),
            Command::Disconnect => {
                if self.state.account().is_none() && !self.state.wallet.connecting {
                    self.state.push_system("No wallet connected.");
                } else {
                    self.manager.disconnect();
                }
            }
            Command::Agents => self.refresh_agents(),
            Command::Create { prompt } => {
                if let Some(account) = self.require_account() {
                    let nft_hash = derive_identifier(&account);
                    self.create_agent(account, nft_hash, prompt);
                }
            }
            Command::CreateWithHash { nft_hash, prompt } => {
                if let Some(account) = self.require_account() {
                    self.create_agent(account, nft_hash, prompt);
                }
            }
            Command::Use(agent) => self.use_agent(&agent),
            Command::UseBlend(n) => self.use_blend(n),
            Command::History(target) => self.show_history(target),
            Command::Blend { prompt } => self.create_blend(prompt),
            Command::Run { prompt } => self.run_blend(prompt),
            Command::Help => self.state.push_system(HELP_TEXT),
            Command::Quit => self.should_quit = true,
        }
        self.sync_wallet();
    }

    fn connect(&mut self) {
        match self.manager.begin_connect() {
            Ok(request) => {
                self.state.push_system("Waiting for the wallet to authorize an account...");
                self.spawn_accounts(request);
            }
            Err(e) => debug!(error = %e, "connect not started"),
        }
    }

    pub fn handle_accounts_changed(&mut self, accounts: Vec<String>) {
        self.manager.apply_accounts_changed(accounts);
        self.sync_wallet();
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Wallet(completion) => {
                if let Err(e) = self.manager.complete(completion) {
                    debug!(error = %e, "wallet completion not applied");
                }
            }
            AppEvent::Backend { account, reply } => {
                self.state.finish_task();
                if self.state.account() != Some(account.as_str()) {
                    debug!(account = %format_address(&account), "dropping backend reply for previous account");
                } else {
                    self.handle_reply(account, reply);
                }
            }
        }
        self.sync_wallet();
    }

    /// Pull the latest wallet snapshot into the view and surface any pending notice.
    fn sync_wallet(&mut self) {
        if let Some(notice) = self.manager.take_notice() {
            self.state.push_error(notice.to_string());
        }
        if !self.wallet_rx.has_changed().unwrap_or(false) {
            return;
        }
        let session = self.wallet_rx.borrow_and_update().clone();
        let previous = self.state.wallet.account.clone();
        self.state.set_wallet(session);

        if previous == self.state.wallet.account {
            return;
        }
        match self.state.wallet.account.clone() {
            Some(account) => {
                self.state
                    .push_system(format!("Connected as {}", format_address(&account)));
                self.refresh_agents();
            }
            None => {
                self.pending_select = None;
                self.state.push_system("Wallet disconnected.");
            }
        }
    }

    fn require_account(&mut self) -> Option<String> {
        let account = self.state.account().map(str::to_string);
        if account.is_none() {
            self.state.push_system("Connect a wallet first (/connect).");
        }
        account
    }

    fn spawn_accounts(&self, request: AccountsRequest) {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let completion = request.run().await;
            let _ = tx.send(AppEvent::Wallet(completion));
        });
    }

    fn spawn_backend<F>(&mut self, account: String, task: F)
    where
        F: Future<Output = BackendReply> + Send + 'static,
    {
        self.state.begin_task();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let reply = task.await;
            let _ = tx.send(AppEvent::Backend { account, reply });
        });
    }

    fn refresh_agents(&mut self) {
        let Some(account) = self.require_account() else {
            return;
        };
        let aigent = self.aigent.clone();
        let user = account.clone();
        self.spawn_backend(account.clone(), async move {
            BackendReply::Agents(aigent.user_agents(&user).await)
        });

        let blend = self.blend.clone();
        let user = account.clone();
        self.spawn_backend(account, async move {
            BackendReply::BlendAgents(blend.list_agents(&user).await)
        });
    }

    fn create_agent(&mut self, account: String, nft_hash: String, prompt: String) {
        self.state.push_system(format!(
            "Creating agent {}...",
            short_hash(&nft_hash, 12)
        ));
        let aigent = self.aigent.clone();
        let user = account.clone();
        self.spawn_backend(account, async move {
            let result = aigent.create_agent(&user, &nft_hash, &prompt).await;
            BackendReply::Created { nft_hash, result }
        });
    }

    fn use_agent(&mut self, agent: &AgentRef) {
        match self.state.select_agent(agent) {
            Some(hash) => {
                let label = self
                    .state
                    .selected()
                    .map(|a| a.label())
                    .unwrap_or_default();
                self.state
                    .push_system(format!("Selected {} ({})", label, short_hash(&hash, 12)));
            }
            None => self
                .state
                .push_error("No such agent; /agents lists what is available."),
        }
    }

    fn use_blend(&mut self, n: usize) {
        match self.state.select_blend(n).map(|a| a.name.clone()) {
            Some(name) => self.state.push_system(format!("Blend agent {n} ({name}) will handle /run.")),
            None => self
                .state
                .push_error("No such blend agent; /blend creates a team."),
        }
    }

    fn send_prompt(&mut self, prompt: String) {
        let Some(account) = self.require_account() else {
            return;
        };
        let Some(nft_hash) = self.state.selected().map(|a| a.nft_hash.clone()) else {
            self.state
                .push_system("No agent selected; /create one or /use <n>.");
            return;
        };
        self.state
            .push_message(ChatMessageKind::User, prompt.clone());
        let aigent = self.aigent.clone();
        let user = account.clone();
        self.spawn_backend(account, async move {
            let result = aigent.interact(&nft_hash, &user, &prompt).await;
            BackendReply::Interacted { nft_hash, result }
        });
    }

    fn show_history(&mut self, target: HistoryPage) {
        let Some(account) = self.require_account() else {
            return;
        };
        let Some(nft_hash) = self.state.selected().map(|a| a.nft_hash.clone()) else {
            self.state.push_system("No agent selected; /use <n> first.");
            return;
        };

        let view = self
            .state
            .history
            .as_mut()
            .filter(|h| h.nft_hash == nft_hash);
        let page = match (target, view) {
            (HistoryPage::First, _) => Ok(0),
            (HistoryPage::Page(n), Some(view)) => {
                view.pagination.goto(n - 1);
                Ok(view.pagination.page)
            }
            (HistoryPage::Page(n), None) => Ok(n - 1),
            (HistoryPage::Next, Some(view)) => view
                .pagination
                .next()
                .then_some(view.pagination.page)
                .ok_or("No more history pages in that direction."),
            (HistoryPage::Prev, Some(view)) => view
                .pagination
                .prev()
                .then_some(view.pagination.page)
                .ok_or("No more history pages in that direction."),
            (HistoryPage::Next | HistoryPage::Prev, None) => {
                Err("No history loaded yet; /history shows the first page.")
            }
        };
        let page = match page {
            Ok(page) => page,
            Err(message) => {
                self.state.push_system(message);
                return;
            }
        };
        if let HistoryPage::Page(n) = target
            && page != n - 1
        {
            let pages = self
                .state
                .history
                .as_ref()
                .map(|h| h.pagination.total_pages())
                .unwrap_or_default();
            self.state
                .push_system(format!("History has only {pages} page(s)."));
        }

        // Show from the loaded window when it already covers the page.
        let loaded = self
            .state
            .history
            .as_ref()
            .is_some_and(|h| h.nft_hash == nft_hash && h.page_loaded());
        if target != HistoryPage::First && loaded {
            self.render_history_page();
            return;
        }
        self.fetch_history(account, nft_hash, page);
    }

    /// Fetch the backend window starting at the first entry of `page` (zero-based).
    fn fetch_history(&mut self, account: String, nft_hash: String, page: usize) {
        let aigent = self.aigent.clone();
        let user = account.clone();
        let per_page = self.state.history_page_size;
        let offset = page * per_page;
        let limit = self.history_fetch_limit.max(per_page);
        self.spawn_backend(account, async move {
            let result = aigent
                .conversation_history(&nft_hash, &user, offset, limit)
                .await;
            BackendReply::History {
                nft_hash,
                page,
                result,
            }
        });
    }

    fn create_blend(&mut self, prompt: String) {
        let Some(account) = self.require_account() else {
            return;
        };
        self.state.push_system("Asking the blend manager for a team...");
        let blend = self.blend.clone();
        let user = account.clone();
        self.spawn_backend(account, async move {
            BackendReply::BlendCreated(blend.create_agents(&user, &prompt).await)
        });
    }

    fn run_blend(&mut self, prompt: String) {
        let Some(account) = self.require_account() else {
            return;
        };
        let Some((index, agent)) = self.state.selected_blend() else {
            self.state
                .push_system("No blend agents yet; /blend <prompt> creates some.");
            return;
        };
        let request = RunAgentRequest::for_agent(agent, index, prompt.clone());
        let name = agent.name.clone();
        self.state
            .push_message(ChatMessageKind::User, format!("[{}] {}", name, prompt));
        let blend = self.blend.clone();
        let user = account.clone();
        self.spawn_backend(account, async move {
            let result = blend.run_agent(&user, &request).await;
            BackendReply::Ran {
                agent: name,
                result,
            }
        });
    }

    fn handle_reply(&mut self, account: String, reply: BackendReply) {
        match reply {
            BackendReply::Agents(Ok(response)) => {
                let count = response.agents.len();
                self.state.set_agents(response.agents);
                if let Some(hash) = self.pending_select.take() {
                    self.state.select_agent(&AgentRef::Hash(hash));
                }
                self.state.push_system(format!(
                    "{} agent{} for {}",
                    count,
                    if count == 1 { "" } else { "s" },
                    format_address(&account)
                ));
            }
            BackendReply::Agents(Err(e)) => {
                warn!(error = %e, "failed to load agents");
                self.state.push_error(format!("Could not load agents: {e}"));
            }
            BackendReply::BlendAgents(Ok(agents)) => self.state.set_blend_agents(agents),
            BackendReply::BlendAgents(Err(e)) => {
                warn!(error = %e, "failed to load blend agents");
            }
            BackendReply::Created { nft_hash, result } => match result {
                Ok(created) => {
                    info!(nft_hash = %nft_hash, "agent created");
                    self.state.push_system(format!(
                        "Agent {} created with wallet {}",
                        short_hash(&nft_hash, 12),
                        format_address(&created.wallet_address)
                    ));
                    self.pending_select = Some(nft_hash);
                    self.refresh_agents();
                }
                Err(e) => self
                    .state
                    .push_error(format!("Could not create agent: {e}")),
            },
            BackendReply::Interacted { nft_hash, result } => match result {
                Ok(response) => {
                    self.state
                        .push_message(ChatMessageKind::Agent, response.response.clone());
                    if response.is_meta_mask {
                        let to = response
                            .wallet_address
                            .as_deref()
                            .map(format_address)
                            .unwrap_or_else(|| "an unknown address".to_string());
                        let value = response
                            .value
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "an unspecified amount".to_string());
                        self.state.push_system(format!(
                            "The agent asks for a transfer of {value} to {to}; approve it in your wallet."
                        ));
                    }
                    // Loaded history is now out of date.
                    if self
                        .state
                        .history
                        .as_ref()
                        .is_some_and(|h| h.nft_hash == nft_hash)
                    {
                        self.state.history = None;
                    }
                }
                Err(e) => self.state.push_error(format!("Agent error: {e}")),
            },
            BackendReply::History {
                nft_hash,
                page,
                result,
            } => match result {
                Ok(history) => {
                    self.state.set_history(nft_hash.clone(), history);
                    let Some(view) = self.state.history.as_mut() else {
                        return;
                    };
                    view.pagination.goto(page);
                    let shown = view.pagination.page;
                    let pages = view.pagination.total_pages();
                    if shown != page && !view.page_loaded() {
                        // Asked past the end; load the last page instead.
                        self.state
                            .push_system(format!("History has only {pages} page(s)."));
                        self.fetch_history(account, nft_hash, shown);
                        return;
                    }
                    self.render_history_page();
                }
                Err(e) => self
                    .state
                    .push_error(format!("Could not load history: {e}")),
            },
            BackendReply::BlendCreated(result) => match result {
                Ok(response) if response.success || !response.agents.is_empty() => {
                    let mut summary = format!("Blend created {} agent(s)", response.agents.len());
                    if !response.message.is_empty() {
                        summary.push_str(": ");
                        summary.push_str(&response.message);
                    }
                    for agent in &response.agents {
                        summary.push_str(&format!(
                            "\n{} [{}]",
                            agent.name,
                            agent.functions.join(", ")
                        ));
                    }
                    self.state.set_blend_agents(response.agents);
                    self.state.push_system(summary);
                }
                Ok(response) => self
                    .state
                    .push_error(format!("Blend failed: {}", response.message)),
                Err(e) => self.state.push_error(format!("Blend failed: {e}")),
            },
            BackendReply::Ran { agent, result } => match result {
                Ok(response) => self.state.push_message(
                    ChatMessageKind::Agent,
                    format!("[{}] {}", agent, response.display_text()),
                ),
                Err(e) => self.state.push_error(format!("Run failed: {e}")),
            },
        }
    }

    fn render_history_page(&mut self) {
        let Some(history) = self.state.history.as_ref() else {
            return;
        };
        let mut text = format!(
            "History for {} ({})",
            short_hash(&history.nft_hash, 12),
            history.pagination.label()
        );
        if !history.wallet_address.is_empty() {
            text.push_str(&format!(
                "\nAgent wallet: {}",
                format_address(&history.wallet_address)
            ));
        }
        if !history.creator.is_empty() {
            text.push_str(&format!("\nCreator: {}", format_address(&history.creator)));
        }
        if !history.members.is_empty() {
            text.push_str(&format!("\nMembers: {}", history.members.len()));
        }
        let personality = &history.personality;
        if !personality.description.trim().is_empty() {
            text.push_str(&format!("\nPersonality: {}", personality.description.trim()));
        }
        if !personality.concepts.is_empty() {
            text.push_str(&format!("\nConcepts: {}", personality.concepts.join(", ")));
        }

        let entries = history.page_entries();
        if entries.is_empty() {
            text.push_str("\nNo conversations yet.");
        }
        for entry in entries {
            match entry {
                ConversationEntry::Exchange {
                    question,
                    answer,
                    timestamp,
                } => {
                    if let Some(ts) = timestamp {
                        text.push_str(&format!("\n[{}]", format_timestamp(ts)));
                    }
                    text.push_str(&format!("\nQ: {question}\nA: {answer}"));
                }
                ConversationEntry::Raw { raw } => {
                    text.push_str(&format!("\n{raw}"));
                }
            }
        }

        let mut hints = Vec::new();
        if history.pagination.has_prev() {
            hints.push("/history prev");
        }
        if history.pagination.has_next() {
            hints.push("/history next");
        }
        if !hints.is_empty() {
            text.push_str(&format!("\nMore: {}", hints.join(" | ")));
        }
        self.state.push_system(text);
    }
}

async fn next_accounts(
    rx: &mut Option<mpsc::UnboundedReceiver<Vec<String>>>,
) -> Option<Vec<String>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
