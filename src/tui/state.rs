// ABOUTME: TUI state types: chat messages, wallet snapshot, agent lists, history paging, input buffer.
// ABOUTME: Mutated only by the app loop; rendered by ui.rs and the widgets.

use std::ops::Range;

use crate::backend::{BlendAgent, ConversationEntry, ConversationHistory, Personality, UserAgent};
use crate::display::Pagination;
use crate::wallet::{SessionStatus, WalletSession};

/// The kind of a single chat message displayed in the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessageKind {
    User,
    Agent,
    System,
    Error,
}

/// A single message in the chat history.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub kind: ChatMessageKind,
    pub content: String,
}

/// How the user picked an agent with `/use`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentRef {
    /// 1-based position in the agents pane.
    Index(usize),
    Hash(String),
    /// All-digit input: an agent whose hash is exactly this wins, otherwise a position.
    Numeric(String),
}

/// Conversation history for one agent.
///
/// Pages are sized from the backend's total; only the window starting at
/// `offset` is held locally.
#[derive(Debug, Clone)]
pub struct HistoryView {
    pub nft_hash: String,
    pub wallet_address: String,
    pub creator: String,
    pub members: Vec<String>,
    pub personality: Personality,
    pub offset: usize,
    pub entries: Vec<ConversationEntry>,
    pub pagination: Pagination,
}

impl HistoryView {
    pub fn new(nft_hash: String, history: ConversationHistory, per_page: usize) -> Self {
        let total = history_total(&history);
        Self {
            nft_hash,
            wallet_address: history.wallet_address,
            creator: history.creator,
            members: history.members,
            personality: history.personality,
            offset: history.offset,
            entries: history.conversations,
            pagination: Pagination::new(per_page, total),
        }
    }

    /// Replace the loaded window and profile, keeping the current page in range.
    pub fn merge(&mut self, history: ConversationHistory) {
        self.pagination.set_total(history_total(&history));
        self.wallet_address = history.wallet_address;
        self.creator = history.creator;
        self.members = history.members;
        self.personality = history.personality;
        self.offset = history.offset;
        self.entries = history.conversations;
    }

    /// Global positions covered by the current page.
    pub fn page_range(&self) -> Range<usize> {
        let start = self.pagination.offset().min(self.pagination.total);
        let end = (start + self.pagination.per_page).min(self.pagination.total);
        start..end
    }

    /// Whether the loaded window covers the whole current page.
    pub fn page_loaded(&self) -> bool {
        let range = self.page_range();
        range.is_empty()
            || (range.start >= self.offset && range.end <= self.offset + self.entries.len())
    }

    /// Entries on the current page, or nothing when the page is not loaded.
    pub fn page_entries(&self) -> &[ConversationEntry] {
        if !self.page_loaded() {
            return &[];
        }
        let range = self.page_range();
        if range.is_empty() {
            return &[];
        }
        &self.entries[range.start - self.offset..range.end - self.offset]
    }
}

fn history_total(history: &ConversationHistory) -> usize {
    history
        .total_conversations
        .max(history.offset + history.conversations.len())
}

/// Full TUI application state.
pub struct TuiState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor_pos: usize,
    pub scroll_offset: u16,
    pub wallet: WalletSession,
    pub backend_url: String,
    pub agents: Vec<UserAgent>,
    pub selected_agent: Option<usize>,
    pub blend_agents: Vec<BlendAgent>,
    pub selected_blend: Option<usize>,
    pub history: Option<HistoryView>,
    pub history_page_size: usize,
    /// Backend calls still in flight.
    pub pending: usize,
}

impl TuiState {
    pub fn new(backend_url: String, history_page_size: usize) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            wallet: WalletSession::default(),
            backend_url,
            agents: Vec::new(),
            selected_agent: None,
            blend_agents: Vec::new(),
            selected_blend: None,
            history: None,
            history_page_size: history_page_size.max(1),
            pending: 0,
        }
    }

    /// Add a message to the chat history and reset scroll to bottom.
    pub fn push_message(&mut self, kind: ChatMessageKind, content: String) {
        self.messages.push(ChatMessage { kind, content });
        self.scroll_offset = 0;
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push_message(ChatMessageKind::System, content.into());
    }

    pub fn push_error(&mut self, content: impl Into<String>) {
        self.push_message(ChatMessageKind::Error, content.into());
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn begin_task(&mut self) {
        self.pending += 1;
    }

    pub fn finish_task(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Replace the wallet snapshot. Agent lists belong to an account, so they
    /// are cleared whenever the account changes.
    pub fn set_wallet(&mut self, wallet: WalletSession) {
        if wallet.account != self.wallet.account {
            self.clear_agents();
        }
        self.wallet = wallet;
    }

    pub fn account(&self) -> Option<&str> {
        self.wallet.account.as_deref()
    }

    pub fn wallet_status(&self) -> SessionStatus {
        self.wallet.status()
    }

    pub fn clear_agents(&mut self) {
        self.agents.clear();
        self.selected_agent = None;
        self.blend_agents.clear();
        self.selected_blend = None;
        self.history = None;
    }

    /// Replace the agent list, keeping the selection when the same hash is still present.
    pub fn set_agents(&mut self, agents: Vec<UserAgent>) {
        let previous = self.selected().map(|a| a.nft_hash.clone());
        self.agents = agents;
        self.selected_agent = previous
            .and_then(|hash| self.agents.iter().position(|a| a.nft_hash == hash))
            .or(if self.agents.is_empty() { None } else { Some(0) });
    }

    pub fn selected(&self) -> Option<&UserAgent> {
        self.selected_agent.and_then(|idx| self.agents.get(idx))
    }

    /// Select an agent by 1-based index or hash. Returns the selected hash.
    pub fn select_agent(&mut self, agent: &AgentRef) -> Option<String> {
        let idx = match agent {
            AgentRef::Index(n) => n.checked_sub(1).filter(|i| *i < self.agents.len())?,
            AgentRef::Hash(hash) => self.agents.iter().position(|a| &a.nft_hash == hash)?,
            AgentRef::Numeric(text) => match self.agents.iter().position(|a| &a.nft_hash == text) {
                Some(idx) => idx,
                None => text
                    .parse::<usize>()
                    .ok()?
                    .checked_sub(1)
                    .filter(|i| *i < self.agents.len())?,
            },
        };
        self.selected_agent = Some(idx);
        self.history = None;
        Some(self.agents[idx].nft_hash.clone())
    }

    pub fn set_blend_agents(&mut self, agents: Vec<BlendAgent>) {
        self.blend_agents = agents;
        self.selected_blend = if self.blend_agents.is_empty() {
            None
        } else {
            Some(
                self.selected_blend
                    .unwrap_or(0)
                    .min(self.blend_agents.len() - 1),
            )
        };
    }

    /// Select a blend agent by 1-based position.
    pub fn select_blend(&mut self, n: usize) -> Option<&BlendAgent> {
        let idx = n.checked_sub(1).filter(|i| *i < self.blend_agents.len())?;
        self.selected_blend = Some(idx);
        self.blend_agents.get(idx)
    }

    /// The selected blend agent together with its index in the list.
    pub fn selected_blend(&self) -> Option<(usize, &BlendAgent)> {
        let idx = self.selected_blend?;
        self.blend_agents.get(idx).map(|agent| (idx, agent))
    }

    /// Store a fetched history window, merging into the loaded view for the same agent.
    pub fn set_history(&mut self, nft_hash: String, history: ConversationHistory) {
        if let Some(view) = self.history.as_mut().filter(|v| v.nft_hash == nft_hash) {
            view.merge(history);
            return;
        }
        self.history = Some(HistoryView::new(
            nft_hash,
            history,
            self.history_page_size,
        ));
    }

    /// Submit the current input buffer. Returns the trimmed text if non-empty.
    pub fn submit_input(&mut self) -> Option<String> {
        let trimmed = self.input.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        self.input.clear();
        self.cursor_pos = 0;
        Some(trimmed)
    }

    /// Clamp the cursor position to the valid character range of the input buffer.
    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.input_char_len());
    }

    /// Return the current cursor byte index in the UTF-8 input buffer.
    pub fn cursor_byte_index(&self) -> usize {
        char_index_to_byte_index(&self.input, self.cursor_pos)
    }

    pub fn input_char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor and advance by one character.
    pub fn insert_char_at_cursor(&mut self, c: char) {
        self.clamp_cursor();
        let byte_index = self.cursor_byte_index();
        self.input.insert(byte_index, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace_char(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }

        let end = self.cursor_byte_index();
        let start = char_index_to_byte_index(&self.input, self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    /// Delete the character at the cursor.
    pub fn delete_char_at_cursor(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.input_char_len() {
            return;
        }

        let start = self.cursor_byte_index();
        let end = char_index_to_byte_index(&self.input, self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    pub fn move_cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos < self.input_char_len() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_char_len();
    }
}

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }

    match s.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => s.len(),
    }
}
