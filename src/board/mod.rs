//! Tribute page state: the submission form, the list, and the alert dialog.

use std::fmt::Write as _;

use tracing::{error, info};

use crate::client::TributeClient;
use crate::tribute::{Tribute, TributeKind, MAX_AUTHOR_CHARS};

pub mod modal;

pub use modal::{AlertModal, ScrollGuard, ScrollLock};

pub const MSG_EMPTY_INPUT: &str = "Please enter your message.";
pub const MSG_ADDED: &str = "Tribute added successfully!";
pub const MSG_FAILED: &str = "Failed to add tribute. Please try again later.";

pub struct TributeBoard {
    client: TributeClient,
    tributes: Vec<Tribute>,
    loading: bool,
    selected_kind: TributeKind,
    author_input: String,
    submitting: bool,
    alert: AlertModal,
    close_drawer_after_alert: bool,
}

impl TributeBoard {
    pub fn new(client: TributeClient, scroll: ScrollLock) -> Self {
        Self {
            client,
            tributes: Vec::new(),
            loading: false,
            selected_kind: TributeKind::default(),
            author_input: String::new(),
            submitting: false,
            alert: AlertModal::new(scroll),
            close_drawer_after_alert: false,
        }
    }

    pub fn tributes(&self) -> &[Tribute] {
        &self.tributes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn selected_kind(&self) -> TributeKind {
        self.selected_kind
    }

    pub fn author_input(&self) -> &str {
        &self.author_input
    }

    pub fn alert(&self) -> &AlertModal {
        &self.alert
    }

    pub fn select_kind(&mut self, kind: TributeKind) {
        if !self.submitting {
            self.selected_kind = kind;
        }
    }

    /// Mirror of the text input; anything past the length cap is cut off like a `maxLength` field.
    pub fn set_author(&mut self, input: &str) {
        if !self.submitting {
            self.author_input = input.chars().take(MAX_AUTHOR_CHARS).collect();
        }
    }

    /// Refresh the list. On failure the previous list stays on screen.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.client.fetch_tributes().await {
            Ok(tributes) => {
                info!("Loaded {} tributes", tributes.len());
                self.tributes = tributes;
            }
            Err(e) => error!("Error fetching tributes: {e}"),
        }
        self.loading = false;
    }

    /// Submit the form. Returns whether the tribute was stored.
    pub async fn submit(&mut self) -> bool {
        let author = self.author_input.trim().to_string();
        if author.is_empty() {
            self.alert.open(MSG_EMPTY_INPUT);
            return false;
        }

        self.submitting = true;
        let added = match self.client.add_tribute(self.selected_kind, &author).await {
            Ok(()) => {
                self.load().await;
                self.author_input.clear();
                self.selected_kind = TributeKind::default();
                self.close_drawer_after_alert = true;
                self.alert.open(MSG_ADDED);
                true
            }
            Err(e) => {
                error!("Error adding tribute: {e}");
                self.alert.open(MSG_FAILED);
                false
            }
        };
        self.submitting = false;
        added
    }

    /// Close the alert. Returns `true` when the surrounding drawer should close too.
    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.close();
        std::mem::take(&mut self.close_drawer_after_alert)
    }

    /// Plain-text rendering of the list section.
    pub fn render(&self) -> String {
        let mut out = format!("All Tributes ({})\n", self.tributes.len());
        if self.loading {
            out.push_str("Loading tributes...\n");
        } else if self.tributes.is_empty() {
            out.push_str("No tributes yet. Be the first to leave one!\n");
        } else {
            for tribute in &self.tributes {
                let _ = writeln!(out, "{} from {}", tribute.kind.label(), tribute.author);
            }
        }
        out
    }
}
