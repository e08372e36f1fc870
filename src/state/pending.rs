//! State of the dialogs that sit between a gesture and its network calls

use super::{KeyId, ProjectId};

/// What happens to the source key when dropped on another project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    #[default]
    Move,
    Copy,
}

impl MoveMode {
    pub fn is_copy(self) -> bool {
        matches!(self, Self::Copy)
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Move => Self::Copy,
            Self::Copy => Self::Move,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Copy => "Copy",
        }
    }

    /// Past tense used in notifications
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Move => "moved",
            Self::Copy => "copied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStage {
    /// Operator is picking move or copy
    ChoosingMode,
    /// Encrypted key; waiting on the password prompt
    AwaitingPassword,
}

/// A key dropped onto a foreign project, not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub key_id: KeyId,
    pub key_name: String,
    pub source_project: Option<ProjectId>,
    pub target_project: ProjectId,
    pub target_name: String,
    pub encrypted: bool,
    pub mode: MoveMode,
    pub stage: MoveStage,
}

/// Why the password prompt was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordAction {
    Copy,
    Move,
    Encrypt,
    Decrypt,
}

impl PasswordAction {
    pub fn title(self) -> &'static str {
        match self {
            Self::Copy => "Unlock key to copy",
            Self::Move => "Unlock key to move",
            Self::Encrypt => "Encrypt key",
            Self::Decrypt => "Decrypt key",
        }
    }

    /// Verb shown next to Enter in the prompt
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Copy | Self::Move => "unlock",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }

    /// Encrypting asks for the password twice
    pub fn needs_confirmation(self) -> bool {
        matches!(self, Self::Encrypt)
    }
}

/// Masked password input bound to one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPrompt {
    pub action: PasswordAction,
    pub key_id: KeyId,
    pub input: String,
    pub error: Option<String>,
    /// First entry while waiting for the confirmation
    pub first_entry: Option<String>,
}

impl PasswordPrompt {
    pub fn new(action: PasswordAction, key_id: KeyId) -> Self {
        Self {
            action,
            key_id,
            input: String::new(),
            error: None,
            first_entry: None,
        }
    }

    pub fn is_confirming(&self) -> bool {
        self.first_entry.is_some()
    }

    /// Take the entered password once it is final.
    ///
    /// For actions that need a confirmation the first call stashes the input
    /// and returns `None`; the second returns it only if both entries match.
    pub fn submit(&mut self) -> Option<String> {
        let input = std::mem::take(&mut self.input);
        if !self.action.needs_confirmation() {
            return Some(input);
        }
        match self.first_entry.take() {
            None if input.is_empty() => {
                self.error = Some("Password is required".to_string());
                None
            }
            None => {
                self.first_entry = Some(input);
                self.error = None;
                None
            }
            Some(first) if first == input => Some(input),
            Some(_) => {
                self.error = Some("Passwords do not match".to_string());
                None
            }
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Clear the input after a rejected password, keeping the prompt open
    pub fn reject(&mut self, message: impl Into<String>) {
        self.input.clear();
        self.error = Some(message.into());
    }

    pub fn masked(&self) -> String {
        "•".repeat(self.input.chars().count())
    }
}

/// Operator's answer to "what happens to this project's keys"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteChoice {
    #[default]
    Cancel,
    KeepKeys,
    DeleteKeys,
}

impl DeleteChoice {
    pub const ALL: [DeleteChoice; 3] = [Self::Cancel, Self::KeepKeys, Self::DeleteKeys];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cancel => "Cancel",
            Self::KeepKeys => "Delete project, keep keys (no project)",
            Self::DeleteKeys => "Delete project and all its keys",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Cancel => Self::KeepKeys,
            Self::KeepKeys => Self::DeleteKeys,
            Self::DeleteKeys => Self::Cancel,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Cancel => Self::DeleteKeys,
            Self::KeepKeys => Self::Cancel,
            Self::DeleteKeys => Self::KeepKeys,
        }
    }
}

/// Key deletion waiting for confirmation; defaults to not deleting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingKeyDelete {
    pub key_id: KeyId,
    pub key_name: String,
    pub confirmed: bool,
}

/// Project deletion awaiting the operator's choice about its keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingProjectDelete {
    pub project_id: ProjectId,
    pub project_name: String,
    pub choice: DeleteChoice,
}
