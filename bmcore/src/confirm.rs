use crate::types::ChatId;

/// A staged destructive action awaiting user confirmation.
///
/// Carried as a value consumed by a single confirmation handler instead of a
/// stored callback, so nothing captures state that may be stale by the time
/// the user answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteConversation { id: ChatId },
}
