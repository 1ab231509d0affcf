//! History windowing: which part of the log is sent to the backend.

use personachat_core::message::{Message, Role};

/// Reduce the full log to the context sent with one request.
///
/// System messages are always kept. Of the user/assistant dialog, only the
/// last `memory_turns * 2` messages survive (one turn is a user message plus
/// its reply). Relative order is preserved within each group and system
/// messages come first.
pub fn window(messages: &[Message], memory_turns: u32) -> Vec<Message> {
    let system = messages.iter().filter(|m| m.role == Role::System);
    if memory_turns == 0 {
        return system.cloned().collect();
    }

    let dialog: Vec<&Message> = messages.iter().filter(|m| m.role.is_dialog()).collect();
    let keep = (memory_turns as usize).saturating_mul(2);
    let start = dialog.len().saturating_sub(keep);

    system
        .chain(dialog[start..].iter().copied())
        .cloned()
        .collect()
}
