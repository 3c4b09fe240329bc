//! String Utilities
//!
//! Shared constants for message roles and tool names, plus char-safe
//! preview helpers used when summarizing or logging message content.

// ============================================================================
// Message Role Constants
// ============================================================================

/// System role
pub const ROLE_SYSTEM: &str = "system";
/// User role
pub const ROLE_USER: &str = "user";
/// Assistant role
pub const ROLE_ASSISTANT: &str = "assistant";
/// Tool role
pub const ROLE_TOOL: &str = "tool";

// ============================================================================
// Tool Name Constants
// ============================================================================

/// Write tool name
pub const TOOL_WRITE: &str = "write";
/// Edit tool name
pub const TOOL_EDIT: &str = "edit";
/// Multi-edit tool name
pub const TOOL_MULTI_EDIT: &str = "multi_edit";
/// Patch tool name
pub const TOOL_APPLY_PATCH: &str = "apply_patch";

/// Tools whose calls modify files on disk
pub const FILE_MUTATING_TOOLS: &[&str] = &[TOOL_WRITE, TOOL_EDIT, TOOL_MULTI_EDIT, TOOL_APPLY_PATCH];

/// Argument keys that carry a file path
pub const PATH_ARGUMENT_KEYS: &[&str] = &["path", "file_path", "filePath", "filename"];

/// Whether a tool name refers to a file-mutating tool (case-insensitive)
pub fn is_file_mutating_tool(name: &str) -> bool {
    FILE_MUTATING_TOOLS
        .iter()
        .any(|tool| tool.eq_ignore_ascii_case(name))
}

// ============================================================================
// Preview
// ============================================================================

/// Truncate to at most `max_chars` characters, appending "..." when cut.
///
/// Leading and trailing whitespace is trimmed first. Never splits a UTF-8
/// character.
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    match chars.nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", trimmed[..byte_idx].trim_end()),
        None => trimmed.to_string(),
    }
}
