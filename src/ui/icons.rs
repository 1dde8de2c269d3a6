//! Shared UI icons with plain-text fallbacks for terminals without emoji.

use console::Emoji;

// Toast levels
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i] ");

// Board and distribution
pub static TASK: Emoji<'_, '_> = Emoji("📌 ", "- ");
pub static COLUMN: Emoji<'_, '_> = Emoji("📋 ", "# ");
pub static OVERDUE: Emoji<'_, '_> = Emoji("⏰ ", "! ");
pub static SELECTED: Emoji<'_, '_> = Emoji("☑️  ", "[x] ");
pub static UNSELECTED: Emoji<'_, '_> = Emoji("⬜ ", "[ ] ");
pub static SECTION_OPEN: Emoji<'_, '_> = Emoji("▾ ", "v ");
pub static SECTION_CLOSED: Emoji<'_, '_> = Emoji("▸ ", "> ");
