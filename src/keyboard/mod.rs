/*!
 * Keyboard Shortcuts
 * Canonical key combinations and foreground-only shortcut routing
 */

mod combo;
mod router;
mod types;

pub use combo::KeyCombo;
pub use router::ShortcutRouter;
pub use types::{
    DispatchOutcome, RouterState, ShortcutConfig, ShortcutHandler, ShortcutStats, ShortcutTable,
};
