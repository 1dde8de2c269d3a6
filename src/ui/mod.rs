pub mod icons;
pub mod progress;
pub mod render;
pub mod table;
pub mod toast;

pub use progress::with_spinner;
pub use table::terminal_width;
pub use toast::ConsoleNotifier;
