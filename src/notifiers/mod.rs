pub mod traits;
pub mod console;
pub mod notebrook;

pub use traits::Notifier;
pub use console::ConsoleNotifier;
pub use notebrook::NotebrookNotifier;
