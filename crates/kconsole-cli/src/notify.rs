use kconsole_form::Notifier;
use kconsole_types::NoticeLevel;

/// Prints notices to stderr, keeping stdout for command output.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let tag = match level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "i",
            NoticeLevel::Warning => "!",
            NoticeLevel::Error => "✗",
        };
        eprintln!("{tag} {message}");
    }
}
