mod telegram;

pub use telegram::{Notifier, TelegramNotifier, MAX_MESSAGE_CHARS};
