/// Status change notifications
///
/// The notifier decides *whether* a check is a transition; sinks decide
/// *where* the resulting event goes.
pub mod event;
pub mod notifier;
pub mod sink;

pub use event::{StatusEvent, TransitionKind};
pub use notifier::{ChangeNotifier, is_transition};
pub use sink::{DeliveryReport, DiscordSink, NotificationDispatcher, NotificationSink, WebhookSink};
