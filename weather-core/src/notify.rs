//! Gate in front of the platform notification capability.
//!
//! The opt-in decision is persisted under `notifications-enabled`; nothing is
//! delivered unless it is granted.

use crate::store::{PreferenceStore, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Where delivered notifications end up.
pub trait NotificationSink {
    fn deliver(&self, notification: &Notification);
}

/// Asks the user whether notifications may be shown.
pub trait PermissionPrompt {
    fn ask(&self) -> bool;
}

#[derive(Debug)]
pub struct Notifier<S> {
    store: PreferenceStore,
    sink: S,
    supported: bool,
}

impl<S: NotificationSink> Notifier<S> {
    pub fn new(store: PreferenceStore, sink: S) -> Self {
        Self { store, sink, supported: true }
    }

    /// Notifier for a context without notification support; permission reads as denied.
    pub fn unsupported(store: PreferenceStore, sink: S) -> Self {
        Self { store, sink, supported: false }
    }

    pub fn permission(&self) -> Permission {
        if !self.supported {
            return Permission::Denied;
        }
        match self.store.get(keys::NOTIFICATIONS_ENABLED).as_deref() {
            Some("true") => Permission::Granted,
            Some("false") => Permission::Denied,
            _ => Permission::Default,
        }
    }

    pub fn is_permission_granted(&self) -> bool {
        self.permission() == Permission::Granted
    }

    /// Ask once; an earlier grant or denial is returned without prompting.
    pub fn request_permission(&self, prompt: &dyn PermissionPrompt) -> bool {
        match self.permission() {
            Permission::Granted => true,
            Permission::Denied => {
                if !self.supported {
                    tracing::warn!("notifications are not supported here");
                }
                false
            }
            Permission::Default => {
                let granted = prompt.ask();
                self.store.set(keys::NOTIFICATIONS_ENABLED, granted.to_string());
                granted
            }
        }
    }

    /// Forget the earlier decision so the next request prompts again.
    pub fn reset_permission(&self) {
        self.store.remove(keys::NOTIFICATIONS_ENABLED);
    }

    /// Deliver unless permission is missing. Returns whether it was delivered.
    pub fn show(&self, title: &str, body: &str) -> bool {
        if !self.is_permission_granted() {
            tracing::debug!(title, "notification suppressed, permission not granted");
            return false;
        }
        self.sink.deliver(&Notification { title: title.to_string(), body: body.to_string() });
        true
    }

    pub fn weather_changed(&self, city: &str, description: &str, temperature: i32) -> bool {
        self.show(&format!("Weather changed in {city}"), &format!("{description}, {temperature}°C"))
    }

    pub fn location_found(&self, city: &str) -> bool {
        self.show("Location found", &format!("Weather for {city} is now available"))
    }
}
