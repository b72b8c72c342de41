//! Terminal implementations of the notification and configuration prompts.

use anyhow::{Context, Result};
use inquire::{Confirm, CustomType, Text};
use weather_core::{
    Config, Coordinates,
    notify::{Notification, NotificationSink, PermissionPrompt},
};

/// Prints notifications to stderr.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn deliver(&self, notification: &Notification) {
        eprintln!("[notification] {}: {}", notification.title, notification.body);
    }
}

#[derive(Debug, Default)]
pub struct ConfirmPrompt;

impl PermissionPrompt for ConfirmPrompt {
    fn ask(&self) -> bool {
        Confirm::new("Allow weather notifications?")
            .with_default(true)
            .prompt()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "notification prompt unavailable, treating as denied");
                false
            })
    }
}

/// Walk the user through the config file fields and return the updated config.
pub fn configure(mut config: Config) -> Result<Config> {
    let current = config.default_city.clone().unwrap_or_default();
    let city = Text::new("Default city:")
        .with_initial_value(&current)
        .with_help_message("Shown when no city is given; leave empty to always ask")
        .prompt()
        .context("Failed to read default city")?;
    config.set_default_city(&city);

    let set_home = Confirm::new("Set a home location for `weather show --here`?")
        .with_default(config.home.is_some())
        .prompt()
        .context("Failed to read home location choice")?;

    config.home = if set_home {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 50.45")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. 30.52")
            .prompt()
            .context("Failed to read longitude")?;
        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    Ok(config)
}
