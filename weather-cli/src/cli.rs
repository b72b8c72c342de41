use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use weather_core::{
    AddOutcome, CityWeather, Config, Coordinates, FavoriteCity, FavoritesManager, PreferenceStore,
    RefreshError, SearchHistory, Settings, WeatherError, WeatherFeed, WeatherService,
    location::{FixedLocation, Geolocator},
    map,
    notify::Notifier,
};

use crate::{
    output,
    prompt::{self, ConfirmPrompt, TerminalSink},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard: current conditions, forecasts and favorites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the default city and home location.
    Configure,

    /// Show current conditions and the 5-day forecast.
    Show {
        /// City name; the configured default city when absent.
        city: Option<String>,

        /// Use the home location instead of a city.
        #[arg(long, conflicts_with = "city")]
        here: bool,
    },

    /// Show only the 5-day forecast for a city.
    Forecast {
        city: Option<String>,
    },

    /// List cities matching a partial name.
    Search {
        query: String,
    },

    /// Current conditions at a point, as if clicked on the map.
    At {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Current conditions at the default map markers.
    Map,

    /// Manage favorite cities (lists them by default).
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Recently searched cities.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Show or change display settings.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Notification permission.
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    /// Look a city up and save it.
    Add { city: String },
    /// Remove by id ("<city>-<country>").
    Remove { id: String },
    /// Refresh one favorite, or all of them when no id is given.
    Refresh { id: Option<String> },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    Show,
    /// Set one value, e.g. `weather settings set temperature-unit fahrenheit`.
    Set { key: String, value: String },
    /// Restore every setting to its default.
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsAction {
    Status,
    /// Ask for permission to show notifications.
    Enable,
    /// Forget the earlier answer.
    Reset,
}

/// Everything a command needs, built once per invocation.
struct AppContext {
    config: Config,
    store: PreferenceStore,
    settings: Settings,
    service: Arc<WeatherService>,
}

impl AppContext {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        let store = config.preference_store();
        let settings = Settings::load(&store);
        let service = Arc::new(WeatherService::from_config(&config)?);
        Ok(Self { config, store, settings, service })
    }

    fn notifier(&self) -> Notifier<TerminalSink> {
        Notifier::new(self.store.clone(), TerminalSink)
    }

    /// Explicit city (recorded in history) or the configured default.
    fn pick_city(&self, city: Option<String>) -> Result<String> {
        match city {
            Some(city) => {
                SearchHistory::new(self.store.clone()).record(&city);
                Ok(city)
            }
            None => Ok(self.config.default_city()?.to_string()),
        }
    }
}

fn report(what: &str, err: &WeatherError) {
    tracing::error!(error = %err, "{what} failed");
    eprintln!("Error loading {what}: {}", err.user_message());
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => {
                let config = prompt::configure(Config::load()?)?;
                config.save()?;
                println!("Saved configuration to {}", Config::config_file_path()?.display());
                Ok(())
            }
            other => dispatch(AppContext::load()?, other).await,
        }
    }
}

async fn dispatch(ctx: AppContext, command: Command) -> Result<()> {
    match command {
        // Handled in `Cli::run` before any context is loaded.
        Command::Configure => Ok(()),
        Command::Show { city, here } => show(&ctx, city, here).await,
        Command::Forecast { city } => {
            let city = ctx.pick_city(city)?;
            let days = ctx.service.forecast_for_city(&city).await.map_err(|e| anyhow!(e.user_message()))?;
            print!("{}", output::forecast(&days, &ctx.settings));
            Ok(())
        }
        Command::Search { query } => {
            let found = ctx.service.search_cities(&query).await.map_err(|e| anyhow!(e.user_message()))?;
            print!("{}", output::candidates(&found));
            Ok(())
        }
        Command::At { latitude, longitude } => {
            let coord = Coordinates::new(latitude, longitude);
            println!("Getting weather for this location...");
            let current = map::click(&ctx.service, coord)
                .await
                .map_err(|_| anyhow!("Unable to get weather for this location"))?;
            print!("{}", output::current(&current, &ctx.settings));
            Ok(())
        }
        Command::Map => {
            print!("{}", output::map_view(map::DEFAULT_CENTER, map::DEFAULT_ZOOM));
            for marker in map::default_markers() {
                match map::marker_weather(&ctx.service, &marker).await {
                    Ok(current) => println!(
                        "{:<10} {:>6}  {}",
                        marker.name,
                        ctx.settings.temperature_unit.format(current.temperature),
                        current.description
                    ),
                    Err(e) => println!("{:<10} unavailable ({})", marker.name, e.user_message()),
                }
            }
            Ok(())
        }
        Command::Favorites { action } => favorites(&ctx, action.unwrap_or(FavoritesAction::List)).await,
        Command::History { clear } => {
            let history = SearchHistory::new(ctx.store.clone());
            if clear {
                history.clear();
                println!("Search history cleared");
            } else {
                for city in history.entries() {
                    println!("{city}");
                }
            }
            Ok(())
        }
        Command::Settings { action } => settings(ctx, action.unwrap_or(SettingsAction::Show)),
        Command::Notifications { action } => {
            let notifier = ctx.notifier();
            match action {
                NotificationsAction::Status => println!("Notification permission: {}", notifier.permission()),
                NotificationsAction::Enable => {
                    if notifier.request_permission(&ConfirmPrompt) {
                        println!("Notifications enabled");
                    } else {
                        println!("Notifications are blocked");
                    }
                }
                NotificationsAction::Reset => {
                    notifier.reset_permission();
                    println!("Notification permission reset");
                }
            }
            Ok(())
        }
    }
}

async fn show(ctx: &AppContext, city: Option<String>, here: bool) -> Result<()> {
    let feed = WeatherFeed::new();
    let current_rx = feed.subscribe_current();
    let forecast_rx = feed.subscribe_forecast();

    let (current, forecast) = if here {
        let coords = FixedLocation::new(ctx.config.home)
            .locate()
            .await
            .context("Could not determine your location; set a home location with `weather configure`")?;
        let load = feed.load_at(ctx.service.as_ref(), coords).await;
        if let Ok(c) = &load.current {
            if ctx.settings.notifications {
                ctx.notifier().location_found(&c.display_name());
            }
        }
        (load.current, load.forecast)
    } else {
        let city = ctx.pick_city(city)?;
        let load = feed.load_city(ctx.service.as_ref(), &city).await;
        (load.current, load.forecast)
    };

    if let Some(c) = current_rx.borrow().as_ref() {
        print!("{}", output::current(c, &ctx.settings));
    }
    if !forecast_rx.borrow().is_empty() {
        println!();
        print!("{}", output::forecast(&forecast_rx.borrow(), &ctx.settings));
    }
    drop((current_rx, forecast_rx));

    match (&current, &forecast) {
        (Err(c), Err(f)) => {
            report("current weather", c);
            report("forecast data", f);
            bail!("No weather data could be loaded")
        }
        (Err(e), _) => {
            report("current weather", e);
            Ok(())
        }
        (_, Err(e)) => {
            report("forecast data", e);
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn favorites(ctx: &AppContext, action: FavoritesAction) -> Result<()> {
    let mut favs = FavoritesManager::load(ctx.store.clone());

    match action {
        FavoritesAction::List => print!("{}", output::favorites(favs.list(), &ctx.settings, Utc::now())),
        FavoritesAction::Add { city } => {
            let current = ctx.service.current_for_city(&city).await.map_err(|e| anyhow!(e.user_message()))?;
            match favs.add(&current) {
                AddOutcome::Added => println!("Added {} to favorites!", current.city),
                AddOutcome::AlreadyExists => println!("City is already in favorites!"),
            }
        }
        FavoritesAction::Remove { id } => match favs.remove(&id) {
            Some(removed) => println!("Removed {} from favorites", removed.name),
            None => bail!("No favorite with id '{id}'"),
        },
        FavoritesAction::Refresh { id: Some(id) } => {
            let before = favs.get(&id).map(|f| f.description.clone());
            favs.refresh_one(&id, ctx.service.as_ref()).await.map_err(|e| match e {
                RefreshError::Lookup { source, .. } => {
                    anyhow!("Error updating {id}: {}", source.user_message())
                }
                other => anyhow!(other),
            })?;
            if let Some(fav) = favs.get(&id) {
                println!("Updated {}", fav.name);
                notify_if_changed(ctx, before.as_deref(), fav);
            }
        }
        FavoritesAction::Refresh { id: None } => {
            let before: Vec<(String, String)> =
                favs.list().iter().map(|f| (f.id.clone(), f.description.clone())).collect();
            let source: Arc<dyn CityWeather> = ctx.service.clone();
            let result = favs.refresh_all(source).await;

            for (id, err) in &result.failures {
                eprintln!("Error updating {id}: {}", err.user_message());
            }
            for id in &result.updated {
                if let Some(fav) = favs.get(id) {
                    let old = before.iter().find(|(i, _)| i == id).map(|(_, d)| d.as_str());
                    notify_if_changed(ctx, old, fav);
                }
            }
            if result.is_complete_success() {
                println!("All favorites updated!");
            } else {
                println!("Updated {} of {} favorites", result.updated.len(), favs.list().len());
            }
        }
    }

    Ok(())
}

fn notify_if_changed(ctx: &AppContext, before: Option<&str>, fav: &FavoriteCity) {
    if !ctx.settings.notifications || before == Some(fav.description.as_str()) {
        return;
    }
    ctx.notifier().weather_changed(&fav.name, &fav.description, fav.temperature);
}

fn settings(ctx: AppContext, action: SettingsAction) -> Result<()> {
    let mut settings = ctx.settings;
    match action {
        SettingsAction::Show => {}
        SettingsAction::Set { key, value } => {
            settings.apply(&key, &value)?;
            settings.save(&ctx.store);
            println!("Settings saved successfully!");
        }
        SettingsAction::Reset => {
            settings.reset_to_defaults(&ctx.store);
            println!("Settings reset to defaults");
        }
    }

    for (key, value) in settings.entries() {
        println!("{key:<18} {value}");
    }
    if !ctx.store.is_available() {
        eprintln!("Note: no data directory available, settings are not persisted");
    }
    Ok(())
}
