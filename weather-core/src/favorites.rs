//! Saved cities and their last known weather.
//!
//! The list is owned here and persisted under `favorite-cities` after every
//! change. Order is insertion order; refreshing never reorders.

use chrono::Utc;
use std::{collections::BTreeSet, sync::Arc};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::{
    error::WeatherError,
    model::{CurrentConditions, FavoriteCity},
    service::CityWeather,
    store::{PreferenceStore, keys},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefreshError {
    #[error("No favorite with id {0}")]
    UnknownFavorite(String),

    #[error("Refreshing {id} failed: {source}")]
    Lookup { id: String, source: WeatherError },
}

/// Outcome of a bulk refresh. Every favorite appears in exactly one list.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub updated: Vec<String>,
    pub failures: Vec<(String, WeatherError)>,
}

impl RefreshReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct FavoritesManager {
    store: PreferenceStore,
    favorites: Vec<FavoriteCity>,
}

impl FavoritesManager {
    /// Load the saved list; a missing or corrupt entry starts empty.
    pub fn load(store: PreferenceStore) -> Self {
        let favorites = store.get_json(keys::FAVORITE_CITIES).unwrap_or_default();
        Self { store, favorites }
    }

    pub fn list(&self) -> &[FavoriteCity] {
        &self.favorites
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteCity> {
        self.favorites.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn add(&mut self, current: &CurrentConditions) -> AddOutcome {
        let favorite = FavoriteCity::from_conditions(current, Utc::now());

        if self.contains(&favorite.id) {
            tracing::debug!(id = %favorite.id, "favorite already exists");
            return AddOutcome::AlreadyExists;
        }

        tracing::info!(id = %favorite.id, "adding favorite");
        self.favorites.push(favorite);
        self.save();
        AddOutcome::Added
    }

    /// Remove by id, returning the removed entry. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<FavoriteCity> {
        let pos = self.favorites.iter().position(|f| f.id == id)?;
        let removed = self.favorites.remove(pos);
        self.save();
        Some(removed)
    }

    /// Look one favorite up again. On failure the entry keeps its last known values.
    pub async fn refresh_one(&mut self, id: &str, source: &dyn CityWeather) -> Result<(), RefreshError> {
        let query = self
            .get(id)
            .map(FavoriteCity::query)
            .ok_or_else(|| RefreshError::UnknownFavorite(id.to_string()))?;

        match source.current_for_city(&query).await {
            Ok(current) => {
                self.apply(id, &current);
                self.save();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "favorite refresh failed");
                Err(RefreshError::Lookup { id: id.to_string(), source: err })
            }
        }
    }

    /// Refresh every favorite concurrently and wait for all of them to settle.
    ///
    /// A failing city keeps its last known values and is listed in the report;
    /// it never stops the others.
    pub async fn refresh_all(&mut self, source: Arc<dyn CityWeather>) -> RefreshReport {
        let mut report = RefreshReport::default();
        if self.favorites.is_empty() {
            return report;
        }

        let mut pending: BTreeSet<String> = BTreeSet::new();
        let mut tasks = JoinSet::new();

        for favorite in &self.favorites {
            let id = favorite.id.clone();
            let query = favorite.query();
            let source = Arc::clone(&source);
            pending.insert(id.clone());
            tasks.spawn(async move {
                let result = source.current_for_city(&query).await;
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(current))) => {
                    self.apply(&id, &current);
                    pending.remove(&id);
                    report.updated.push(id);
                }
                Ok((id, Err(e))) => {
                    tracing::warn!(%id, error = %e, "favorite refresh failed");
                    pending.remove(&id);
                    report.failures.push((id, e));
                }
                Err(e) => tracing::error!(error = %e, "favorite refresh task did not finish"),
            }
        }

        for id in pending {
            report
                .failures
                .push((id, WeatherError::Transport("refresh did not complete".into())));
        }

        self.save();
        tracing::info!(
            updated = report.updated.len(),
            failed = report.failures.len(),
            "favorites refreshed"
        );
        report
    }

    fn apply(&mut self, id: &str, current: &CurrentConditions) {
        if let Some(favorite) = self.favorites.iter_mut().find(|f| f.id == id) {
            favorite.temperature = current.temperature;
            favorite.description = current.description.clone();
            favorite.icon = current.icon;
            favorite.last_updated = Utc::now();
        }
    }

    fn save(&self) {
        self.store.set_json(keys::FAVORITE_CITIES, &self.favorites);
    }
}
