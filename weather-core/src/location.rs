use async_trait::async_trait;

use crate::{error::LocationError, model::Coordinates};

/// Platform geolocation capability.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Reports a preconfigured home position; unsupported when none is set.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    home: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        self.home.ok_or(LocationError::Unsupported)
    }
}
