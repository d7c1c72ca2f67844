use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateVenue, PageQuery, UpdateVenue, Venue, VenueStats};

pub struct Venues<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Venues<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery) -> Result<Vec<Venue>, ApiError> {
        self.client.get_with("/venues", query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Venue, ApiError> {
        self.client.get(&format!("/venues/{id}")).await
    }

    pub async fn create(&self, input: &CreateVenue) -> Result<Venue, ApiError> {
        self.client.post("/venues", input).await
    }

    pub async fn update(&self, id: Uuid, input: &UpdateVenue) -> Result<Venue, ApiError> {
        self.client.patch(&format!("/venues/{id}"), input).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("/venues/{id}")).await
    }

    pub async fn stats(&self, id: Uuid) -> Result<VenueStats, ApiError> {
        self.client.get(&format!("/venues/{id}/stats")).await
    }
}
