use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateParticipant, Participant, ParticipantQuery, UpdateParticipant};

pub struct Participants<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Participants<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ParticipantQuery) -> Result<Vec<Participant>, ApiError> {
        self.client.get_with("/participants", query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Participant, ApiError> {
        self.client.get(&format!("/participants/{id}")).await
    }

    pub async fn create(&self, input: &CreateParticipant) -> Result<Participant, ApiError> {
        self.client.post("/participants", input).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateParticipant,
    ) -> Result<Participant, ApiError> {
        self.client
            .patch(&format!("/participants/{id}"), input)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("/participants/{id}")).await
    }
}
