use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateProgram, Program, ProgramQuery, UpdateProgram};

pub struct Programs<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Programs<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ProgramQuery) -> Result<Vec<Program>, ApiError> {
        self.client.get_with("/programs", query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Program, ApiError> {
        self.client.get(&format!("/programs/{id}")).await
    }

    pub async fn create(&self, input: &CreateProgram) -> Result<Program, ApiError> {
        self.client.post("/programs", input).await
    }

    pub async fn update(&self, id: Uuid, input: &UpdateProgram) -> Result<Program, ApiError> {
        self.client.patch(&format!("/programs/{id}"), input).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("/programs/{id}")).await
    }

    /// Opens the program for enrollment.
    pub async fn activate(&self, id: Uuid) -> Result<Program, ApiError> {
        self.client
            .post_empty(&format!("/programs/{id}/activate"))
            .await
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<Program, ApiError> {
        self.client
            .post_empty(&format!("/programs/{id}/deactivate"))
            .await
    }
}
