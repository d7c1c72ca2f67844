use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateUser, UpdateUser, User, UserQuery};

pub struct Users<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Users<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Vec<User>, ApiError> {
        self.client.get_with("/users", query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.client.get(&format!("/users/{id}")).await
    }

    pub async fn create(&self, input: &CreateUser) -> Result<User, ApiError> {
        self.client.post("/users", input).await
    }

    pub async fn update(&self, id: Uuid, input: &UpdateUser) -> Result<User, ApiError> {
        self.client.patch(&format!("/users/{id}"), input).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("/users/{id}")).await
    }
}
