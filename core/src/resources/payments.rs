use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreatePayment, Payment, PaymentQuery, RefundRequest, UpdatePayment};

/// Payment endpoints. State transitions (process, refund, cancel) are
/// enforced by the backend; a disallowed transition comes back as an
/// `ApiError` with the backend's code.
pub struct Payments<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Payments<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PaymentQuery) -> Result<Vec<Payment>, ApiError> {
        self.client.get_with("/payments", query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.client.get(&format!("/payments/{id}")).await
    }

    pub async fn create(&self, input: &CreatePayment) -> Result<Payment, ApiError> {
        self.client.post("/payments", input).await
    }

    /// Only pending payments can be changed.
    pub async fn update(&self, id: Uuid, input: &UpdatePayment) -> Result<Payment, ApiError> {
        self.client.patch(&format!("/payments/{id}"), input).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("/payments/{id}")).await
    }

    pub async fn process(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.client
            .post_empty(&format!("/payments/{id}/process"))
            .await
    }

    pub async fn refund(&self, id: Uuid, request: &RefundRequest) -> Result<Payment, ApiError> {
        self.client
            .post(&format!("/payments/{id}/refund"), request)
            .await
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.client
            .post_empty(&format!("/payments/{id}/cancel"))
            .await
    }
}
