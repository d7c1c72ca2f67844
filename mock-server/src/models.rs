//! Wire types served by the mock backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub role: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub capacity: u32,
    pub price: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgram {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub capacity: u32,
    pub price: u64,
    pub venue_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgram {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<u32>,
    pub price: Option<u64>,
    pub venue_id: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub program_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_phone: Option<String>,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipant {
    pub program_id: Uuid,
    pub name: String,
    pub birth_year: Option<u16>,
    pub guardian_phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParticipant {
    pub name: Option<String>,
    pub birth_year: Option<u16>,
    pub guardian_phone: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenue {
    pub name: String,
    pub address: String,
    pub capacity: u32,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVenue {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<u32>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueStats {
    pub venue_id: Uuid,
    pub program_count: u32,
    pub active_program_count: u32,
    pub participant_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub program_id: Uuid,
    pub amount: u64,
    pub refunded_amount: u64,
    pub method: String,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    pub participant_id: Uuid,
    pub program_id: Uuid,
    pub amount: u64,
    pub method: String,
}

#[derive(Deserialize)]
pub struct UpdatePayment {
    pub amount: Option<u64>,
    pub method: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub amount: Option<u64>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Filters accepted by the list endpoints. Each endpoint reads the subset
/// that applies to it.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub category: Option<String>,
    pub venue_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub status: Option<String>,
}

impl ListQuery {
    /// Applies `page` (1-based) and `limit` to an already filtered list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let Some(limit) = self.limit else {
            return items;
        };
        let page = self.page.unwrap_or(1).max(1);
        items
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect()
    }

    pub fn matches_search(&self, text: &str) -> bool {
        self.search
            .as_deref()
            .map_or(true, |search| text.to_lowercase().contains(&search.to_lowercase()))
    }
}

/// Arms the fault injector: the next `count` requests fail with `status`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Fault {
    pub status: u16,
    pub count: u32,
}
