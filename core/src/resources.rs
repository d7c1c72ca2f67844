//! Typed facades over the REST endpoints, one per resource.
//!
//! Each method maps to exactly one endpoint and verb. Obtain a facade from
//! the client, e.g. `client.users().list(&query)`.

mod auth;
mod participants;
mod payments;
mod programs;
mod users;
mod venues;

pub use self::{
    auth::Auth, participants::Participants, payments::Payments, programs::Programs, users::Users,
    venues::Venues,
};

#[cfg(test)]
mod tests {
    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::http::{HttpMethod, HttpRequest};
    use crate::transport::{StubStep, StubTransport};
    use crate::types::*;
    use crate::value::{Email, Won};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    const BASE_URL: &str = "http://localhost:3000/api";
    const ID: &str = "00000000-0000-0000-0000-000000000001";

    fn id() -> Uuid {
        Uuid::parse_str(ID).unwrap()
    }

    fn user_json() -> Value {
        json!({
            "id": ID,
            "email": "admin@connectwon.kr",
            "name": "관리자",
            "role": "admin",
            "isActive": true
        })
    }

    fn program_json() -> Value {
        json!({
            "id": ID,
            "title": "미술 치료",
            "category": "art",
            "capacity": 12,
            "price": 30000,
            "isActive": true
        })
    }

    fn payment_json(status: &str) -> Value {
        json!({
            "id": ID,
            "participantId": ID,
            "programId": ID,
            "amount": 30000,
            "method": "card",
            "status": status
        })
    }

    /// Client whose transport answers every request with `{ data: payload }`.
    fn client_replying(
        payloads: impl IntoIterator<Item = Option<Value>>,
    ) -> (ApiClient<Arc<StubTransport>>, Arc<StubTransport>) {
        let stub = Arc::new(StubTransport::new(payloads.into_iter().map(|payload| {
            match payload {
                Some(payload) => {
                    StubTransport::respond(200, &json!({ "data": payload }).to_string())
                }
                None => StubTransport::respond(204, ""),
            }
        })));
        let client = ApiClient::with_transport(
            ClientConfig::new(BASE_URL).with_retries(0),
            stub.clone(),
        );
        (client, stub)
    }

    fn assert_request(request: &HttpRequest, method: HttpMethod, path: &str) {
        assert_eq!(request.method, method);
        assert_eq!(request.url, format!("{BASE_URL}{path}"));
    }

    fn body(request: &HttpRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn auth_endpoints() {
        let (client, stub) = client_replying([
            Some(json!({
                "accessToken": "a",
                "refreshToken": "r",
                "expiresIn": 3600,
                "user": user_json()
            })),
            Some(user_json()),
            Some(json!({"accessToken": "b", "refreshToken": "s", "expiresIn": 3600})),
            None,
            None,
            None,
        ]);
        let auth = client.auth();

        let login = auth
            .login(&LoginRequest {
                email: Email::parse("admin@connectwon.kr").unwrap(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.tokens.access_token, "a");
        assert_eq!(auth.me().await.unwrap().name, "관리자");
        assert_eq!(auth.refresh("r").await.unwrap().access_token, "b");
        auth.change_password(&ChangePasswordRequest {
            current_password: "secret".to_string(),
            new_password: "secret2".to_string(),
        })
        .await
        .unwrap();
        auth.reset_password(&ResetPasswordRequest {
            email: Email::parse("admin@connectwon.kr").unwrap(),
        })
        .await
        .unwrap();
        auth.logout().await.unwrap();

        let requests = stub.requests();
        assert_request(&requests[0], HttpMethod::Post, "/auth/login");
        assert_eq!(
            body(&requests[0]),
            json!({"email": "admin@connectwon.kr", "password": "secret"})
        );
        assert_request(&requests[1], HttpMethod::Get, "/auth/me");
        assert_request(&requests[2], HttpMethod::Post, "/auth/refresh");
        assert_eq!(body(&requests[2]), json!({"refreshToken": "r"}));
        assert_request(&requests[3], HttpMethod::Post, "/auth/change-password");
        assert_request(&requests[4], HttpMethod::Post, "/auth/reset-password");
        assert_request(&requests[5], HttpMethod::Post, "/auth/logout");
        assert_eq!(requests[5].body, None);
    }

    #[tokio::test]
    async fn user_endpoints() {
        let (client, stub) = client_replying([
            Some(json!([user_json()])),
            Some(user_json()),
            Some(user_json()),
            Some(user_json()),
            None,
        ]);
        let users = client.users();

        let listed = users
            .list(&UserQuery {
                role: Some(UserRole::Admin),
                page: PageQuery {
                    limit: Some(20),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        users.get(id()).await.unwrap();
        users
            .create(&CreateUser {
                email: Email::parse("kim@connectwon.kr").unwrap(),
                name: "김요양".to_string(),
                role: UserRole::Caregiver,
                password: "pw".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        users
            .update(
                id(),
                &UpdateUser {
                    name: Some("박관리".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        users.delete(id()).await.unwrap();

        let requests = stub.requests();
        assert_request(&requests[0], HttpMethod::Get, "/users?limit=20&role=admin");
        assert_request(&requests[1], HttpMethod::Get, &format!("/users/{ID}"));
        assert_request(&requests[2], HttpMethod::Post, "/users");
        assert_request(&requests[3], HttpMethod::Patch, &format!("/users/{ID}"));
        assert_eq!(body(&requests[3]), json!({"name": "박관리"}));
        assert_request(&requests[4], HttpMethod::Delete, &format!("/users/{ID}"));
    }

    #[tokio::test]
    async fn program_endpoints() {
        let (client, stub) = client_replying([
            Some(json!([])),
            Some(program_json()),
            Some(program_json()),
            Some(program_json()),
            Some(program_json()),
            Some(program_json()),
            None,
        ]);
        let programs = client.programs();

        programs.list(&ProgramQuery::default()).await.unwrap();
        programs.get(id()).await.unwrap();
        programs
            .create(&CreateProgram {
                title: "미술 치료".to_string(),
                description: String::new(),
                category: ProgramCategory::Art,
                capacity: 12,
                price: Won::new(30_000),
                venue_id: None,
            })
            .await
            .unwrap();
        programs
            .update(id(), &UpdateProgram::default())
            .await
            .unwrap();
        programs.activate(id()).await.unwrap();
        programs.deactivate(id()).await.unwrap();
        programs.delete(id()).await.unwrap();

        let requests = stub.requests();
        assert_request(&requests[0], HttpMethod::Get, "/programs");
        assert_request(&requests[1], HttpMethod::Get, &format!("/programs/{ID}"));
        assert_request(&requests[2], HttpMethod::Post, "/programs");
        assert_eq!(body(&requests[2])["price"], json!(30000));
        assert_request(&requests[3], HttpMethod::Patch, &format!("/programs/{ID}"));
        assert_request(&requests[4], HttpMethod::Post, &format!("/programs/{ID}/activate"));
        assert_request(&requests[5], HttpMethod::Post, &format!("/programs/{ID}/deactivate"));
        assert_request(&requests[6], HttpMethod::Delete, &format!("/programs/{ID}"));
    }

    #[tokio::test]
    async fn participant_endpoints() {
        let participant = json!({
            "id": ID,
            "programId": ID,
            "name": "이순자",
            "status": "registered"
        });
        let (client, stub) = client_replying([
            Some(json!([participant])),
            Some(participant.clone()),
            Some(participant.clone()),
            Some(participant.clone()),
            None,
        ]);
        let participants = client.participants();

        participants
            .list(&ParticipantQuery {
                program_id: Some(id()),
                ..Default::default()
            })
            .await
            .unwrap();
        participants.get(id()).await.unwrap();
        participants
            .create(&CreateParticipant {
                program_id: id(),
                name: "이순자".to_string(),
                birth_year: Some(1942),
                guardian_phone: None,
            })
            .await
            .unwrap();
        participants
            .update(
                id(),
                &UpdateParticipant {
                    status: Some(ParticipantStatus::Attending),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        participants.delete(id()).await.unwrap();

        let requests = stub.requests();
        assert_request(&requests[0], HttpMethod::Get, &format!("/participants?programId={ID}"));
        assert_request(&requests[1], HttpMethod::Get, &format!("/participants/{ID}"));
        assert_request(&requests[2], HttpMethod::Post, "/participants");
        assert_request(&requests[3], HttpMethod::Patch, &format!("/participants/{ID}"));
        assert_eq!(body(&requests[3]), json!({"status": "attending"}));
        assert_request(&requests[4], HttpMethod::Delete, &format!("/participants/{ID}"));
    }

    #[tokio::test]
    async fn venue_endpoints() {
        let venue = json!({
            "id": ID,
            "name": "본관",
            "address": "서울특별시 중구",
            "capacity": 40
        });
        let (client, stub) = client_replying([
            Some(json!([venue])),
            Some(venue.clone()),
            Some(venue.clone()),
            Some(venue.clone()),
            Some(json!({
                "venueId": ID,
                "programCount": 3,
                "activeProgramCount": 2,
                "participantCount": 17
            })),
            None,
        ]);
        let venues = client.venues();

        venues.list(&PageQuery::default()).await.unwrap();
        venues.get(id()).await.unwrap();
        venues
            .create(&CreateVenue {
                name: "본관".to_string(),
                address: "서울특별시 중구".to_string(),
                capacity: 40,
                phone: None,
            })
            .await
            .unwrap();
        venues.update(id(), &UpdateVenue::default()).await.unwrap();
        let stats = venues.stats(id()).await.unwrap();
        assert_eq!(stats.participant_count, 17);
        venues.delete(id()).await.unwrap();

        let requests = stub.requests();
        assert_request(&requests[0], HttpMethod::Get, "/venues");
        assert_request(&requests[1], HttpMethod::Get, &format!("/venues/{ID}"));
        assert_request(&requests[2], HttpMethod::Post, "/venues");
        assert_request(&requests[3], HttpMethod::Patch, &format!("/venues/{ID}"));
        assert_request(&requests[4], HttpMethod::Get, &format!("/venues/{ID}/stats"));
        assert_request(&requests[5], HttpMethod::Delete, &format!("/venues/{ID}"));
    }

    #[tokio::test]
    async fn payment_endpoints() {
        let (client, stub) = client_replying([
            Some(json!([payment_json("pending")])),
            Some(payment_json("pending")),
            Some(payment_json("pending")),
            Some(payment_json("completed")),
            Some(payment_json("partially_refunded")),
            Some(payment_json("cancelled")),
            Some(payment_json("pending")),
            Some(json!({"deleted": true})),
        ]);
        let payments = client.payments();

        payments
            .list(&PaymentQuery {
                status: Some(PaymentStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        payments.get(id()).await.unwrap();
        payments
            .create(&CreatePayment {
                participant_id: id(),
                program_id: id(),
                amount: Won::new(30_000),
                method: PaymentMethod::Card,
            })
            .await
            .unwrap();
        let processed = payments.process(id()).await.unwrap();
        assert_eq!(processed.status, PaymentStatus::Completed);
        let refunded = payments
            .refund(
                id(),
                &RefundRequest {
                    amount: Some(Won::new(10_000)),
                    reason: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(refunded.status, PaymentStatus::PartiallyRefunded);
        payments.cancel(id()).await.unwrap();
        payments
            .update(
                id(),
                &UpdatePayment {
                    method: Some(PaymentMethod::BankTransfer),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        payments.delete(id()).await.unwrap();

        let requests = stub.requests();
        assert_request(&requests[0], HttpMethod::Get, "/payments?status=pending");
        assert_request(&requests[1], HttpMethod::Get, &format!("/payments/{ID}"));
        assert_request(&requests[2], HttpMethod::Post, "/payments");
        assert_request(&requests[3], HttpMethod::Post, &format!("/payments/{ID}/process"));
        assert_request(&requests[4], HttpMethod::Post, &format!("/payments/{ID}/refund"));
        assert_eq!(body(&requests[4]), json!({"amount": 10000}));
        assert_request(&requests[5], HttpMethod::Post, &format!("/payments/{ID}/cancel"));
        assert_request(&requests[6], HttpMethod::Patch, &format!("/payments/{ID}"));
        assert_eq!(body(&requests[6]), json!({"method": "bank_transfer"}));
        assert_request(&requests[7], HttpMethod::Delete, &format!("/payments/{ID}"));
    }

    #[tokio::test]
    async fn unit_endpoints_accept_a_response_body() {
        let (client, stub) = client_replying([
            Some(json!({"message": "logged out"})),
            Some(json!({"message": "password changed"})),
            Some(json!({"success": true})),
        ]);

        client.auth().logout().await.unwrap();
        client
            .auth()
            .change_password(&ChangePasswordRequest {
                current_password: "secret".to_string(),
                new_password: "secret2".to_string(),
            })
            .await
            .unwrap();
        client.users().delete(id()).await.unwrap();

        assert_eq!(stub.requests().len(), 3);
    }

    #[tokio::test]
    async fn lists_keep_records_with_unvalidated_phone_numbers() {
        let mut user = user_json();
        user["phone"] = json!("+82-10-1234-5678");
        let (client, _stub) = client_replying([Some(json!([user]))]);

        let users = client.users().list(&UserQuery::default()).await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].raw_phone.as_deref(), Some("+82-10-1234-5678"));
        assert!(users[0].phone().unwrap().is_err());
    }

    #[tokio::test]
    async fn health_endpoint() {
        let stub = Arc::new(StubTransport::new([StubStep::Respond(
            crate::http::HttpResponse::new(200, r#"{"status":"ok"}"#),
        )]));
        let client = ApiClient::with_transport(ClientConfig::new(BASE_URL), stub.clone());

        let health = client.health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert_request(&stub.requests()[0], HttpMethod::Get, "/health");
    }
}
