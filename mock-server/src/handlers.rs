use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    ApiFailure, CreateParticipant, CreatePayment, CreateProgram, CreateUser, CreateVenue, Data, Db,
    ListQuery, Participant, Payment, Program, RefundRequest, Session, UpdateParticipant,
    UpdatePayment, UpdateProgram, UpdateUser, UpdateVenue, User, Venue, VenueStats,
};

type Created<T> = (StatusCode, Data<T>);

fn find_mut<'a, T>(
    items: &'a mut [T],
    id: Uuid,
    key: impl Fn(&T) -> Uuid,
    resource: &str,
) -> Result<&'a mut T, ApiFailure> {
    items
        .iter_mut()
        .find(|item| key(item) == id)
        .ok_or_else(|| ApiFailure::not_found(resource))
}

fn remove<T>(
    items: &mut Vec<T>,
    id: Uuid,
    key: impl Fn(&T) -> Uuid,
    resource: &str,
) -> Result<StatusCode, ApiFailure> {
    let index = items
        .iter()
        .position(|item| key(item) == id)
        .ok_or_else(|| ApiFailure::not_found(resource))?;
    items.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

// --- users ---

pub async fn list_users(
    State(db): State<Db>,
    _session: Session,
    Query(query): Query<ListQuery>,
) -> Data<Vec<User>> {
    let store = db.read().await;
    let users = store
        .users
        .iter()
        .filter(|user| query.role.as_ref().map_or(true, |role| &user.role == role))
        .filter(|user| query.is_active.map_or(true, |active| user.is_active == active))
        .filter(|user| query.matches_search(&user.name) || query.matches_search(&user.email))
        .cloned()
        .collect();
    Data(query.paginate(users))
}

pub async fn get_user(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<User>, ApiFailure> {
    let mut store = db.write().await;
    find_mut(&mut store.users, id, |user| user.id, "user").map(|user| Data(user.clone()))
}

pub async fn create_user(
    State(db): State<Db>,
    _session: Session,
    Json(input): Json<CreateUser>,
) -> Result<Created<User>, ApiFailure> {
    let mut store = db.write().await;
    if store
        .users
        .iter()
        .any(|user| user.email.eq_ignore_ascii_case(&input.email))
    {
        return Err(ApiFailure::conflict(
            "DUPLICATE_EMAIL",
            format!("{} is already registered", input.email),
        ));
    }
    let user = User {
        id: Uuid::new_v4(),
        email: input.email.to_lowercase(),
        name: input.name,
        role: input.role,
        phone: input.phone,
        is_active: true,
    };
    store.passwords.insert(user.id, input.password);
    store.users.push(user.clone());
    Ok((StatusCode::CREATED, Data(user)))
}

pub async fn update_user(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Result<Data<User>, ApiFailure> {
    let mut store = db.write().await;
    let user = find_mut(&mut store.users, id, |user| user.id, "user")?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(role) = input.role {
        user.role = role;
    }
    if let Some(phone) = input.phone {
        user.phone = Some(phone);
    }
    if let Some(is_active) = input.is_active {
        user.is_active = is_active;
    }
    Ok(Data(user.clone()))
}

pub async fn delete_user(
    State(db): State<Db>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    if id == session.user_id {
        return Err(ApiFailure::conflict(
            "CANNOT_DELETE_SELF",
            "the signed-in account cannot be deleted",
        ));
    }
    let mut store = db.write().await;
    store.passwords.remove(&id);
    store.sessions.retain(|_, user_id| *user_id != id);
    remove(&mut store.users, id, |user| user.id, "user")
}

// --- programs ---

pub async fn list_programs(
    State(db): State<Db>,
    _session: Session,
    Query(query): Query<ListQuery>,
) -> Data<Vec<Program>> {
    let store = db.read().await;
    let programs = store
        .programs
        .iter()
        .filter(|program| {
            query
                .category
                .as_ref()
                .map_or(true, |category| &program.category == category)
        })
        .filter(|program| {
            query
                .is_active
                .map_or(true, |active| program.is_active == active)
        })
        .filter(|program| query.venue_id.map_or(true, |id| program.venue_id == Some(id)))
        .filter(|program| query.matches_search(&program.title))
        .cloned()
        .collect();
    Data(query.paginate(programs))
}

pub async fn get_program(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Program>, ApiFailure> {
    let mut store = db.write().await;
    find_mut(&mut store.programs, id, |program| program.id, "program")
        .map(|program| Data(program.clone()))
}

pub async fn create_program(
    State(db): State<Db>,
    _session: Session,
    Json(input): Json<CreateProgram>,
) -> Result<Created<Program>, ApiFailure> {
    let mut store = db.write().await;
    if let Some(venue_id) = input.venue_id {
        if !store.venues.iter().any(|venue| venue.id == venue_id) {
            return Err(ApiFailure::bad_request("VENUE_NOT_FOUND", "venue does not exist"));
        }
    }
    let program = Program {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        category: input.category,
        capacity: input.capacity,
        price: input.price,
        venue_id: input.venue_id,
        is_active: false,
    };
    store.programs.push(program.clone());
    Ok((StatusCode::CREATED, Data(program)))
}

pub async fn update_program(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProgram>,
) -> Result<Data<Program>, ApiFailure> {
    let mut store = db.write().await;
    let program = find_mut(&mut store.programs, id, |program| program.id, "program")?;
    if let Some(title) = input.title {
        program.title = title;
    }
    if let Some(description) = input.description {
        program.description = description;
    }
    if let Some(category) = input.category {
        program.category = category;
    }
    if let Some(capacity) = input.capacity {
        program.capacity = capacity;
    }
    if let Some(price) = input.price {
        program.price = price;
    }
    if let Some(venue_id) = input.venue_id {
        program.venue_id = Some(venue_id);
    }
    Ok(Data(program.clone()))
}

pub async fn delete_program(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    if store
        .participants
        .iter()
        .any(|participant| participant.program_id == id)
    {
        return Err(ApiFailure::conflict(
            "PROGRAM_HAS_PARTICIPANTS",
            "remove the program's participants first",
        ));
    }
    remove(&mut store.programs, id, |program| program.id, "program")
}

async fn set_program_active(db: Db, id: Uuid, active: bool) -> Result<Data<Program>, ApiFailure> {
    let mut store = db.write().await;
    let program = find_mut(&mut store.programs, id, |program| program.id, "program")?;
    program.is_active = active;
    Ok(Data(program.clone()))
}

pub async fn activate_program(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Program>, ApiFailure> {
    set_program_active(db, id, true).await
}

pub async fn deactivate_program(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Program>, ApiFailure> {
    set_program_active(db, id, false).await
}

// --- participants ---

pub async fn list_participants(
    State(db): State<Db>,
    _session: Session,
    Query(query): Query<ListQuery>,
) -> Data<Vec<Participant>> {
    let store = db.read().await;
    let participants = store
        .participants
        .iter()
        .filter(|participant| {
            query
                .program_id
                .map_or(true, |id| participant.program_id == id)
        })
        .filter(|participant| {
            query
                .status
                .as_ref()
                .map_or(true, |status| &participant.status == status)
        })
        .filter(|participant| query.matches_search(&participant.name))
        .cloned()
        .collect();
    Data(query.paginate(participants))
}

pub async fn get_participant(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Participant>, ApiFailure> {
    let mut store = db.write().await;
    find_mut(&mut store.participants, id, |p| p.id, "participant").map(|p| Data(p.clone()))
}

pub async fn create_participant(
    State(db): State<Db>,
    _session: Session,
    Json(input): Json<CreateParticipant>,
) -> Result<Created<Participant>, ApiFailure> {
    let mut store = db.write().await;
    let program = store
        .programs
        .iter()
        .find(|program| program.id == input.program_id)
        .ok_or_else(|| ApiFailure::bad_request("PROGRAM_NOT_FOUND", "program does not exist"))?;
    let enrolled = store
        .participants
        .iter()
        .filter(|p| p.program_id == program.id && p.status != "withdrawn")
        .count();
    if enrolled >= program.capacity as usize {
        return Err(ApiFailure::conflict("PROGRAM_FULL", "program is at capacity"));
    }

    let participant = Participant {
        id: Uuid::new_v4(),
        program_id: input.program_id,
        name: input.name,
        birth_year: input.birth_year,
        guardian_phone: input.guardian_phone,
        status: "registered".to_string(),
    };
    store.participants.push(participant.clone());
    Ok((StatusCode::CREATED, Data(participant)))
}

pub async fn update_participant(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateParticipant>,
) -> Result<Data<Participant>, ApiFailure> {
    let mut store = db.write().await;
    let participant = find_mut(&mut store.participants, id, |p| p.id, "participant")?;
    if let Some(name) = input.name {
        participant.name = name;
    }
    if let Some(birth_year) = input.birth_year {
        participant.birth_year = Some(birth_year);
    }
    if let Some(phone) = input.guardian_phone {
        participant.guardian_phone = Some(phone);
    }
    if let Some(status) = input.status {
        participant.status = status;
    }
    Ok(Data(participant.clone()))
}

pub async fn delete_participant(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    remove(&mut store.participants, id, |p| p.id, "participant")
}

// --- venues ---

pub async fn list_venues(
    State(db): State<Db>,
    _session: Session,
    Query(query): Query<ListQuery>,
) -> Data<Vec<Venue>> {
    let store = db.read().await;
    let venues = store
        .venues
        .iter()
        .filter(|venue| query.matches_search(&venue.name) || query.matches_search(&venue.address))
        .cloned()
        .collect();
    Data(query.paginate(venues))
}

pub async fn get_venue(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Venue>, ApiFailure> {
    let mut store = db.write().await;
    find_mut(&mut store.venues, id, |venue| venue.id, "venue").map(|venue| Data(venue.clone()))
}

pub async fn create_venue(
    State(db): State<Db>,
    _session: Session,
    Json(input): Json<CreateVenue>,
) -> Created<Venue> {
    let venue = Venue {
        id: Uuid::new_v4(),
        name: input.name,
        address: input.address,
        capacity: input.capacity,
        phone: input.phone,
    };
    db.write().await.venues.push(venue.clone());
    (StatusCode::CREATED, Data(venue))
}

pub async fn update_venue(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateVenue>,
) -> Result<Data<Venue>, ApiFailure> {
    let mut store = db.write().await;
    let venue = find_mut(&mut store.venues, id, |venue| venue.id, "venue")?;
    if let Some(name) = input.name {
        venue.name = name;
    }
    if let Some(address) = input.address {
        venue.address = address;
    }
    if let Some(capacity) = input.capacity {
        venue.capacity = capacity;
    }
    if let Some(phone) = input.phone {
        venue.phone = Some(phone);
    }
    Ok(Data(venue.clone()))
}

pub async fn delete_venue(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    for program in store.programs.iter_mut() {
        if program.venue_id == Some(id) {
            program.venue_id = None;
        }
    }
    remove(&mut store.venues, id, |venue| venue.id, "venue")
}

pub async fn venue_stats(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<VenueStats>, ApiFailure> {
    let store = db.read().await;
    if !store.venues.iter().any(|venue| venue.id == id) {
        return Err(ApiFailure::not_found("venue"));
    }
    let programs: Vec<&Program> = store
        .programs
        .iter()
        .filter(|program| program.venue_id == Some(id))
        .collect();
    let participant_count = store
        .participants
        .iter()
        .filter(|p| programs.iter().any(|program| program.id == p.program_id))
        .count();

    Ok(Data(VenueStats {
        venue_id: id,
        program_count: programs.len() as u32,
        active_program_count: programs.iter().filter(|p| p.is_active).count() as u32,
        participant_count: participant_count as u32,
    }))
}

// --- payments ---

pub async fn list_payments(
    State(db): State<Db>,
    _session: Session,
    Query(query): Query<ListQuery>,
) -> Data<Vec<Payment>> {
    let store = db.read().await;
    let payments = store
        .payments
        .iter()
        .filter(|payment| {
            query
                .status
                .as_ref()
                .map_or(true, |status| &payment.status == status)
        })
        .filter(|payment| {
            query
                .participant_id
                .map_or(true, |id| payment.participant_id == id)
        })
        .filter(|payment| query.program_id.map_or(true, |id| payment.program_id == id))
        .cloned()
        .collect();
    Data(query.paginate(payments))
}

pub async fn get_payment(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Payment>, ApiFailure> {
    let mut store = db.write().await;
    find_mut(&mut store.payments, id, |payment| payment.id, "payment")
        .map(|payment| Data(payment.clone()))
}

pub async fn create_payment(
    State(db): State<Db>,
    _session: Session,
    Json(input): Json<CreatePayment>,
) -> Result<Created<Payment>, ApiFailure> {
    if input.amount == 0 {
        return Err(ApiFailure::bad_request(
            "INVALID_AMOUNT",
            "amount must be greater than zero",
        ));
    }
    let mut store = db.write().await;
    if !store
        .participants
        .iter()
        .any(|p| p.id == input.participant_id && p.program_id == input.program_id)
    {
        return Err(ApiFailure::bad_request(
            "PARTICIPANT_NOT_ENROLLED",
            "participant is not enrolled in the program",
        ));
    }
    let payment = Payment {
        id: Uuid::new_v4(),
        participant_id: input.participant_id,
        program_id: input.program_id,
        amount: input.amount,
        refunded_amount: 0,
        method: input.method,
        status: "pending".to_string(),
    };
    store.payments.push(payment.clone());
    Ok((StatusCode::CREATED, Data(payment)))
}

pub async fn update_payment(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePayment>,
) -> Result<Data<Payment>, ApiFailure> {
    let mut store = db.write().await;
    let payment = find_mut(&mut store.payments, id, |payment| payment.id, "payment")?;
    if payment.status != "pending" {
        return Err(invalid_transition(payment, "update"));
    }
    if let Some(amount) = input.amount {
        if amount == 0 {
            return Err(ApiFailure::bad_request(
                "INVALID_AMOUNT",
                "amount must be greater than zero",
            ));
        }
        payment.amount = amount;
    }
    if let Some(method) = input.method {
        payment.method = method;
    }
    Ok(Data(payment.clone()))
}

/// Only payments that never moved money can be deleted.
pub async fn delete_payment(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let payment = find_mut(&mut store.payments, id, |payment| payment.id, "payment")?;
    if !matches!(payment.status.as_str(), "pending" | "cancelled" | "failed") {
        return Err(invalid_transition(payment, "delete"));
    }
    remove(&mut store.payments, id, |payment| payment.id, "payment")
}

fn invalid_transition(payment: &Payment, action: &str) -> ApiFailure {
    ApiFailure::conflict(
        "INVALID_PAYMENT_STATE",
        format!("cannot {action} a {} payment", payment.status),
    )
}

pub async fn process_payment(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Payment>, ApiFailure> {
    let mut store = db.write().await;
    let payment = find_mut(&mut store.payments, id, |payment| payment.id, "payment")?;
    if payment.status != "pending" {
        return Err(invalid_transition(payment, "process"));
    }
    payment.status = "completed".to_string();
    Ok(Data(payment.clone()))
}

/// Refunds `amount`, or the remaining balance when omitted.
pub async fn refund_payment(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<RefundRequest>,
) -> Result<Data<Payment>, ApiFailure> {
    let mut store = db.write().await;
    let payment = find_mut(&mut store.payments, id, |payment| payment.id, "payment")?;
    if payment.status != "completed" && payment.status != "partially_refunded" {
        return Err(invalid_transition(payment, "refund"));
    }
    let remaining = payment.amount - payment.refunded_amount;
    let amount = input.amount.unwrap_or(remaining);
    if amount == 0 || amount > remaining {
        return Err(ApiFailure::bad_request(
            "INVALID_REFUND_AMOUNT",
            format!("refund must be between 1 and {remaining}"),
        ));
    }
    if let Some(reason) = input.reason.as_deref() {
        tracing::info!(payment = %id, amount, reason, "refund");
    }
    payment.refunded_amount += amount;
    payment.status = if payment.refunded_amount == payment.amount {
        "refunded"
    } else {
        "partially_refunded"
    }
    .to_string();
    Ok(Data(payment.clone()))
}

pub async fn cancel_payment(
    State(db): State<Db>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Data<Payment>, ApiFailure> {
    let mut store = db.write().await;
    let payment = find_mut(&mut store.payments, id, |payment| payment.id, "payment")?;
    if payment.status != "pending" {
        return Err(invalid_transition(payment, "cancel"));
    }
    payment.status = "cancelled".to_string();
    Ok(Data(payment.clone()))
}
