//! Author routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::body, middleware::Actor};
use folio_core::rebate::WithdrawalMethod;
use folio_core::royalty::RoyaltyStatus;
use folio_db::{RoyaltyRepository, WithdrawalRepository, repositories::royalty::to_entry};
use folio_shared::types::{RoyaltyId, WorkId};
use folio_shared::{ActorContext, AppError, Money, Role};

/// Creates the author routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auteur/royalties", get(list_royalties))
        .route("/auteur/withdrawals", post(request_withdrawal))
}

/// Request body for an author withdrawal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorWithdrawalRequest {
    /// Requested amount in FCFA.
    pub amount: Money,
    /// Payout channel.
    pub method: Option<WithdrawalMethod>,
}

/// A royalty as shown to its author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyView {
    /// Entry id.
    pub id: RoyaltyId,
    /// Work the royalty was earned on.
    pub work_id: WorkId,
    /// Work title, empty if the work is gone.
    pub work_title: String,
    /// Amount owed.
    pub amount: Money,
    /// Rate applied.
    pub rate: Decimal,
    /// PENDING, APPROVED or PAID.
    pub status: RoyaltyStatus,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Payment time.
    pub paid_at: Option<DateTime<Utc>>,
    /// Accrual time.
    pub created_at: DateTime<Utc>,
}

/// GET `/auteur/royalties` - The author's royalties with totals.
async fn list_royalties(State(state): State<AppState>, Actor(actor): Actor) -> Response {
    state.respond(royalties_for(&state, actor).await)
}

async fn royalties_for(state: &AppState, actor: ActorContext) -> Result<Response, AppError> {
    actor.require_any(&[Role::Auteur])?;

    let listing = RoyaltyRepository::new(Arc::clone(&state.db))
        .list_for_author(actor.id)
        .await?;

    let royalties: Vec<RoyaltyView> = listing
        .rows
        .iter()
        .map(|(row, work)| {
            let entry = to_entry(row);
            RoyaltyView {
                id: entry.id,
                work_id: entry.work_id,
                work_title: work.as_ref().map(|w| w.title.clone()).unwrap_or_default(),
                amount: entry.amount,
                rate: row.rate,
                status: entry.status(),
                approved_at: entry.approved_at,
                paid_at: entry.paid_at,
                created_at: row.created_at.with_timezone(&Utc),
            }
        })
        .collect();

    Ok(Json(json!({
        "royalties": royalties,
        "stats": listing.summary,
        "balance": listing.summary.available_balance,
    }))
    .into_response())
}

/// POST `/auteur/withdrawals` - Files a withdrawal against approved royalties.
async fn request_withdrawal(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<AuthorWithdrawalRequest>, JsonRejection>,
) -> Response {
    let result = async {
        actor.require_any(&[Role::Auteur])?;
        let request = body(payload)?;
        let Some(method) = request.method else {
            return Err(AppError::Validation("Méthode de paiement invalide".to_string()));
        };

        let withdrawal = WithdrawalRepository::new(Arc::clone(&state.db))
            .request_author_withdrawal(actor, request.amount, method, state.withdrawal_policy())
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "Demande de retrait créée avec succès",
                "withdrawal": withdrawal,
            })),
        )
            .into_response())
    }
    .await;
    state.respond(result)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::test_support::{exec, pdg_user, send, state, token};
    use folio_db::entities::{
        royalties,
        sea_orm_active_enums::{RoyaltyType, UserRole, WithdrawalMethod, WithdrawalStatus},
        users, withdrawals, works,
    };
    use folio_shared::Role;
    use folio_shared::types::UserId;

    fn work(id: Uuid) -> works::Model {
        works::Model {
            id,
            title: "Batouala".to_string(),
            isbn: None,
            price: 3500,
            stock: 12,
            status: "PUBLISHED".to_string(),
            author_id: None,
            royalty_rate: dec!(10),
            royalty_type: RoyaltyType::Percentage,
            created_at: Utc::now().into(),
        }
    }

    fn royalty(author: Uuid, work: Uuid, amount: i64, approved: bool, paid: bool) -> royalties::Model {
        royalties::Model {
            id: Uuid::now_v7(),
            user_id: author,
            work_id: work,
            order_id: None,
            amount,
            rate: dec!(10),
            approved,
            approved_at: None,
            approved_by: None,
            paid,
            paid_at: None,
            paid_by: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_author_sees_summary() {
        let author = UserId::new();
        let w = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                (royalty(author.into_inner(), w, 1000, true, false), Some(work(w))),
                (royalty(author.into_inner(), w, 400, false, false), Some(work(w))),
                (royalty(author.into_inner(), w, 600, true, true), Some(work(w))),
            ]])
            .append_query_results([Vec::<withdrawals::Model>::new()])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, author, Role::Auteur);

        let (status, body) =
            send(state, "GET", "/api/v1/auteur/royalties", Some(&bearer), None).await;

        assert_eq!(status, 200);
        assert_eq!(body["royalties"][0]["workTitle"], "Batouala");
        assert_eq!(body["royalties"][0]["status"], "APPROVED");
        assert_eq!(body["stats"]["totalRoyalties"], 2000);
        assert_eq!(body["stats"]["pendingRoyalties"], 400);
        assert_eq!(body["balance"], 1000);
    }

    #[tokio::test]
    async fn test_partner_cannot_read_royalties() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Partenaire);

        let (status, _) = send(state, "GET", "/api/v1/auteur/royalties", Some(&bearer), None).await;
        assert_eq!(status, 403);
    }

    fn author_row(id: UserId) -> users::Model {
        users::Model {
            id: id.into_inner(),
            name: "Mongo Beti".to_string(),
            email: "mongo@example.com".to_string(),
            role: UserRole::Auteur,
            created_at: Utc::now().into(),
        }
    }

    fn withdrawal(author: UserId, amount: i64, status: WithdrawalStatus) -> withdrawals::Model {
        withdrawals::Model {
            id: Uuid::now_v7(),
            user_id: author.into_inner(),
            partner_id: None,
            amount,
            method: WithdrawalMethod::Momo,
            status,
            notes: None,
            created_at: Utc::now().into(),
            validated_by: None,
            validated_at: None,
            paid_at: None,
            rejection_reason: None,
        }
    }

    #[tokio::test]
    async fn test_author_withdrawal_created() {
        let author = UserId::new();
        let w = Uuid::now_v7();
        let created = withdrawal(author, 5000, WithdrawalStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![author_row(author)]])
            .append_query_results([Vec::<withdrawals::Model>::new()])
            .append_query_results([vec![royalty(author.into_inner(), w, 8000, true, false)]])
            .append_query_results([vec![created.clone()]])
            .append_query_results([vec![pdg_user()]])
            .append_exec_results([exec(1)])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, author, Role::Auteur);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/auteur/withdrawals",
            Some(&bearer),
            Some(json!({ "amount": 5000, "method": "MOMO" })),
        )
        .await;

        assert_eq!(status, 201);
        assert_eq!(body["message"], "Demande de retrait créée avec succès");
        assert_eq!(body["withdrawal"]["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_author_withdrawal_waits_for_pending() {
        let author = UserId::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![author_row(author)]])
            .append_query_results([vec![withdrawal(author, 6000, WithdrawalStatus::Pending)]])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, author, Role::Auteur);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/auteur/withdrawals",
            Some(&bearer),
            Some(json!({ "amount": 5000, "method": "BANK" })),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(
            body["message"],
            "Vous avez déjà une demande de retrait en cours. Veuillez attendre qu'elle soit traitée."
        );
    }

    #[tokio::test]
    async fn test_author_withdrawal_needs_method() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Auteur);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/auteur/withdrawals",
            Some(&bearer),
            Some(json!({ "amount": 5000 })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Méthode de paiement invalide");
    }

    #[tokio::test]
    async fn test_partner_cannot_request_author_withdrawal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Partenaire);

        let (status, _) = send(
            state,
            "POST",
            "/api/v1/auteur/withdrawals",
            Some(&bearer),
            Some(json!({ "amount": 5000, "method": "MOMO" })),
        )
        .await;
        assert_eq!(status, 403);
    }
}
