//! PDG routes: stock allocation, ledger approvals, withdrawal review and rates.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::{body, query},
    middleware::Actor,
    routes::partner::StockView,
};
use folio_core::rebate::{RateDraft, RateKind, WithdrawalAction, WithdrawalStatus};
use folio_db::{
    RateRepository, RebateRepository, RoyaltyRepository, StockRepository, WithdrawalRepository,
    repositories::{RateFilter, RateUpdate, WithdrawalReview},
};
use folio_shared::types::{
    OrderId, PartnerId, RebateId, RebateRateId, RoyaltyId, UserId, WithdrawalId, WorkId,
};
use folio_shared::{ActorContext, AppError, Role};

/// Creates the PDG routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pdg/partner-stock/allocate", post(allocate_stock))
        .route("/pdg/royalties/approve", post(approve_royalties))
        .route("/pdg/royalties/pay", post(pay_royalties))
        .route("/pdg/rebates/validate", post(validate_rebates))
        .route("/pdg/rebates/pay", post(pay_rebates))
        .route("/pdg/rebates/cancel", post(cancel_rebates))
        .route("/pdg/ristournes/calculate", post(calculate_rebates))
        .route("/pdg/withdrawals", get(list_withdrawals).put(review_withdrawal))
        .route(
            "/pdg/ristournes/rates",
            get(list_rates)
                .post(create_rate)
                .put(update_rate)
                .delete(deactivate_rate),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for an allocation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    /// Receiving partner.
    pub partner_id: PartnerId,
    /// Work allocated.
    pub work_id: WorkId,
    /// Copies taken from the central stock.
    pub quantity: i64,
}

/// Request body for a royalty approval batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRoyaltiesRequest {
    /// Royalties to approve.
    #[serde(default)]
    pub royalty_ids: Vec<RoyaltyId>,
}

/// Request body for a royalty payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRoyaltiesRequest {
    /// Author paid.
    pub author_id: Option<UserId>,
    /// Work the royalties were earned on.
    pub work_id: Option<WorkId>,
}

/// Request body for a rebate batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebateBatchRequest {
    /// Rebates to move.
    #[serde(default)]
    pub rebate_ids: Vec<RebateId>,
}

/// Request body for an order accrual.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    /// Order to accrue.
    pub order_id: OrderId,
}

/// Query string of the withdrawal listing.
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawalQuery {
    /// PENDING, APPROVED, PAID or REJECTED.
    pub status: Option<String>,
}

/// Request body for a withdrawal review.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithdrawalRequest {
    /// Withdrawal reviewed.
    pub withdrawal_id: Option<WithdrawalId>,
    /// APPROVE, REJECT or MARK_PAID.
    pub action: Option<WithdrawalAction>,
    /// Why the request is refused.
    pub rejection_reason: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Query string of the rate listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuery {
    /// WORK, AUTHOR, PARTNER or GLOBAL.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Target partner.
    pub partner_id: Option<PartnerId>,
    /// Target author.
    pub user_id: Option<UserId>,
    /// Target work.
    pub work_id: Option<WorkId>,
}

/// Request body for a new rate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRateRequest {
    /// WORK, AUTHOR, PARTNER or GLOBAL.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Percentage.
    pub rate: Option<Decimal>,
    /// Target partner.
    pub partner_id: Option<PartnerId>,
    /// Target author.
    pub user_id: Option<UserId>,
    /// Target work.
    pub work_id: Option<WorkId>,
    /// Window start.
    pub start_date: Option<DateTime<Utc>>,
    /// Window end.
    pub end_date: Option<DateTime<Utc>>,
}

/// Request body for a rate update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRateRequest {
    /// Rate changed.
    pub id: Option<RebateRateId>,
    /// New percentage.
    pub rate: Option<Decimal>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New window start.
    pub start_date: Option<DateTime<Utc>>,
    /// New window end.
    pub end_date: Option<DateTime<Utc>>,
}

/// Query string of a rate deactivation.
#[derive(Debug, Default, Deserialize)]
pub struct RateIdQuery {
    /// Rate turned off.
    pub id: Option<RebateRateId>,
}

fn rate_id_required() -> AppError {
    AppError::Validation("L'ID du taux est requis".to_string())
}

fn require_pdg(actor: ActorContext) -> Result<(), AppError> {
    actor.require_any(&[Role::Pdg])
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/pdg/partner-stock/allocate` - Moves copies from the central stock to a partner.
async fn allocate_stock(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let position = StockRepository::new(Arc::clone(&state.db))
            .allocate(actor, request.partner_id, request.work_id, request.quantity)
            .await?;

        Ok::<_, AppError>(
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": format!("{} exemplaire(s) alloué(s) avec succès", request.quantity),
                    "stock": StockView::new(&position, None),
                })),
            )
                .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/royalties/approve` - Approves a batch of pending royalties.
async fn approve_royalties(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<ApproveRoyaltiesRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let outcome = RoyaltyRepository::new(Arc::clone(&state.db))
            .approve(actor, &request.royalty_ids)
            .await?;
        let count = outcome.approved_count();

        Ok::<_, AppError>(
            Json(json!({
                "message": format!("{count} royalties approuvées avec succès"),
                "count": count,
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/royalties/pay` - Pays every unpaid royalty of an author on a work.
async fn pay_royalties(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<PayRoyaltiesRequest>, JsonRejection>,
) -> Response {
    let result = async {
        actor.require_any(&[Role::Pdg, Role::Representant])?;
        let request = body(payload)?;
        let (Some(author_id), Some(work_id)) = (request.author_id, request.work_id) else {
            return Err(AppError::Validation(
                "authorId et workId sont requis".to_string(),
            ));
        };

        let outcome = RoyaltyRepository::new(Arc::clone(&state.db))
            .pay(actor, author_id, work_id)
            .await?;
        let count = outcome.paid_count();
        let message = if count == 0 {
            "Aucune royalty en attente de paiement".to_string()
        } else {
            format!("{count} royalties payées pour un total de {}", outcome.total)
        };

        Ok(Json(json!({
            "success": true,
            "count": count,
            "message": message,
        }))
        .into_response())
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/rebates/validate` - Validates accrued rebates.
async fn validate_rebates(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<RebateBatchRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let outcome = RebateRepository::new(Arc::clone(&state.db))
            .validate(&request.rebate_ids)
            .await?;

        Ok::<_, AppError>(
            Json(json!({
                "message": format!("{} ristourne(s) validée(s)", outcome.count()),
                "count": outcome.count(),
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/rebates/pay` - Marks validated rebates as paid.
async fn pay_rebates(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<RebateBatchRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let outcome = RebateRepository::new(Arc::clone(&state.db))
            .mark_paid(&request.rebate_ids)
            .await?;

        Ok::<_, AppError>(
            Json(json!({
                "message": format!("{} ristourne(s) payée(s)", outcome.count()),
                "count": outcome.count(),
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/rebates/cancel` - Cancels unpaid rebates.
async fn cancel_rebates(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<RebateBatchRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let outcome = RebateRepository::new(Arc::clone(&state.db))
            .cancel(&request.rebate_ids)
            .await?;

        Ok::<_, AppError>(
            Json(json!({
                "message": format!("{} ristourne(s) annulée(s)", outcome.count()),
                "count": outcome.count(),
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/ristournes/calculate` - Accrues the rebates and royalties of an order.
async fn calculate_rebates(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let accrued = RebateRepository::new(Arc::clone(&state.db))
            .accrue_order(request.order_id, &state.rate_resolver())
            .await?;

        Ok::<_, AppError>(
            Json(json!({
                "partnerRebates": accrued.rebates,
                "authorRoyalties": accrued.royalties,
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// GET `/pdg/withdrawals` - Withdrawals with status counts.
async fn list_withdrawals(
    State(state): State<AppState>,
    Actor(actor): Actor,
    params: Result<Query<WithdrawalQuery>, QueryRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let params = query(params)?;
        let status = params
            .status
            .as_deref()
            .map(WithdrawalStatus::parse)
            .transpose()?;
        let listing = WithdrawalRepository::new(Arc::clone(&state.db))
            .list(status)
            .await?;

        Ok::<_, AppError>(
            Json(json!({
                "withdrawals": listing.withdrawals,
                "stats": listing.stats,
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// PUT `/pdg/withdrawals` - Approves, rejects or pays a withdrawal.
async fn review_withdrawal(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<ReviewWithdrawalRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let (Some(withdrawal_id), Some(action)) = (request.withdrawal_id, request.action) else {
            return Err(AppError::Validation(
                "withdrawalId et action sont requis".to_string(),
            ));
        };

        let withdrawal = WithdrawalRepository::new(Arc::clone(&state.db))
            .review(
                actor,
                withdrawal_id,
                WithdrawalReview {
                    action,
                    rejection_reason: request.rejection_reason,
                    notes: request.notes,
                },
            )
            .await?;
        let verb = match action {
            WithdrawalAction::Approve => "approuvé",
            WithdrawalAction::Reject => "rejeté",
            WithdrawalAction::MarkPaid => "marqué comme payé",
        };

        Ok(Json(json!({
            "message": format!("Retrait {verb} avec succès"),
            "withdrawal": withdrawal,
        }))
        .into_response())
    }
    .await;
    state.respond(result)
}

/// GET `/pdg/ristournes/rates` - Active rates matching the filters.
async fn list_rates(
    State(state): State<AppState>,
    Actor(actor): Actor,
    params: Result<Query<RateQuery>, QueryRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let params = query(params)?;
        let filter = RateFilter {
            kind: params.kind.as_deref().map(RateKind::parse).transpose()?,
            partner_id: params.partner_id,
            author_id: params.user_id,
            work_id: params.work_id,
        };
        let rates = RateRepository::new(Arc::clone(&state.db))
            .list_active(filter)
            .await?;

        Ok::<_, AppError>(Json(json!({ "rates": rates })).into_response())
    }
    .await;
    state.respond(result)
}

/// POST `/pdg/ristournes/rates` - Creates the active rate of a scope.
async fn create_rate(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<CreateRateRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let (Some(kind), Some(rate)) = (request.kind.as_deref(), request.rate) else {
            return Err(AppError::Validation(
                "Le type et le taux sont requis".to_string(),
            ));
        };
        let draft = RateDraft {
            kind: RateKind::parse(kind)?,
            work_id: request.work_id,
            author_id: request.user_id,
            partner_id: request.partner_id,
            rate,
            start_date: request.start_date,
            end_date: request.end_date,
        };
        let created = RateRepository::new(Arc::clone(&state.db))
            .create(&draft)
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "Taux de ristourne créé avec succès",
                "rebateRate": created,
            })),
        )
            .into_response())
    }
    .await;
    state.respond(result)
}

/// PUT `/pdg/ristournes/rates` - Changes a rate.
async fn update_rate(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<UpdateRateRequest>, JsonRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let request = body(payload)?;
        let id = request.id.ok_or_else(rate_id_required)?;
        let updated = RateRepository::new(Arc::clone(&state.db))
            .update(
                id,
                RateUpdate {
                    rate: request.rate,
                    is_active: request.is_active,
                    start_date: request.start_date,
                    end_date: request.end_date,
                },
            )
            .await?;

        Ok::<_, AppError>(
            Json(json!({
                "message": "Taux de ristourne mis à jour avec succès",
                "rebateRate": updated,
            }))
            .into_response(),
        )
    }
    .await;
    state.respond(result)
}

/// DELETE `/pdg/ristournes/rates?id=` - Turns a rate off.
async fn deactivate_rate(
    State(state): State<AppState>,
    Actor(actor): Actor,
    params: Result<Query<RateIdQuery>, QueryRejection>,
) -> Response {
    let result = async {
        require_pdg(actor)?;
        let id = query(params)?.id.ok_or_else(rate_id_required)?;
        RateRepository::new(Arc::clone(&state.db))
            .deactivate(id)
            .await?;

        Ok::<_, AppError>(
            Json(json!({ "message": "Taux de ristourne désactivé avec succès" })).into_response(),
        )
    }
    .await;
    state.respond(result)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::test_support::{exec, send, state, token};
    use folio_db::entities::{
        partner_rebates, rebate_rates, royalties,
        sea_orm_active_enums::{RebateRateType, WithdrawalMethod, WithdrawalStatus},
        withdrawals,
    };
    use folio_shared::Role;
    use folio_shared::types::UserId;

    fn royalty(author: Uuid, work: Uuid, amount: i64, approved: bool) -> royalties::Model {
        royalties::Model {
            id: Uuid::now_v7(),
            user_id: author,
            work_id: work,
            order_id: None,
            amount,
            rate: Decimal::TEN,
            approved,
            approved_at: None,
            approved_by: None,
            paid: false,
            paid_at: None,
            paid_by: None,
            created_at: Utc::now().into(),
        }
    }

    #[rstest]
    #[case(Role::Partenaire)]
    #[case(Role::Auteur)]
    #[case(Role::Representant)]
    #[tokio::test]
    async fn test_approval_reserved_to_pdg(#[case] role: Role) {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), role);

        let (status, _) = send(
            state,
            "POST",
            "/api/v1/pdg/royalties/approve",
            Some(&bearer),
            Some(json!({ "royaltyIds": [Uuid::now_v7()] })),
        )
        .await;
        assert_eq!(status, 403);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "royaltyIds": [] }))]
    #[tokio::test]
    async fn test_approval_requires_ids(#[case] payload: serde_json::Value) {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Pdg);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/pdg/royalties/approve",
            Some(&bearer),
            Some(payload),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Liste des IDs de royalties requise");
    }

    #[tokio::test]
    async fn test_approval_counts_batch() {
        let (a, b, w) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let rows = vec![
            royalty(a, w, 1000, false),
            royalty(a, w, 500, false),
            royalty(b, w, 750, false),
        ];
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .append_exec_results([exec(3), exec(2)])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Pdg);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/pdg/royalties/approve",
            Some(&bearer),
            Some(json!({ "royaltyIds": ids })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["count"], 3);
    }

    #[tokio::test]
    async fn test_approval_rejects_already_approved() {
        let (a, w) = (Uuid::now_v7(), Uuid::now_v7());
        let rows = vec![royalty(a, w, 1000, false), royalty(a, w, 500, true)];
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Pdg);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/pdg/royalties/approve",
            Some(&bearer),
            Some(json!({ "royaltyIds": ids })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(
            body["message"],
            "Certaines royalties sont introuvables ou déjà approuvées"
        );
    }

    #[tokio::test]
    async fn test_pay_requires_author_and_work() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Representant);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/pdg/royalties/pay",
            Some(&bearer),
            Some(json!({ "authorId": Uuid::now_v7() })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "authorId et workId sont requis");
    }

    #[tokio::test]
    async fn test_pay_by_representative() {
        let (a, w) = (Uuid::now_v7(), Uuid::now_v7());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![royalty(a, w, 1000, true), royalty(a, w, 400, false)]])
            .append_exec_results([exec(2), exec(1)])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Representant);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/pdg/royalties/pay",
            Some(&bearer),
            Some(json!({ "authorId": a, "workId": w })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn test_calculate_unknown_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<folio_db::entities::orders::Model>::new()])
            .into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Pdg);

        let (status, body) = send(
            state,
            "POST",
            "/api/v1/pdg/ristournes/calculate",
            Some(&bearer),
            Some(json!({ "orderId": Uuid::now_v7() })),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["message"], "Commande introuvable");
    }

    #[tokio::test]
    async fn test_rebate_validation_empty_batch() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Pdg);

        let (status, _) = send(
            state,
            "POST",
            "/api/v1/pdg/rebates/validate",
            Some(&bearer),
            Some(json!({ "rebateIds": [] })),
        )
        .await;
        assert_eq!(status, 400);
    }

    fn withdrawal(amount: i64, status: WithdrawalStatus) -> withdrawals::Model {
        withdrawals::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            partner_id: None,
            amount,
            method: WithdrawalMethod::Bank,
            status,
            notes: None,
            created_at: Utc::now().into(),
            validated_by: None,
            validated_at: None,
            paid_at: None,
            rejection_reason: None,
        }
    }

    fn rebate(amount: i64, status: &str) -> partner_rebates::Model {
        partner_rebates::Model {
            id: Uuid::now_v7(),
            partner_id: Uuid::now_v7(),
            order_id: None,
            work_id: None,
            amount,
            rate: Decimal::TEN,
            status: status.to_string(),
            validated_at: None,
            paid_at: None,
            created_at: Utc::now().into(),
        }
    }

    fn rate(kind: RebateRateType, value: Decimal) -> rebate_rates::Model {
        rebate_rates::Model {
            id: Uuid::now_v7(),
            rate_type: kind,
            work_id: None,
            user_id: None,
            partner_id: None,
            rate: value,
            is_active: true,
            start_date: None,
            end_date: None,
            created_at: Utc::now().into(),
        }
    }

    async fn as_pdg(
        db: sea_orm::DatabaseConnection,
        method: &str,
        uri: &str,
        payload: Option<serde_json::Value>,
    ) -> (u16, serde_json::Value) {
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Pdg);
        send(state, method, uri, Some(&bearer), payload).await
    }

    #[tokio::test]
    async fn test_cancel_rebates() {
        let rows = vec![rebate(400, "ACCRUED"), rebate(600, "VALIDATED")];
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .append_exec_results([exec(2)])
            .into_connection();

        let (status, body) = as_pdg(
            db,
            "POST",
            "/api/v1/pdg/rebates/cancel",
            Some(json!({ "rebateIds": ids })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "2 ristourne(s) annulée(s)");
    }

    #[tokio::test]
    async fn test_cancel_refuses_paid_rebates() {
        let rows = vec![rebate(400, "PAID")];
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();

        let (status, _) = as_pdg(
            db,
            "POST",
            "/api/v1/pdg/rebates/cancel",
            Some(json!({ "rebateIds": ids })),
        )
        .await;
        assert_eq!(status, 400);
    }

    #[rstest]
    #[case(json!({ "action": "APPROVE" }))]
    #[case(json!({ "withdrawalId": Uuid::now_v7() }))]
    #[tokio::test]
    async fn test_review_requires_id_and_action(#[case] payload: serde_json::Value) {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let (status, body) = as_pdg(db, "PUT", "/api/v1/pdg/withdrawals", Some(payload)).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "withdrawalId et action sont requis");
    }

    #[tokio::test]
    async fn test_review_approves_pending() {
        let pending = withdrawal(12_000, WithdrawalStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_exec_results([exec(1), exec(1)])
            .into_connection();

        let (status, body) = as_pdg(
            db,
            "PUT",
            "/api/v1/pdg/withdrawals",
            Some(json!({ "withdrawalId": pending.id, "action": "APPROVE" })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Retrait approuvé avec succès");
        assert_eq!(body["withdrawal"]["status"], "APPROVED");
    }

    #[tokio::test]
    async fn test_reject_needs_reason() {
        let pending = withdrawal(12_000, WithdrawalStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .into_connection();

        let (status, body) = as_pdg(
            db,
            "PUT",
            "/api/v1/pdg/withdrawals",
            Some(json!({ "withdrawalId": pending.id, "action": "REJECT" })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "La raison du rejet est requise");
    }

    #[tokio::test]
    async fn test_review_unknown_withdrawal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<withdrawals::Model>::new()])
            .into_connection();

        let (status, body) = as_pdg(
            db,
            "PUT",
            "/api/v1/pdg/withdrawals",
            Some(json!({ "withdrawalId": Uuid::now_v7(), "action": "MARK_PAID" })),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["message"], "Retrait introuvable");
    }

    #[tokio::test]
    async fn test_withdrawal_listing_with_stats() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                withdrawal(5000, WithdrawalStatus::Pending),
                withdrawal(9000, WithdrawalStatus::Rejected),
            ]])
            .into_connection();

        let (status, body) = as_pdg(db, "GET", "/api/v1/pdg/withdrawals", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["withdrawals"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["stats"]["pending"], 1);
        assert_eq!(body["stats"]["rejected"], 1);
    }

    #[tokio::test]
    async fn test_withdrawal_listing_unknown_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let (status, body) =
            as_pdg(db, "GET", "/api/v1/pdg/withdrawals?status=LOST", None).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Statut de retrait inconnu: LOST");
    }

    #[tokio::test]
    async fn test_rates_reserved_to_pdg() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = state(db);
        let bearer = token(&state, UserId::new(), Role::Partenaire);

        let (status, _) =
            send(state, "GET", "/api/v1/pdg/ristournes/rates", Some(&bearer), None).await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn test_list_rates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![rate(RebateRateType::Global, Decimal::TEN)]])
            .into_connection();

        let (status, body) =
            as_pdg(db, "GET", "/api/v1/pdg/ristournes/rates?type=GLOBAL", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["rates"][0]["rateType"], "GLOBAL");
        assert_eq!(body["rates"][0]["isActive"], true);
    }

    #[tokio::test]
    async fn test_list_rates_unknown_type() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let (status, body) =
            as_pdg(db, "GET", "/api/v1/pdg/ristournes/rates?type=REGION", None).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Type de taux invalide");
    }

    #[rstest]
    #[case(json!({ "type": "GLOBAL" }), "Le type et le taux sont requis")]
    #[case(json!({ "rate": 10 }), "Le type et le taux sont requis")]
    #[case(json!({ "type": "PARTNER", "rate": 10 }), "partnerId est requis pour un taux partenaire")]
    #[case(json!({ "type": "AUTHOR", "rate": 10 }), "userId est requis pour un taux auteur")]
    #[case(json!({ "type": "WORK", "rate": 10 }), "workId est requis pour un taux œuvre")]
    #[tokio::test]
    async fn test_create_rate_validation(
        #[case] payload: serde_json::Value,
        #[case] message: &str,
    ) {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let (status, body) =
            as_pdg(db, "POST", "/api/v1/pdg/ristournes/rates", Some(payload)).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], message);
    }

    #[tokio::test]
    async fn test_create_rate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .append_query_results([vec![rate(RebateRateType::Global, Decimal::from(12))]])
            .into_connection();

        let (status, body) = as_pdg(
            db,
            "POST",
            "/api/v1/pdg/ristournes/rates",
            Some(json!({ "type": "GLOBAL", "rate": 12 })),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["message"], "Taux de ristourne créé avec succès");
        assert_eq!(body["rebateRate"]["rateType"], "GLOBAL");
    }

    #[tokio::test]
    async fn test_update_rate_requires_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let (status, body) = as_pdg(
            db,
            "PUT",
            "/api/v1/pdg/ristournes/rates",
            Some(json!({ "isActive": false })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "L'ID du taux est requis");
    }

    #[tokio::test]
    async fn test_deactivate_rate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();

        let uri = format!("/api/v1/pdg/ristournes/rates?id={}", Uuid::now_v7());
        let (status, body) = as_pdg(db, "DELETE", &uri, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Taux de ristourne désactivé avec succès");
    }

    #[tokio::test]
    async fn test_deactivate_rate_requires_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let (status, body) = as_pdg(db, "DELETE", "/api/v1/pdg/ristournes/rates", None).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "L'ID du taux est requis");
    }
}
