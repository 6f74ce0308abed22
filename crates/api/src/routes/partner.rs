//! Partner routes: rebates, withdrawals and stock declarations.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState,
    error::body,
    middleware::Actor,
    routes::acting_partner,
};
use folio_core::rebate::WithdrawalMethod;
use folio_core::stock::StockPosition;
use folio_db::{
    RebateRepository, StockRepository, WithdrawalRepository, repositories::PartnerMovementInput,
};
use folio_shared::types::{PartnerId, WorkId};
use folio_shared::{ActorContext, AppError, Money};

/// Creates the partner routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/partenaire/ristournes", get(list_rebates))
        .route("/partenaire/withdrawals", post(request_withdrawal))
        .route("/partenaire/stock", get(list_stock))
        .route("/partenaire/sales", post(declare_sale))
        .route("/partenaire/returns", post(declare_return))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a withdrawal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    /// Requested amount in FCFA.
    pub amount: Money,
    /// Payout channel, mobile money when omitted.
    #[serde(default)]
    pub method: Option<WithdrawalMethod>,
}

/// Request body for a sale.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// Work sold.
    pub work_id: WorkId,
    /// Copies sold.
    pub quantity: i64,
    /// Buyer, if known.
    pub client_name: Option<String>,
}

/// Request body for a return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    /// Work returned.
    pub work_id: WorkId,
    /// Copies returned.
    pub quantity: i64,
    /// Why the copies came back.
    pub reason: Option<String>,
}

/// A stock position as shown to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    /// Partner holding the stock.
    pub partner_id: PartnerId,
    /// Work held.
    pub work_id: WorkId,
    /// Work title, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_title: Option<String>,
    /// Copies allocated.
    pub allocated_quantity: i64,
    /// Copies sold.
    pub sold_quantity: i64,
    /// Copies returned.
    pub returned_quantity: i64,
    /// Copies on hand.
    pub available_quantity: i64,
    /// "Disponible" or "Épuisé".
    pub status: &'static str,
}

impl StockView {
    pub(crate) fn new(position: &StockPosition, work_title: Option<String>) -> Self {
        Self {
            partner_id: position.partner_id,
            work_id: position.work_id,
            work_title,
            allocated_quantity: position.allocated_quantity,
            sold_quantity: position.sold_quantity,
            returned_quantity: position.returned_quantity,
            available_quantity: position.available(),
            status: position.status_label(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/partenaire/ristournes` - Rebates with the derived balance.
async fn list_rebates(State(state): State<AppState>, Actor(actor): Actor) -> Response {
    state.respond(rebates_for(&state, actor).await)
}

async fn rebates_for(state: &AppState, actor: ActorContext) -> Result<Response, AppError> {
    let partner = acting_partner(state, actor).await?;
    let listing = RebateRepository::new(Arc::clone(&state.db))
        .list_for_partner(PartnerId::from_uuid(partner.id))
        .await?;

    Ok(Json(json!({
        "rebates": listing.entries,
        "balance": listing.balance,
    }))
    .into_response())
}

/// POST `/partenaire/withdrawals` - Files a withdrawal request.
async fn request_withdrawal(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let partner = acting_partner(&state, actor).await?;
        let request = body(payload)?;
        let withdrawal = WithdrawalRepository::new(Arc::clone(&state.db))
            .request_partner_withdrawal(
                actor,
                &partner,
                request.amount,
                request.method.unwrap_or_default(),
                state.withdrawal_policy(),
            )
            .await?;

        Ok::<_, AppError>((
            StatusCode::CREATED,
            Json(json!({ "success": true, "withdrawal": withdrawal })),
        )
            .into_response())
    }
    .await;
    state.respond(result)
}

/// GET `/partenaire/stock` - Stock positions with titles.
async fn list_stock(State(state): State<AppState>, Actor(actor): Actor) -> Response {
    let result = async {
        let partner = acting_partner(&state, actor).await?;
        let lines = StockRepository::new(Arc::clone(&state.db))
            .list_for_partner(PartnerId::from_uuid(partner.id))
            .await?;
        let stock: Vec<StockView> = lines
            .into_iter()
            .map(|line| StockView::new(&line.position, Some(line.work_title)))
            .collect();

        Ok::<_, AppError>(Json(json!({ "stock": stock })).into_response())
    }
    .await;
    state.respond(result)
}

/// POST `/partenaire/sales` - Declares a sale from the partner's stock.
async fn declare_sale(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let partner = acting_partner(&state, actor).await?;
        let request = body(payload)?;
        let position = StockRepository::new(Arc::clone(&state.db))
            .record_sale(
                actor,
                &partner,
                PartnerMovementInput {
                    work_id: request.work_id,
                    quantity: request.quantity,
                    note: request.client_name,
                },
            )
            .await?;

        Ok::<_, AppError>((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Vente enregistrée avec succès",
                "stock": StockView::new(&position, None),
            })),
        )
            .into_response())
    }
    .await;
    state.respond(result)
}

/// POST `/partenaire/returns` - Declares a return of sold copies.
async fn declare_return(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<ReturnRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let partner = acting_partner(&state, actor).await?;
        let request = body(payload)?;
        let position = StockRepository::new(Arc::clone(&state.db))
            .record_return(
                actor,
                &partner,
                PartnerMovementInput {
                    work_id: request.work_id,
                    quantity: request.quantity,
                    note: request.reason,
                },
            )
            .await?;

        Ok::<_, AppError>((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Retour enregistré avec succès",
                "stock": StockView::new(&position, None),
            })),
        )
            .into_response())
    }
    .await;
    state.respond(result)
}
