use actix_web::{HttpResponse, post, web};
use log::{debug, warn};

use super::error_response;
use super::models::{NewTxRequest, NewTxResponse};
use crate::state::AppState;

/// Queue a transaction for the next mined block.
#[post("/add_transaction")]
pub async fn add_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> HttpResponse {
    let NewTxRequest {
        sender,
        receiver,
        amount,
    } = body.into_inner();
    debug!("POST /add_transaction - {sender} -> {receiver} ({amount})");

    match state.submit_transaction(sender, receiver, amount) {
        Ok(block_index) => HttpResponse::Created().json(NewTxResponse {
            message: "Transaction added".to_string(),
            block_index,
        }),
        Err(e) => {
            warn!("POST /add_transaction - rejected: {e}");
            error_response(&e)
        }
    }
}
