use actix_web::{HttpResponse, Responder, get, web};
use log::{info, warn};

use super::error_response;
use super::models::{MineResponse, ReplaceResponse, ValidateResponse};
use crate::state::AppState;

/// The full chain, pending pool and peer list; this is also what peers fetch.
#[get("/get_chain")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.chain_response())
}

/// Validate the whole local chain.
#[get("/is_valid")]
pub async fn is_valid(state: web::Data<AppState>) -> HttpResponse {
    match state.validate_current_chain() {
        Ok(is_valid) => HttpResponse::Ok().json(ValidateResponse { is_valid }),
        Err(e) => error_response(&e),
    }
}

/// Solve the puzzle and seal the pending pool into a block.
/// The search runs on the blocking pool.
#[get("/mine_block")]
pub async fn mine_block(state: web::Data<AppState>) -> HttpResponse {
    let worker = state.clone();
    match web::block(move || worker.create_block_via_puzzle()).await {
        Ok(Ok(block)) => {
            info!(
                "GET /mine_block - sealed #{} (proof={})",
                block.index, block.proof
            );
            HttpResponse::Ok().json(MineResponse {
                message: "You mined a new block!".to_string(),
                block,
            })
        }
        Ok(Err(e)) => {
            warn!("GET /mine_block - failed: {e}");
            error_response(&e)
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Poll every known peer and adopt the longest chain, if longer than ours.
#[get("/replace_chain")]
pub async fn replace_chain(state: web::Data<AppState>) -> HttpResponse {
    let worker = state.clone();
    let replaced = match web::block(move || worker.reconcile()).await {
        Ok(replaced) => replaced,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };

    let message = if replaced {
        "the chain has been replaced by a longer one"
    } else {
        "we already have the longest chain possible, nothing changed"
    };
    HttpResponse::Ok().json(ReplaceResponse {
        message: message.to_string(),
        replaced,
        chain: state.get_chain(),
    })
}
