mod chain;
mod health;
pub mod models;
mod node;
mod tx;

use actix_web::HttpResponse;
use actix_web::web::ServiceConfig;

use crate::error::Error;
use models::ErrorResponse;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(chain::get_chain)
        .service(chain::is_valid)
        .service(chain::mine_block)
        .service(chain::replace_chain)
        .service(tx::add_transaction)
        .service(node::connect_node);
}

/// Map a core error to a JSON error body with a matching status.
pub(crate) fn error_response(err: &Error) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        Error::InvalidTransaction(_) | Error::MalformedDigest(_) => {
            HttpResponse::BadRequest().json(body)
        }
        Error::Cancelled => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}
