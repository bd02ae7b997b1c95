use actix_web::{HttpResponse, post, web};
use log::info;

use super::models::{ConnectRequest, ConnectResponse};
use crate::state::AppState;

/// Register peers used by `/replace_chain`.
#[post("/connect_node")]
pub async fn connect_node(
    state: web::Data<AppState>,
    body: web::Json<ConnectRequest>,
) -> HttpResponse {
    if body.nodes.iter().any(|n| n.host.is_empty()) {
        return HttpResponse::BadRequest().body("every node needs a Host");
    }

    let mut added = 0;
    for node in body.into_inner().nodes {
        if state.add_peer(node.host, node.port) {
            added += 1;
        }
    }
    let nodes = state.peers();
    info!("POST /connect_node - {added} new, {} total", nodes.len());

    HttpResponse::Created().json(ConnectResponse {
        message: "Nodes added".to_string(),
        total_nodes: nodes.len(),
        nodes,
    })
}
