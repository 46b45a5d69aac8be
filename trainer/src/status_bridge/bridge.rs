use crate::status_bridge::model::{BridgeCommand, StatusModel};
use anyhow::Context;
use repcore::prelude::CancelToken;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use warp::{http::StatusCode, Filter};

pub fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Latest status published by the runner, read by the HTTP handlers.
pub type StatusBoard = Arc<RwLock<StatusModel>>;

pub fn publish(board: &StatusBoard, model: StatusModel) {
    *board.write().unwrap_or_else(PoisonError::into_inner) = model;
}

pub fn read(board: &StatusBoard) -> StatusModel {
    board
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// `GET /status` returns the latest [`StatusModel`]; `POST /next-set` queues
/// a set advance for the runner.
pub fn routes(
    board: StatusBoard,
    commands: UnboundedSender<BridgeCommand>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let board_filter = warp::any().map(move || board.clone());
    let commands_filter = warp::any().map(move || commands.clone());

    let status_route = warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .and(board_filter)
        .map(|board: StatusBoard| warp::reply::json(&read(&board)));

    let next_set_route = warp::path("next-set")
        .and(warp::path::end())
        .and(warp::post())
        .and(commands_filter)
        .map(|commands: UnboundedSender<BridgeCommand>| {
            match commands.send(BridgeCommand::NextSet) {
                Ok(()) => warp::reply::with_status(
                    warp::reply::json(&json!({"status": "queued"})),
                    StatusCode::ACCEPTED,
                ),
                Err(_) => {
                    log::warn!("next-set requested after the workout ended");
                    warp::reply::with_status(
                        warp::reply::json(&json!({"status": "closed"})),
                        StatusCode::SERVICE_UNAVAILABLE,
                    )
                }
            }
        });

    status_route.or(next_set_route)
}

/// Hosts the status endpoints until `shutdown` is cancelled.
pub fn spawn_bridge(
    board: StatusBoard,
    commands: UnboundedSender<BridgeCommand>,
    shutdown: CancelToken,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let (addr, server) = warp::serve(routes(board, commands))
        .try_bind_with_graceful_shutdown(bridge_bind_address(), async move {
            shutdown.cancelled().await;
        })
        .with_context(|| format!("binding status bridge on {}", bridge_bind_address()))?;
    log::info!("status bridge listening on http://{addr}");
    Ok((addr, tokio::spawn(server)))
}
