use crate::bridge::state::SharedState;
use crate::nodes::RadarTracks;
use log::warn;
use radarfusion::msgs::DetectedObjects;
use serde_json::{json, Map, Value};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

type Response = WithStatus<Json>;

fn with_state(
    state: SharedState,
) -> impl Filter<Extract = (SharedState,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// `POST /objects`, `POST /radar_tracks`, `POST /params`, `GET /output`,
/// `GET /metrics`.
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let objects_route = warp::path("objects")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|objects: DetectedObjects, state: SharedState| {
            state.on_objects(objects);
            warp::reply::with_status(warp::reply::json(&json!({"status": "ok"})), StatusCode::ACCEPTED)
        });

    let tracks_route = warp::path("radar_tracks")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|tracks: RadarTracks, state: SharedState| {
            state.on_radar_tracks(tracks);
            warp::reply::with_status(warp::reply::json(&json!({"status": "ok"})), StatusCode::ACCEPTED)
        });

    let params_route = warp::path("params")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|updates: Map<String, Value>, state: SharedState| {
            match state.update_params(&updates) {
                Ok(()) => warp::reply::with_status(
                    warp::reply::json(&json!({"successful": true, "reason": "success"})),
                    StatusCode::OK,
                ),
                Err(err) => {
                    warn!("rejected parameter update: {:#}", err);
                    warp::reply::with_status(
                        warp::reply::json(&json!({
                            "successful": false,
                            "reason": format!("{:#}", err),
                        })),
                        StatusCode::BAD_REQUEST,
                    )
                }
            }
        });

    let output_route = warp::path("output")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: SharedState| match state.latest() {
            Some(output) => warp::reply::with_status(warp::reply::json(&output), StatusCode::OK),
            None => warp::reply::with_status(
                warp::reply::json(&json!({"status": "waiting for data"})),
                StatusCode::NOT_FOUND,
            ),
        });

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .map(|state: SharedState| {
            warp::reply::with_status(warp::reply::json(&state.metrics()), StatusCode::OK)
        });

    objects_route
        .or(tracks_route)
        .unify()
        .or(params_route)
        .unify()
        .or(output_route)
        .unify()
        .or(metrics_route)
        .unify()
}
