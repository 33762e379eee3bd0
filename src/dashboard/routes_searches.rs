//! Search endpoints: one handler per question, each running exactly one search.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::warn;

use super::{error_response, int_param, run_blocking, AppState, Params};
use crate::palindromic::PalindromeError;
use crate::prom_metrics::ProblemLabel;
use crate::{
    brocard, conjectures, kaprekar, mersenne, palindromic, parse_integer, perfect, repunit,
    wieferich,
};

/// Kaprekar search as a server-sent event stream, one `data:` frame per event.
pub(super) async fn handler_q1_stream(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> impl IntoResponse {
    let start = int_param(&params, "start", 1000);
    let end = int_param(&params, "end", 3000);
    let (rx, handle) = kaprekar::stream(
        start,
        end,
        state.config.mr_rounds,
        state.config.stream_buffer,
    );

    state.prom_metrics.streams_active.inc();
    let watcher = Arc::clone(&state);
    let started = std::time::Instant::now();
    tokio::spawn(async move {
        if let Err(e) = handle.await {
            warn!(error = %e, "kaprekar stream task panicked");
        }
        watcher.prom_metrics.streams_active.dec();
        let label = ProblemLabel::new("kaprekar");
        watcher.prom_metrics.searches.get_or_create(&label).inc();
        watcher
            .prom_metrics
            .search_duration
            .get_or_create(&label)
            .observe(started.elapsed().as_secs_f64());
    });

    let events = ReceiverStream::new(rx).map(|event| Event::default().json_data(event));
    Sse::new(events)
}

pub(super) async fn handler_q2_repunit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Response {
    let start = int_param(&params, "start", 2);
    let end = int_param(&params, "end", 1040);
    let opts = state.config.search_options();
    let result = match run_blocking("repunit", move || repunit::search(start, end, &opts)).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match result {
        Ok(r) => {
            state
                .prom_metrics
                .record_search("repunit", r.repunit_primes.len(), r.runtime_seconds);
            Json(r).into_response()
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub(super) async fn handler_q3_mersenne(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Response {
    let start = int_param(&params, "start", 2201);
    let end = int_param(&params, "end", 2300);
    let opts = state.config.search_options();
    let search_state = Arc::clone(&state);
    let result = match run_blocking("mersenne", move || {
        mersenne::search(start, end, &search_state.cache, &opts)
    })
    .await
    {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match result {
        Ok(r) => {
            state
                .prom_metrics
                .record_search("mersenne", r.mersenne_primes.len(), r.runtime_seconds);
            Json(r).into_response()
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub(super) async fn handler_q4_brocard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Response {
    let start_p = params.get("startP").cloned();
    let end_p = params.get("endP").cloned();
    let mr_rounds = state.config.mr_rounds;
    let search_state = Arc::clone(&state);
    match run_blocking("brocard", move || {
        brocard::evaluate(
            start_p.as_deref(),
            end_p.as_deref(),
            &search_state.cache,
            mr_rounds,
        )
    })
    .await
    {
        Ok(r) => {
            state
                .prom_metrics
                .record_search("brocard", r.primes.len(), r.runtime_seconds);
            Json(r).into_response()
        }
        Err(resp) => resp,
    }
}

pub(super) async fn handler_q5_palindromic(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Response {
    let min_digits = int_param(&params, "min_digits", 50);
    let max_candidates = state.config.palindrome_max_candidates;
    let opts = state.config.search_options();
    let result = match run_blocking("palindromic", move || {
        palindromic::search(min_digits, max_candidates, &opts)
    })
    .await
    {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match result {
        Ok(r) => {
            state
                .prom_metrics
                .record_search("palindromic", 1, r.runtime_seconds);
            Json(r).into_response()
        }
        Err(e @ PalindromeError::StepLimit {
            candidates_tested, ..
        }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": e.to_string(),
                "candidates_tested": candidates_tested,
            })),
        )
            .into_response(),
        Err(e @ PalindromeError::TooLong { .. }) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

pub(super) async fn handler_q6_perfect(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Response {
    let exponents = perfect::parse_exponents(params.get("p_values").map(String::as_str));
    let started = std::time::Instant::now();
    match run_blocking("perfect", move || perfect::derive(&exponents)).await {
        Ok(r) => {
            state.prom_metrics.record_search(
                "perfect",
                r.perfect_numbers.len(),
                started.elapsed().as_secs_f64(),
            );
            Json(r).into_response()
        }
        Err(resp) => resp,
    }
}

/// `part` selects the problem: `a` Wieferich, `e` Legendre, `f` Oppermann.
pub(super) async fn handler_q7_open_problems(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Response {
    let part = match params.get("part").map(String::as_str) {
        None | Some("") => {
            return error_response(StatusCode::BAD_REQUEST, "Provide 'part' parameter (a/e/f)")
        }
        Some(p) => p,
    };

    match part {
        "a" => {
            let start = int_param(&params, "start", 2);
            let end = int_param(&params, "end", 4000);
            let opts = state.config.search_options();
            match run_blocking("wieferich", move || wieferich::search(start, end, &opts)).await {
                Ok(r) => {
                    state.prom_metrics.record_search(
                        "wieferich",
                        r.wieferich_primes.len(),
                        r.runtime_seconds,
                    );
                    Json(r).into_response()
                }
                Err(resp) => resp,
            }
        }
        "e" | "f" => {
            let name = if part == "e" { "Legendre" } else { "Oppermann" };
            let raw = match params.get("N").filter(|s| !s.is_empty()) {
                Some(raw) => raw,
                None => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Provide N for {}", name),
                    )
                }
            };
            let n = match parse_integer(raw) {
                Ok(n) => n,
                Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
            };
            if part == "e" {
                match run_blocking("legendre", move || conjectures::legendre(&n)).await {
                    Ok(r) => {
                        state.prom_metrics.record_search(
                            "legendre",
                            usize::from(r.is_valid),
                            r.runtime_seconds,
                        );
                        Json(r).into_response()
                    }
                    Err(resp) => resp,
                }
            } else {
                match run_blocking("oppermann", move || conjectures::oppermann(&n)).await {
                    Ok(r) => {
                        state.prom_metrics.record_search(
                            "oppermann",
                            usize::from(r.is_valid1) + usize::from(r.is_valid2),
                            r.runtime_seconds,
                        );
                        Json(r).into_response()
                    }
                    Err(resp) => resp,
                }
            }
        }
        _ => error_response(
            StatusCode::BAD_REQUEST,
            "Invalid part. Use 'a', 'e', or 'f'.",
        ),
    }
}
