// HTTP request handlers
use crate::application::dashboard_service::WindowOutcome;
use crate::domain::dashboard::DashboardView;
use crate::domain::record::RawTimestamp;
use crate::domain::window::ZoomDirection;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ZoomRequest {
    pub direction: ZoomDirection,
}

#[derive(Deserialize)]
pub struct LastDaysRequest {
    pub days: u32,
}

#[derive(Deserialize)]
pub struct RangeRequest {
    pub start: RawTimestamp,
    pub end: RawTimestamp,
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub time: RawTimestamp,
}

#[derive(Serialize)]
pub struct SelectResponse {
    pub applied: bool,
    pub selection: Option<i64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard view
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

pub async fn zoom(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ZoomRequest>,
) -> Json<WindowOutcome> {
    Json(state.dashboard.zoom(request.direction).await)
}

pub async fn reset_zoom(State(state): State<Arc<AppState>>) -> Json<WindowOutcome> {
    Json(state.dashboard.reset_zoom().await)
}

pub async fn filter_last_days(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LastDaysRequest>,
) -> Json<WindowOutcome> {
    Json(state.dashboard.filter_last_n_days(request.days).await)
}

pub async fn set_range(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RangeRequest>,
) -> Json<WindowOutcome> {
    Json(state.dashboard.set_manual_range(&request.start, &request.end).await)
}

pub async fn select_point(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> Json<SelectResponse> {
    let selected = state.dashboard.select(&request.time).await;
    let selection = match selected {
        Some(_) => selected,
        None => state.dashboard.selection().await,
    };
    Json(SelectResponse {
        applied: selected.is_some(),
        selection,
    })
}

pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.dashboard.clear_selection().await;
    StatusCode::NO_CONTENT
}

/// Download the current snapshot as a JSON attachment
pub async fn export_snapshot(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard.export().await {
        Some(snapshot) => {
            let disposition = format!("attachment; filename=\"{}\"", state.export_file_name);
            ([(header::CONTENT_DISPOSITION, disposition)], Json(snapshot)).into_response()
        }
        None => (StatusCode::NOT_FOUND, "No data to record.").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::domain::record::RawRecord;
    use crate::domain::snapshot::DashboardPayload;
    use crate::domain::window::{WindowMode, WindowSettings};
    use chrono::Utc;
    use std::time::Duration;

    async fn app(points: &[(f64, i64, f64)]) -> Arc<AppState> {
        let dashboard = DashboardService::new(WindowSettings::default(), Duration::from_millis(1500));
        let payload = DashboardPayload {
            records: points
                .iter()
                .map(|(t, s, rt)| RawRecord::new(RawTimestamp::Millis(*t), *s, *rt))
                .collect(),
            ..DashboardPayload::default()
        };
        dashboard.shared_state().write().await.apply_snapshot(1, payload, Utc::now());
        Arc::new(AppState {
            dashboard,
            export_file_name: "recorded_data.json".to_string(),
        })
    }

    #[tokio::test]
    async fn test_dashboard_view() {
        let state = app(&[(0.0, 200, 100.0), (60000.0, 500, 300.0)]).await;
        let Json(view) = get_dashboard(State(state)).await;
        assert_eq!(view.metrics.success_count, 1);
        assert_eq!(view.metrics.availability_pct, 50.0);
        assert_eq!(view.records.len(), 2);
    }

    #[tokio::test]
    async fn test_range_rejection_is_not_an_error() {
        let state = app(&[(0.0, 200, 100.0), (60000.0, 500, 300.0)]).await;
        let request = RangeRequest {
            start: RawTimestamp::Text("1970-01-01T00:00:50Z".into()),
            end: RawTimestamp::Text("1970-01-01T00:00:10Z".into()),
        };
        let Json(outcome) = set_range(State(state), Json(request)).await;
        assert!(!outcome.applied);
        assert_eq!(outcome.window.unwrap().mode, WindowMode::Full);
    }

    #[tokio::test]
    async fn test_select_and_clear() {
        let state = app(&[(0.0, 200, 100.0), (60000.0, 500, 300.0)]).await;
        let request = SelectRequest { time: RawTimestamp::Millis(60000.0) };
        let Json(response) = select_point(State(state.clone()), Json(request)).await;
        assert!(response.applied);
        assert_eq!(response.selection, Some(60000));

        let bad = SelectRequest { time: RawTimestamp::Text("nope".into()) };
        let Json(response) = select_point(State(state.clone()), Json(bad)).await;
        assert!(!response.applied);
        assert_eq!(response.selection, Some(60000));

        assert_eq!(clear_selection(State(state.clone())).await, StatusCode::NO_CONTENT);
        let Json(view) = get_dashboard(State(state)).await;
        assert_eq!(view.selection, None);
    }

    #[tokio::test]
    async fn test_export_attachment() {
        let state = app(&[(0.0, 200, 100.0), (60000.0, 500, 300.0)]).await;
        let response = export_snapshot(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"recorded_data.json\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["summary"]["avgRequestsPerMinute"], 2.0);
        assert_eq!(json["rawRecords"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_export_empty_is_not_found() {
        let state = app(&[]).await;
        let response = export_snapshot(State(state)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_request_bodies_accept_numbers_and_text() {
        let range: RangeRequest =
            serde_json::from_str(r#"{"start": 1000, "end": "2024-01-01T00:00"}"#).unwrap();
        assert_eq!(range.start, RawTimestamp::Millis(1000.0));
        assert_eq!(range.end, RawTimestamp::Text("2024-01-01T00:00".into()));

        let zoom: ZoomRequest = serde_json::from_str(r#"{"direction": "out"}"#).unwrap();
        assert_eq!(zoom.direction, ZoomDirection::Out);
    }
}
