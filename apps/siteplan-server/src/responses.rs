use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use siteplan_contracts::ProblemDetails;

pub(crate) fn problem_response(status: StatusCode, title: &str, detail: Option<&str>) -> Response {
    let body = ProblemDetails {
        r#type: "about:blank".into(),
        title: title.into(),
        status: status.as_u16(),
        detail: detail.map(str::to_string),
        instance: None,
        code: None,
    };
    (status, Json(body)).into_response()
}
