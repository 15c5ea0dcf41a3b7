use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::response::ApiResponse;
use crate::services::ServiceError;
use crate::services::submission::process_submission;
use crate::state::AppState;

/// POST /api/submissions
///
/// Upload a submission archive for the current assignment.
///
/// ### Multipart Body (form-data)
/// - `file` (single `.zip`, named `<prefix><number>-<name>.zip`)
///
/// ### Example curl
/// ```bash
/// curl -X POST http://localhost:3000/api/submissions \
///   -F "file=@cap2-alice.zip"
/// ```
///
/// ### Responses
/// - `201 Created` with the assessment receipt
/// - `202 Accepted` when the submission was stored but the push failed (`data.synced == false`)
/// - `400 Bad Request` (no file, bad filename, unknown submitter, no notebook in the archive)
/// - `403 Forbidden` (deadline passed)
/// - `409 Conflict` (state repository could not be pulled)
/// - `502 Bad Gateway` (reference notebook unavailable)
pub async fn submit(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (file_name, bytes) = match read_file_field(multipart).await {
        Ok(file) => file,
        Err(e) => return e.into_response(),
    };

    tracing::info!(file = %file_name, size = bytes.len(), "submission received");

    match process_submission(&state, &file_name, &bytes).await {
        Ok(receipt) => {
            let (status, message) = if receipt.synced {
                (StatusCode::CREATED, "Submission recorded")
            } else {
                (
                    StatusCode::ACCEPTED,
                    "Submission recorded locally; synchronisation pending",
                )
            };
            (status, Json(ApiResponse::success(receipt, message))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InputValidation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::InputValidation("file field has no filename".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InputValidation(format!("could not read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(ServiceError::InputValidation("uploaded file is empty".into()));
        }
        return Ok((file_name, bytes.to_vec()));
    }
    Err(ServiceError::InputValidation("missing 'file' field".into()))
}
