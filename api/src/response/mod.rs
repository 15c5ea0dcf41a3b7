use serde::Serialize;

/// Envelope for every JSON body the portal returns.
///
/// ```json
/// {
///   "success": true,
///   "data": { "submitter": "alice", "synced": true },
///   "message": "Submission recorded"
/// }
/// ```
///
/// Failures carry `success: false`, a default `data` payload and the reason in `message`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Failure response. `data` is `T::default()`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}
