#[cfg(test)]
mod tests {
    use crate::helpers::app::{ASSIGNMENT, TestOptions, make_test_app, make_test_app_with};
    use axum::http::StatusCode;
    use chrono::Duration;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn health_reports_open_assignment() {
        let app = make_test_app().await;
        let (status, json) = app.get("/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Portal is up");
        assert_eq!(json["data"]["assignment"], ASSIGNMENT);
        assert_eq!(json["data"]["accepting_submissions"], true);
        assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["data"]["deadline"].is_string());
        assert_eq!(app.sync.pulls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn health_reports_closed_assignment_after_deadline() {
        let app = make_test_app_with(TestOptions {
            deadline_in: Duration::hours(-1),
            ..TestOptions::default()
        })
        .await;
        let (status, json) = app.get("/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["accepting_submissions"], false);
    }
}
