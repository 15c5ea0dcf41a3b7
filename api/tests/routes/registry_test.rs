#[cfg(test)]
mod tests {
    use crate::helpers::app::{ROSTER, make_test_app};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    #[tokio::test]
    async fn registry_lists_roster_and_columns() {
        let app = make_test_app().await;
        let (status, json) = app.get("/api/registry").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["headers"], serde_json::json!(["Name", "Chapter 2"]));
        let rows = json["data"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), ROSTER.len());
        assert_eq!(rows[0]["Name"], "Alice");
        assert_eq!(rows[0]["Chapter 2"], "");
        assert_eq!(app.sync.pulls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_registry_is_a_server_error() {
        let app = make_test_app().await;
        std::fs::remove_file(app.registry().path()).unwrap();

        let (status, json) = app.get("/api/registry").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn registry_waits_for_a_running_upload() {
        let app = make_test_app().await;
        let guard = app.state.write_lock().lock().await;

        let router = app.router.clone();
        let pending = tokio::spawn(async move {
            let req = Request::builder().uri("/api/registry").body(Body::empty()).unwrap();
            router.oneshot(req).await.unwrap().status()
        });
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!pending.is_finished());
        assert_eq!(app.sync.pulls.load(Ordering::SeqCst), 0);

        drop(guard);
        assert_eq!(pending.await.unwrap(), StatusCode::OK);
        assert_eq!(app.sync.pulls.load(Ordering::SeqCst), 1);
    }
}
