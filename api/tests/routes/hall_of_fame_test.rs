#[cfg(test)]
mod tests {
    use crate::helpers::app::make_test_app;
    use crate::helpers::fixtures::history_record;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use db::models::{OriginalityLabel, SubScores};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    #[tokio::test]
    async fn empty_history_has_no_winners() {
        let app = make_test_app().await;
        let (status, json) = app.get("/api/hall-of-fame").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn standings_are_provisional() {
        let app = make_test_app().await;
        app.seed_history(&[
            history_record(
                "alice",
                OriginalityLabel::Original,
                0.1,
                SubScores {
                    exploration: 2.0,
                    preprocessing: 2.0,
                    modeling: 3.0,
                    evaluation: 2.0,
                    documentation: 0.5,
                },
                30,
            ),
            history_record(
                "bob",
                OriginalityLabel::Original,
                0.3,
                SubScores {
                    exploration: 1.0,
                    preprocessing: 1.0,
                    modeling: 1.0,
                    evaluation: 1.0,
                    documentation: 1.0,
                },
                20,
            ),
        ]);

        let (status, json) = app.get("/api/hall-of-fame").await;

        assert_eq!(status, StatusCode::OK);
        let entries = json["data"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["award"], "BestOverall");
        assert_eq!(entries[0]["title"], "Best Overall");
        assert_eq!(entries[0]["marker"], "🏆");
        assert_eq!(entries[0]["submitter"], "alice");
        assert_eq!(entries[1]["award"], "BestDocumented");
        assert_eq!(entries[1]["submitter"], "bob");

        let registry = app.registry().load().unwrap();
        assert_eq!(registry.cell("alice", "Chapter 2"), Some("✅"));
        assert!(app.commits().is_empty());
    }

    #[tokio::test]
    async fn provisional_ranking_waits_for_a_running_upload() {
        let app = make_test_app().await;
        let guard = app.state.write_lock().lock().await;

        let router = app.router.clone();
        let pending = tokio::spawn(async move {
            let req = Request::builder().uri("/api/hall-of-fame").body(Body::empty()).unwrap();
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
