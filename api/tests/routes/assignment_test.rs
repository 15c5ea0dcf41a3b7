#[cfg(test)]
mod tests {
    use crate::helpers::app::{TestOptions, make_test_app, make_test_app_with};
    use crate::helpers::fixtures::history_record;
    use axum::http::StatusCode;
    use chrono::Duration;
    use db::models::{OriginalityLabel, SubScores};

    fn scores(total_share: f64) -> SubScores {
        SubScores {
            exploration: 2.0 * total_share,
            preprocessing: 2.0 * total_share,
            modeling: 3.0 * total_share,
            evaluation: 2.0 * total_share,
            documentation: 1.0 * total_share,
        }
    }

    #[tokio::test]
    async fn open_assignment_is_described() {
        let app = make_test_app().await;
        let (status, json) = app.get("/api/assignment").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["id"], "Chapter 2");
        assert_eq!(json["data"]["column"], "Chapter 2");
        assert_eq!(json["data"]["open"], true);
        assert_eq!(json["data"]["filename_pattern"], "cap<number>-<name>.zip");
    }

    #[tokio::test]
    async fn closing_before_deadline_changes_nothing() {
        let app = make_test_app().await;
        let (status, json) = app.post_empty("/api/assignment/close").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"]["status"], "not_due");
        assert!(app.commits().is_empty());
    }

    #[tokio::test]
    async fn closing_without_eligible_records_writes_nothing() {
        let app = make_test_app_with(TestOptions {
            deadline_in: Duration::hours(-1),
            ..TestOptions::default()
        })
        .await;
        app.seed_history(&[history_record(
            "alice",
            OriginalityLabel::DirectCopy,
            1.0,
            SubScores::default(),
            90,
        )]);

        let (status, json) = app.post_empty("/api/assignment/close").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"]["status"], "no_eligible");
        assert!(app.commits().is_empty());
    }

    #[tokio::test]
    async fn closing_records_awards_once() {
        let app = make_test_app_with(TestOptions {
            deadline_in: Duration::hours(-1),
            ..TestOptions::default()
        })
        .await;
        app.seed_history(&[
            history_record("alice", OriginalityLabel::Original, 0.2, scores(0.9), 120),
            history_record("bob", OriginalityLabel::Inspired, 0.75, scores(0.6), 100),
            history_record("carol", OriginalityLabel::ModifiedCopy, 0.9, scores(1.0), 80),
        ]);

        let (status, json) = app.post_empty("/api/assignment/close").await;

        assert_eq!(status, StatusCode::OK);
        let outcome = &json["data"]["outcome"];
        assert_eq!(outcome["status"], "closed");
        assert_eq!(outcome["changes"], 2);
        assert_eq!(outcome["awards"]["winners"]["BestOverall"]["submitter"], "alice");
        assert_eq!(outcome["awards"]["winners"]["BestDocumented"]["submitter"], "bob");
        assert_eq!(json["data"]["synced"], true);

        let registry = app.registry().load().unwrap();
        assert_eq!(registry.cell("alice", "Chapter 2"), Some("🏆"));
        assert_eq!(registry.cell("bob", "Chapter 2"), Some("📝"));
        assert_eq!(registry.cell("carol", "Chapter 2"), Some("✅"));
        assert_eq!(app.commits(), vec!["Chapter 2 - awards".to_string()]);

        let (_, again) = app.post_empty("/api/assignment/close").await;
        assert_eq!(again["data"]["outcome"]["status"], "already_closed");
        assert_eq!(app.commits().len(), 1);

        let (_, described) = app.get("/api/assignment").await;
        assert_eq!(described["data"]["open"], false);
    }
}
