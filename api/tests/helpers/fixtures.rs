use chrono::{Duration, Utc};
use db::models::{OriginalityLabel, SubScores, SubmissionRecord};
use serde_json::{Value, json};
use util::test_helpers::zip_bytes;

use super::app::ASSIGNMENT;

const BOUNDARY: &str = "----BoundaryTest";

fn notebook(cells: &[(&str, &str)]) -> Value {
    let cells: Vec<Value> = cells
        .iter()
        .map(|(kind, src)| {
            let execution_count = if *kind == "code" { json!(1) } else { Value::Null };
            json!({
                "cell_type": kind,
                "metadata": {},
                "source": src,
                "outputs": [],
                "execution_count": execution_count,
            })
        })
        .collect();
    json!({ "nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": cells })
}

pub fn reference_notebook() -> Value {
    notebook(&[
        ("markdown", "# Housing prices\nReference solution for the regression exercise."),
        ("code", "import pandas as pd\nfrom sklearn.linear_model import LinearRegression\ndf = pd.read_csv('housing.csv')\ndf = df.dropna()\nX = df[['rooms', 'area']]\ny = df['price']\nmodel = LinearRegression().fit(X, y)\nprint(model.score(X, y))"),
    ])
}

pub fn student_notebook() -> Value {
    notebook(&[
        ("markdown", "## My take on the flowers dataset\nI explore petal widths first, then try two classifiers and compare their accuracy on a held-out split."),
        ("code", "import seaborn as sns\nfrom sklearn.ensemble import RandomForestClassifier\nfrom sklearn.metrics import accuracy_score\niris = sns.load_dataset('iris')\nfeatures = iris.drop(columns='species')\nclf = RandomForestClassifier(n_estimators=50)\nclf.fit(features[:100], iris.species[:100])\nprint(accuracy_score(iris.species[100:], clf.predict(features[100:])))"),
    ])
}

pub fn notebook_zip(notebook: &Value) -> Vec<u8> {
    let bytes = serde_json::to_vec(notebook).unwrap();
    zip_bytes(&[
        ("__MACOSX/._solution.ipynb", b"junk".as_slice()),
        ("solution/solution.ipynb", bytes.as_slice()),
    ])
}

/// Multipart body carrying one `file` field.
pub fn multipart_body(filename: &str, content: &[u8]) -> (Vec<u8>, String) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (body, format!("multipart/form-data; boundary={BOUNDARY}"))
}

/// Multipart body with a single text field and no file.
pub fn multipart_without_file() -> (Vec<u8>, String) {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    (
        body.into_bytes(),
        format!("multipart/form-data; boundary={BOUNDARY}"),
    )
}

pub fn history_record(
    submitter: &str,
    originality: OriginalityLabel,
    similarity: f64,
    scores: SubScores,
    minutes_ago: i64,
) -> SubmissionRecord {
    SubmissionRecord {
        submitter: submitter.to_string(),
        assignment: ASSIGNMENT.to_string(),
        originality,
        similarity,
        total: scores.sum(),
        scores,
        comment: String::new(),
        timestamp: Utc::now() - Duration::minutes(minutes_ago),
    }
}
