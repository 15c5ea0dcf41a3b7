//! Static completeness check of a notebook.
//!
//! Looks for evidence of model training, preprocessing and evaluation in the
//! code cells, counts executed cells and error outputs, and derives a
//! suggested grade ceiling with the reasons for it. The report is advisory:
//! its reasons are shown to the student but never change the grade.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::notebook::Notebook;

static MODEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"LinearRegression\(|LogisticRegression|RandomForest|DecisionTree|GradientBoosting|XGB|LightGBM|LGBM|SVR\(|SVC\(|KNeighbors|\.fit\(")
        .expect("model pattern")
});

static PREPROCESSING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"train_test_split|StandardScaler|MinMaxScaler|Pipeline|ColumnTransformer|SimpleImputer|OneHotEncoder|LabelEncoder")
        .expect("preprocessing pattern")
});

static EVALUATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"mean_squared_error|mean_absolute_error|r2_score|cross_val_score|GridSearchCV|\.score\(|\.predict\(")
        .expect("evaluation pattern")
});

/// Metric families, matched case-insensitively.
static METRICS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("MSE", r"mean_squared_error|\bMSE\b"),
        ("RMSE", r"root_mean_squared_error|\bRMSE\b"),
        ("MAE", r"mean_absolute_error|\bMAE\b"),
        ("R2", r"r2_score|\bR2\b|R\^2"),
        ("MAPE", r"mean_absolute_percentage_error|\bMAPE\b"),
        ("Accuracy", r"accuracy_score|accuracy"),
        ("Precision", r"precision_score|precision"),
        ("Recall", r"recall_score|recall"),
        ("F1", r"f1_score|\bF1\b"),
        ("ROC-AUC", r"roc_auc_score|\bAUC\b"),
        ("Confusion matrix", r"confusion_matrix"),
        ("Classification report", r"classification_report"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("metric pattern");
        (name, re)
    })
    .collect()
});

/// Below this share of executed code cells the notebook is considered not run.
const MIN_EXECUTED_SHARE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub code_cells: usize,
    pub executed_cells: usize,
    pub has_errors: bool,
    pub trains_model: bool,
    pub preprocesses: bool,
    pub evaluates: bool,
    pub metrics: Vec<&'static str>,
    /// Highest grade the notebook plausibly deserves.
    pub suggested_ceiling: f64,
    pub reasons: Vec<String>,
}

impl CompletenessReport {
    pub fn executed_share(&self) -> f64 {
        if self.code_cells == 0 {
            0.0
        } else {
            self.executed_cells as f64 / self.code_cells as f64
        }
    }

    /// Reader-facing notes for the improvement list.
    pub fn advisories(&self) -> Vec<String> {
        self.reasons
            .iter()
            .map(|reason| format!("{reason} (suggested maximum {:.1}).", self.suggested_ceiling))
            .collect()
    }
}

pub fn analyse(notebook: &Notebook) -> CompletenessReport {
    let code_cells: Vec<_> = notebook.cells().iter().filter(|c| c.is_code()).collect();
    let executed_cells = code_cells.iter().filter(|c| c.execution_count.is_some()).count();
    let has_errors = code_cells.iter().any(|c| c.has_error_output());
    let code = code_cells
        .iter()
        .map(|c| c.source.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let trains_model = MODEL_PATTERN.is_match(&code);
    let preprocesses = PREPROCESSING_PATTERN.is_match(&code);
    let metrics: Vec<&'static str> = METRICS
        .iter()
        .filter(|(_, re)| re.is_match(&code))
        .map(|(name, _)| *name)
        .collect();
    let evaluates = EVALUATION_PATTERN.is_match(&code) || metrics.len() >= 2;

    let mut ceiling: f64 = 10.0;
    let mut reasons = Vec::new();

    if !trains_model {
        ceiling = ceiling.min(3.5);
        reasons.push("No machine learning model is trained".to_string());
    }
    if !preprocesses {
        ceiling = ceiling.min(4.0);
        reasons.push("No adequate preprocessing was found".to_string());
    }
    if trains_model && !evaluates {
        ceiling = ceiling.min(5.0);
        reasons.push("The models are not evaluated".to_string());
    }
    if trains_model && metrics.is_empty() {
        ceiling = ceiling.min(5.5);
        reasons.push("Models are trained but no evaluation metric is reported".to_string());
    }
    if has_errors {
        ceiling = ceiling.min(6.0);
        reasons.push("Some cells end with an execution error".to_string());
    }

    if !code_cells.is_empty() && (executed_cells as f64 / code_cells.len() as f64) < MIN_EXECUTED_SHARE {
        ceiling = ceiling.min(4.0);
        reasons.push("Fewer than 30% of the code cells were executed".to_string());
    }

    CompletenessReport {
        code_cells: code_cells.len(),
        executed_cells,
        has_errors,
        trains_model,
        preprocesses,
        evaluates,
        metrics,
        suggested_ceiling: ceiling,
        reasons,
    }
}
