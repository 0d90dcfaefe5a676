//! Fitness comment: a model-written interpretation of one student's
//! measurements.
//!
//! Same discipline as the search endpoint, plus a keyword gate that rejects
//! off-topic requests before any inference spend.

use serde_json::Value;
use tracing::{field, info, info_span, warn, Instrument, Span};

use crate::auth::{require_caller, AuthenticatedUser};
use crate::error::ApiError;
use crate::http::decode_body;
use crate::inference::{ensure_configured, infer_object, InferenceGateway};
use crate::models::{FitnessCommentRequest, FitnessCommentResponse};
use crate::prompt::{build_fitness_prompt, FitnessPromptInput};
use crate::trace::TraceId;
use crate::validate::validate_comment;
use crate::{Error, Result};

/// Body-composition and training vocabulary, Turkish and English, lowercase.
const FITNESS_KEYWORDS: &[&str] = &[
    // tr
    "kilo",
    "ağırlık",
    "yağ",
    "kas",
    "bel",
    "kalça",
    "basen",
    "göğüs",
    "omuz",
    "kol",
    "bacak",
    "baldır",
    "boy",
    "vki",
    "ölçü",
    "antrenman",
    "egzersiz",
    "idman",
    "kalori",
    "beslenme",
    "diyet",
    "nabız",
    "kardiyo",
    "kondisyon",
    // en
    "weight",
    "fat",
    "muscle",
    "waist",
    "hip",
    "chest",
    "shoulder",
    "arm",
    "thigh",
    "calf",
    "height",
    "bmi",
    "body",
    "measurement",
    "training",
    "workout",
    "exercise",
    "calorie",
    "protein",
    "nutrition",
    "diet",
    "cardio",
    "strength",
    "squat",
    "bench",
    "deadlift",
    "heart rate",
];

/// True when the question or the measurements mention fitness vocabulary.
pub fn is_fitness_related(question: Option<&str>, measurements: &Value) -> bool {
    let measurements_text = serde_json::to_string(measurements).unwrap_or_default();
    let haystack = format!("{} {}", question.unwrap_or_default(), measurements_text).to_lowercase();
    FITNESS_KEYWORDS.iter().any(|kw| haystack.contains(kw))
}

/// Endpoint boundary for the fitness comment call.
///
/// `path_student_id` is the `{id}` route segment. It stands in for a missing
/// `studentId` and must agree with it when both are sent.
pub async fn fitness_comment(
    gateway: &dyn InferenceGateway,
    caller: Option<&AuthenticatedUser>,
    path_student_id: Option<&str>,
    body: &[u8],
    trace_id: &TraceId,
) -> std::result::Result<FitnessCommentResponse, ApiError> {
    let span = info_span!("fitness_comment", trace_id = %trace_id, uid = field::Empty);
    async {
        run_comment(gateway, caller, path_student_id, body, trace_id)
            .await
            .map_err(|err| {
                if err.is_client_facing() {
                    warn!(code = err.code().as_str(), "Fitness comment rejected: {}", err);
                }
                ApiError::from_error(err, trace_id)
            })
    }
    .instrument(span)
    .await
}

async fn run_comment(
    gateway: &dyn InferenceGateway,
    caller: Option<&AuthenticatedUser>,
    path_student_id: Option<&str>,
    body: &[u8],
    trace_id: &TraceId,
) -> Result<FitnessCommentResponse> {
    let caller = require_caller(caller)?;
    Span::current().record("uid", caller.user_id.as_str());
    let request: FitnessCommentRequest = decode_body(body)?;

    let body_id = request.student_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let path_id = path_student_id.map(str::trim).filter(|s| !s.is_empty());
    let student_id = match (body_id, path_id) {
        (Some(from_body), Some(from_path)) if from_body != from_path => {
            return Err(Error::invalid_argument("studentId does not match the path"));
        }
        (Some(id), _) | (None, Some(id)) => id,
        (None, None) => return Err(Error::invalid_argument("studentId is required")),
    };
    let measurements = match &request.measurements {
        Some(value @ Value::Object(_)) => value,
        _ => return Err(Error::invalid_argument("measurements must be an object")),
    };

    if !is_fitness_related(request.question.as_deref(), measurements) {
        return Err(Error::failed_precondition(
            "Only fitness measurement interpretation is supported",
        ));
    }
    ensure_configured(gateway)?;

    let input = FitnessPromptInput {
        student_id,
        goal: request.goal.as_deref(),
        question: request.question.as_deref(),
        measurements,
    };
    let prompt = build_fitness_prompt(&input, request.locale)?;
    let parsed = infer_object(gateway, &prompt, trace_id).await?;
    let response = validate_comment(&parsed, request.locale);

    info!(
        uid = %caller.user_id,
        measurement_count = measurements.as_object().map(|m| m.len()).unwrap_or_default(),
        warning_count = response.warnings.len(),
        step_count = response.next_steps.len(),
        "Fitness comment completed"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{block_on, caller, capture_logs, ScriptedGateway};
    use crate::validate::{COMMENT_FALLBACK_EN, COMMENT_FALLBACK_TR};
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn measurement_body() -> Vec<u8> {
        body(json!({
            "studentId": "s-1",
            "locale": "en",
            "goal": "lose fat",
            "measurements": {"weight": 82.4, "bodyFat": 24.1, "waist": 91, "phone": "05321234567"},
            "question": "How is the progress? Reach me at coach@gym.io"
        }))
    }

    #[test]
    fn test_keyword_gate() {
        assert!(!is_fitness_related(Some("what's the weather today"), &json!({})));
        assert!(is_fitness_related(Some("Kilo verme hızı nasıl?"), &json!({})));
        assert!(is_fitness_related(None, &json!({"Waist": 80})));
        assert!(is_fitness_related(Some("BMI?"), &json!({})));
    }

    #[tokio::test]
    async fn test_off_topic_rejected_before_inference() {
        let gateway = ScriptedGateway::reply(r#"{"summary":"x"}"#);
        let err = fitness_comment(
            &gateway,
            Some(&caller()),
            None,
            &body(json!({"studentId": "s-1", "question": "what's the weather today", "measurements": {}})),
            &TraceId::from("t-1"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FailedPrecondition);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_happy_path() {
        let gateway = ScriptedGateway::reply(
            r#"{"summary":"Waist is trending down.","warnings":["Low protein"],"nextSteps":["Add a strength day"],"tags":["fat-loss"]}"#,
        );
        let result = fitness_comment(&gateway, Some(&caller()), None, &measurement_body(), &TraceId::from("t-2"))
            .await
            .unwrap();
        assert_eq!(
            result,
            FitnessCommentResponse {
                summary: "Waist is trending down.".to_string(),
                warnings: vec!["Low protein".to_string()],
                next_steps: vec!["Add a strength day".to_string()],
                tags: vec!["fat-loss".to_string()],
            }
        );

        let prompt = gateway.last_prompt().unwrap();
        assert!(!prompt.user.contains("05321234567"));
        assert!(!prompt.user.contains("coach@gym.io"));
        assert!(prompt.system.contains("Write in English"));
    }

    #[tokio::test]
    async fn test_non_json_output_falls_back() {
        let gateway = ScriptedGateway::reply("I cannot help.");
        let result = fitness_comment(&gateway, Some(&caller()), None, &measurement_body(), &TraceId::from("t-3"))
            .await
            .unwrap();
        assert_eq!(
            result,
            FitnessCommentResponse {
                summary: COMMENT_FALLBACK_EN.to_string(),
                warnings: vec![],
                next_steps: vec![],
                tags: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_fallback_follows_locale() {
        let gateway = ScriptedGateway::reply("{}");
        let result = fitness_comment(
            &gateway,
            Some(&caller()),
            None,
            &body(json!({"studentId": "s-1", "measurements": {"kilo": 70}})),
            &TraceId::from("t-4"),
        )
        .await
        .unwrap();
        assert_eq!(result.summary, COMMENT_FALLBACK_TR);
    }

    #[tokio::test]
    async fn test_unauthenticated_before_validation() {
        let gateway = ScriptedGateway::reply("{}");
        let err = fitness_comment(&gateway, None, None, b"{}", &TraceId::from("t-5"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let gateway = ScriptedGateway::reply("{}");
        let cases = [
            json!({"measurements": {"weight": 80}}),
            json!({"studentId": "  ", "measurements": {"weight": 80}}),
            json!({"studentId": "s-1"}),
            json!({"studentId": "s-1", "measurements": null}),
            json!({"studentId": "s-1", "measurements": [80, 81]}),
        ];
        for case in cases {
            let err = fitness_comment(&gateway, Some(&caller()), None, &body(case.clone()), &TraceId::from("t-6"))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidArgument, "case {}", case);
        }
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_measurements_accepted_when_question_on_topic() {
        let gateway = ScriptedGateway::reply(r#"{"summary":"Share your latest weight."}"#);
        let result = fitness_comment(
            &gateway,
            Some(&caller()),
            None,
            &body(json!({"studentId": "s-1", "measurements": {}, "question": "How should I structure training?"})),
            &TraceId::from("t-7"),
        )
        .await
        .unwrap();
        assert_eq!(result.summary, "Share your latest weight.");
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure() {
        let gateway = ScriptedGateway::failing(Error::AiService);
        let err = fitness_comment(&gateway, Some(&caller()), None, &measurement_body(), &TraceId::from("t-8"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.trace_id, "t-8");
    }

    #[test]
    fn test_rejection_logs_carry_caller_and_trace() {
        let logs = capture_logs(|| {
            let gateway = ScriptedGateway::reply("{}");
            let err = block_on(fitness_comment(
                &gateway,
                Some(&caller()),
                None,
                &body(json!({"studentId": "s-1", "question": "what's the weather today", "measurements": {}})),
                &TraceId::from("t-20"),
            ))
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::FailedPrecondition);
        });

        let line = logs
            .lines()
            .find(|l| l.contains("Fitness comment rejected"))
            .unwrap_or_else(|| panic!("no rejection entry in {}", logs));
        assert!(line.contains(r#""uid":"coach-1""#), "{}", line);
        assert!(line.contains(r#""trace_id":"t-20""#), "{}", line);
    }

    #[tokio::test]
    async fn test_path_id_fills_missing_student_id() {
        let gateway = ScriptedGateway::reply(r#"{"summary":"ok"}"#);
        let result = fitness_comment(
            &gateway,
            Some(&caller()),
            Some("s-9"),
            &body(json!({"measurements": {"weight": 80}})),
            &TraceId::from("t-9"),
        )
        .await
        .unwrap();
        assert_eq!(result.summary, "ok");

        let user: Value = serde_json::from_str(&gateway.last_prompt().unwrap().user).unwrap();
        assert_eq!(user["studentId"], "s-9");
    }

    #[tokio::test]
    async fn test_path_and_body_ids_must_agree() {
        let gateway = ScriptedGateway::reply(r#"{"summary":"ok"}"#);
        let err = fitness_comment(
            &gateway,
            Some(&caller()),
            Some("s-2"),
            &body(json!({"studentId": "s-1", "measurements": {"weight": 80}})),
            &TraceId::from("t-10"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert_eq!(gateway.calls(), 0);

        let result = fitness_comment(
            &gateway,
            Some(&caller()),
            Some(" s-1 "),
            &body(json!({"studentId": "s-1", "measurements": {"weight": 80}})),
            &TraceId::from("t-11"),
        )
        .await
        .unwrap();
        assert_eq!(result.summary, "ok");
    }
}
