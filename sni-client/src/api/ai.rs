use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use crate::error::SniClientResult;
use crate::models::AiEvaluation;
use crate::SniClient;

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct EvaluateDto {
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 65536))]
    code: String,
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 32))]
    language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem_id: Option<i64>,
}

impl SniClient {
    /// AI-оценка кода; с `problem_id` оценка учитывает условие задачи.
    pub async fn evaluate_code(
        &self,
        code: &str,
        language: &str,
        problem_id: Option<i64>,
    ) -> SniClientResult<AiEvaluation> {
        let token = self.require_token()?;
        let payload = EvaluateDto {
            code: code.to_string(),
            language: language.trim().to_string(),
            problem_id,
        };
        payload.validate()?;
        self.http
            .send_json(Method::POST, "/api/ai/evaluate", &payload, Some(&token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_code_is_rejected() {
        let dto = EvaluateDto {
            code: "  \n ".to_string(),
            language: "rust".to_string(),
            problem_id: None,
        };
        let err = dto.validate().expect_err("must fail");
        assert!(err.field_errors().contains_key("code"));
    }

    #[test]
    fn problem_id_is_optional_in_payload() {
        let dto = EvaluateDto {
            code: "fn main() {}".to_string(),
            language: "rust".to_string(),
            problem_id: None,
        };
        assert!(dto.validate().is_ok());
        let raw = serde_json::to_value(&dto).expect("must serialize");
        assert!(raw.get("problemId").is_none());
    }
}
