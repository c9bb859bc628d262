use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use crate::error::SniClientResult;
use crate::models::{Page, Problem, Submission};
use crate::SniClient;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Параметры списка задач.
pub struct ProblemQuery {
    /// Номер страницы (с нуля).
    pub page: u32,
    /// Размер страницы.
    pub size: u32,
    /// Сложность (`EASY`, `MEDIUM`, `HARD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Поиск по названию.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl ProblemQuery {
    /// Страница заданного размера без фильтров.
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, 100),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SubmitDto {
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 32))]
    language: String,
    #[validate(custom(function = "crate::api::non_blank"), length(min = 1, max = 65536))]
    code: String,
}

impl SniClient {
    /// Список задач.
    pub async fn list_problems(&self, query: &ProblemQuery) -> SniClientResult<Page<Problem>> {
        self.http.get("/api/problems", Some(query), None).await
    }

    /// Задача по идентификатору.
    pub async fn get_problem(&self, id: i64) -> SniClientResult<Problem> {
        self.http
            .get::<(), _>(&format!("/api/problems/{id}"), None, None)
            .await
    }

    /// Отправляет решение задачи на проверку.
    pub async fn submit_solution(
        &self,
        problem_id: i64,
        language: &str,
        code: &str,
    ) -> SniClientResult<Submission> {
        let token = self.require_token()?;
        let payload = SubmitDto {
            language: language.trim().to_string(),
            code: code.to_string(),
        };
        payload.validate()?;
        self.http
            .send_json(
                Method::POST,
                &format!("/api/problems/{problem_id}/submissions"),
                &payload,
                Some(&token),
            )
            .await
    }

    /// Решение по идентификатору (для опроса вердикта).
    pub async fn get_submission(&self, id: i64) -> SniClientResult<Submission> {
        let token = self.require_token()?;
        self.http
            .get::<(), _>(&format!("/api/submissions/{id}"), None, Some(&token))
            .await
    }

    /// Решения текущего пользователя по задаче.
    pub async fn my_submissions(&self, problem_id: i64) -> SniClientResult<Vec<Submission>> {
        let token = self.require_token()?;
        self.http
            .get::<(), _>(
                &format!("/api/problems/{problem_id}/submissions/my"),
                None,
                Some(&token),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_query_serializes_difficulty() {
        let query = ProblemQuery {
            difficulty: Some("HARD".to_string()),
            ..ProblemQuery::page(0, 10)
        };
        let raw = serde_json::to_value(&query).expect("must serialize");
        assert_eq!(raw, serde_json::json!({"page": 0, "size": 10, "difficulty": "HARD"}));
    }

    #[test]
    fn empty_solution_is_rejected() {
        let dto = SubmitDto {
            language: "java".to_string(),
            code: String::new(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn whitespace_only_solution_is_rejected() {
        let dto = SubmitDto {
            language: "java".to_string(),
            code: "   \n".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
