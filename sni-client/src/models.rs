use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Даты от бэкенда: RFC 3339 со смещением или `LocalDateTime` без него
/// (`2024-05-01T12:00:00`), который считается UTC. Нераспознанное значение
/// превращается в `None`, а не в ошибку разбора всего объекта.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(text)) => parse(&text),
            _ => None,
        })
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Some(value.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Ранг пользователя, вычисляемый бэкендом по набранным очкам.
pub enum Rank {
    /// Бронза.
    #[serde(alias = "BRONZE")]
    Bronze,
    /// Серебро.
    #[serde(alias = "SILVER")]
    Silver,
    /// Золото.
    #[serde(alias = "GOLD")]
    Gold,
    /// Платина.
    #[serde(alias = "PLATINUM")]
    Platinum,
    /// Алмаз.
    #[serde(alias = "DIAMOND")]
    Diamond,
    /// Мастер.
    #[serde(alias = "MASTER")]
    Master,
    /// Грандмастер.
    #[serde(alias = "GRANDMASTER")]
    Grandmaster,
    /// Легенда.
    #[serde(alias = "LEGEND")]
    Legend,
    /// Значение, которого клиент пока не знает.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Значок (badge), полученный пользователем.
pub struct Badge {
    /// Идентификатор значка.
    pub id: i64,
    /// Название.
    pub name: String,
    /// Описание условия получения.
    #[serde(default)]
    pub description: Option<String>,
    /// URL изображения, если бэкенд его отдаёт.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Когда значок был получен.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub acquired_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Профиль пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Email, он же адрес персональной очереди уведомлений.
    pub email: String,
    /// Никнейм.
    pub nickname: String,
    /// URL аватара.
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Описание профиля.
    #[serde(default)]
    pub bio: Option<String>,
    /// Накопленные очки.
    #[serde(default)]
    pub points: i64,
    /// Уровень.
    #[serde(default)]
    pub level: Option<i32>,
    /// Ранг.
    #[serde(default)]
    pub rank: Option<Rank>,
    /// Представительский значок, показываемый рядом с никнеймом.
    #[serde(default)]
    pub representative_badge: Option<Badge>,
    /// Дата регистрации.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Уровень пользователя и прогресс до следующего.
pub struct LevelInfo {
    /// Текущий уровень.
    pub level: i32,
    /// Текущий ранг.
    pub rank: Rank,
    /// Очки пользователя.
    pub points: i64,
    /// Сколько очков нужно для следующего уровня (`None` на максимальном).
    #[serde(default)]
    pub next_level_points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Краткие сведения об авторе поста/сниппета/комментария.
pub struct Author {
    /// Идентификатор автора.
    pub id: i64,
    /// Никнейм.
    pub nickname: String,
    /// URL аватара.
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Представительский значок автора.
    #[serde(default)]
    pub representative_badge: Option<Badge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Пост доски обсуждений.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Категория доски.
    #[serde(default)]
    pub category: Option<String>,
    /// Автор.
    #[serde(default)]
    pub author: Option<Author>,
    /// Число просмотров.
    #[serde(default)]
    pub view_count: i64,
    /// Число лайков.
    #[serde(default)]
    pub like_count: i64,
    /// Число комментариев.
    #[serde(default)]
    pub comment_count: i64,
    /// Лайкнул ли текущий пользователь.
    #[serde(default)]
    pub liked: bool,
    /// Дата создания.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    /// Дата последнего изменения.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Видимость сниппета.
pub enum Visibility {
    /// Виден всем.
    #[default]
    Public,
    /// Виден только автору.
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Сохранённый фрагмент кода.
pub struct Snippet {
    /// Идентификатор сниппета.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Описание.
    #[serde(default)]
    pub description: Option<String>,
    /// Код.
    pub code: String,
    /// Язык программирования.
    pub language: String,
    /// Теги.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Видимость.
    #[serde(default)]
    pub visibility: Visibility,
    /// Автор.
    #[serde(default)]
    pub author: Option<Author>,
    /// Число лайков.
    #[serde(default)]
    pub like_count: i64,
    /// Лайкнул ли текущий пользователь.
    #[serde(default)]
    pub liked: bool,
    /// Дата создания.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    /// Дата последнего изменения.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Комментарий к посту или сниппету.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст.
    pub content: String,
    /// Автор.
    #[serde(default)]
    pub author: Option<Author>,
    /// Родительский комментарий для ответов.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Дата создания.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    /// Дата последнего изменения.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Задача для практики.
pub struct Problem {
    /// Идентификатор задачи.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Условие.
    #[serde(default)]
    pub description: Option<String>,
    /// Сложность (`EASY`, `MEDIUM`, `HARD`, ...), как её отдаёт бэкенд.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Теги.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Пример входных данных.
    #[serde(default)]
    pub sample_input: Option<String>,
    /// Пример выходных данных.
    #[serde(default)]
    pub sample_output: Option<String>,
    /// Ограничение по времени, мс.
    #[serde(default)]
    pub time_limit: Option<i64>,
    /// Ограничение по памяти, МБ.
    #[serde(default)]
    pub memory_limit: Option<i64>,
    /// Число отправленных решений.
    #[serde(default)]
    pub submission_count: i64,
    /// Число принятых решений.
    #[serde(default)]
    pub accepted_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Вердикт проверки решения.
pub enum SubmissionStatus {
    /// Ожидает проверки.
    Pending,
    /// Принято.
    Accepted,
    /// Неверный ответ.
    WrongAnswer,
    /// Превышено время.
    TimeLimitExceeded,
    /// Ошибка выполнения.
    RuntimeError,
    /// Ошибка компиляции.
    CompileError,
    /// Статус, которого клиент пока не знает.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Отправленное решение задачи.
pub struct Submission {
    /// Идентификатор решения.
    pub id: i64,
    /// Задача.
    pub problem_id: i64,
    /// Язык.
    pub language: String,
    /// Код решения.
    #[serde(default)]
    pub code: Option<String>,
    /// Вердикт.
    pub status: SubmissionStatus,
    /// Время выполнения, мс.
    #[serde(default)]
    pub runtime: Option<i64>,
    /// Использованная память, КБ.
    #[serde(default)]
    pub memory: Option<i64>,
    /// Когда решение отправлено.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Результат AI-оценки кода.
pub struct AiEvaluation {
    /// Оценка, обычно 0..=100.
    pub score: i32,
    /// Краткий вывод.
    #[serde(default)]
    pub summary: String,
    /// Сильные стороны решения.
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Что стоит улучшить.
    #[serde(default)]
    pub improvements: Vec<String>,
    /// Предложенный вариант кода.
    #[serde(default)]
    pub refactored_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Уведомление пользователя (REST и websocket).
pub struct Notification {
    /// Идентификатор уведомления; у широковещательных может отсутствовать.
    #[serde(default)]
    pub id: Option<i64>,
    /// Тип (`COMMENT`, `LIKE`, `BADGE`, `NOTICE`, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Текст уведомления.
    #[serde(default)]
    pub message: String,
    /// Ссылка на объект уведомления.
    #[serde(default)]
    pub link: Option<String>,
    /// Прочитано ли.
    #[serde(default)]
    pub read: bool,
    /// Дата создания.
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Уведомление, у которого известен только текст.
    pub fn from_text(message: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: None,
            message: message.into(),
            link: None,
            read: false,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Файл, загруженный через `/api/files/upload`.
pub struct UploadedFile {
    /// Публичный URL файла.
    pub url: String,
    /// Исходное имя файла.
    #[serde(default)]
    pub original_name: Option<String>,
    /// Размер в байтах.
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Страница результатов в формате Spring `Page`.
pub struct Page<T> {
    /// Элементы текущей страницы.
    pub content: Vec<T>,
    /// Общее количество элементов.
    #[serde(default)]
    pub total_elements: u64,
    /// Общее количество страниц.
    #[serde(default)]
    pub total_pages: u32,
    /// Номер страницы (с нуля).
    #[serde(default)]
    pub number: u32,
    /// Размер страницы.
    #[serde(default)]
    pub size: u32,
    /// Последняя ли это страница.
    #[serde(default)]
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Пара access/refresh токенов.
pub struct TokenPair {
    /// Короткоживущий access token.
    pub access_token: String,
    /// Долгоживущий refresh token.
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Токены в ответе на вход: поля необязательны, пока payload не проверен.
pub struct RawTokens {
    /// Access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Ответ на вход (`/api/auth/login`, OAuth2 callback) до проверки.
pub struct LoginPayload {
    /// Блок токенов (`token.accessToken`, `token.refreshToken`).
    #[serde(default)]
    pub token: Option<RawTokens>,
    /// Снимок пользователя, если бэкенд его вернул.
    #[serde(default)]
    pub user: Option<User>,
}

impl LoginPayload {
    /// Собирает payload из уже известных токенов.
    pub fn from_tokens(tokens: TokenPair, user: Option<User>) -> Self {
        Self {
            token: Some(RawTokens {
                access_token: Some(tokens.access_token),
                refresh_token: Some(tokens.refresh_token),
            }),
            user,
        }
    }
}
