use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use sni_client::{
    AiEvaluation, Badge, ClientConfig, Comment, CommentTarget, LevelInfo, NewPost, NewSnippet,
    Notification, OAuthProvider, Page, Post, PostQuery, Problem, ProblemQuery, SniClient,
    SniClientError, Snippet, SnippetQuery, Submission, User, Visibility,
};
use tracing::debug;

mod logging;

#[derive(Debug, Parser)]
#[command(name = "sni-cli", version, about = "CLI клиент для Snippethub")]
struct Cli {
    /// Адрес REST API (по умолчанию `SNI_API_URL` или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Файл сессии (по умолчанию `SNI_SESSION_FILE` или .sni_session.json).
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Подробность логов: `-v` (info), `-vv` (debug), `-vvv` (trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nickname: String,
    },
    /// Вход по email и паролю.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённую сессию.
    Logout,
    /// Профиль текущего пользователя.
    Whoami,
    /// URL для входа через OAuth2-провайдера (kakao, google).
    OauthUrl {
        #[arg(long)]
        provider: String,
    },
    /// Завершает OAuth2-вход по redirect URL из браузера.
    OauthCallback {
        #[arg(long)]
        url: String,
    },
    /// Изменение профиля (требует вход).
    Profile {
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        bio: Option<String>,
        /// Загрузить файл и сделать его аватаром.
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Публичный профиль пользователя.
    User {
        #[arg(long)]
        id: i64,
    },
    /// Уровень и ранг пользователя.
    Level {
        #[arg(long)]
        user: i64,
    },
    /// Рейтинг пользователей.
    Ranking {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Посты доски обсуждений.
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Сниппеты.
    #[command(subcommand)]
    Snippets(SnippetsCommand),
    /// Комментарии к постам и сниппетам.
    #[command(subcommand)]
    Comments(CommentsCommand),
    /// Значки.
    #[command(subcommand)]
    Badges(BadgesCommand),
    /// Задачи и решения.
    #[command(subcommand)]
    Problems(ProblemsCommand),
    /// AI-оценка кода (требует вход).
    Evaluate {
        /// Файл с кодом.
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        language: String,
        /// Задача, в контексте которой оценивается код.
        #[arg(long)]
        problem: Option<i64>,
    },
    /// Уведомления.
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    /// Загрузка файла (требует вход).
    Upload {
        #[arg(long)]
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
struct PageArgs {
    /// Номер страницы (с нуля).
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    size: u32,
}

#[derive(Debug, Subcommand)]
enum PostsCommand {
    /// Список постов.
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Например `createdAt,desc`.
        #[arg(long)]
        sort: Option<String>,
    },
    /// Пост по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Обновление поста.
    ///
    /// Если `--content` не указан, используется текущее содержимое поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Поставить или снять лайк.
    Like {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum SnippetsCommand {
    /// Публичные сниппеты.
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        sort: Option<String>,
    },
    /// Мои сниппеты, включая приватные.
    Mine {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Сниппет по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание сниппета из файла.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        language: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        private: bool,
    },
    /// Удаление сниппета.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Поставить или снять лайк.
    Like {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    #[arg(long)]
    post: Option<i64>,
    #[arg(long)]
    snippet: Option<i64>,
}

impl TargetArgs {
    fn target(&self) -> Result<CommentTarget> {
        match (self.post, self.snippet) {
            (Some(id), None) => Ok(CommentTarget::Post(id)),
            (None, Some(id)) => Ok(CommentTarget::Snippet(id)),
            _ => Err(anyhow!("укажите ровно один из --post или --snippet")),
        }
    }
}

#[derive(Debug, Subcommand)]
enum CommentsCommand {
    /// Комментарии к посту или сниппету.
    List {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Добавить комментарий.
    Add {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        content: String,
        /// Ответ на комментарий.
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Изменить комментарий.
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        content: String,
    },
    /// Удалить комментарий.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum BadgesCommand {
    /// Все значки.
    List,
    /// Значки пользователя.
    User {
        #[arg(long)]
        id: i64,
    },
    /// Выбрать представительский значок.
    Set {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum ProblemsCommand {
    /// Список задач.
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Условие задачи.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Отправить решение из файла.
    Submit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        language: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Вердикт по решению.
    Submission {
        #[arg(long)]
        id: i64,
    },
    /// Мои решения задачи.
    Mine {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum NotificationsCommand {
    /// Список уведомлений.
    List,
    /// Количество непрочитанных.
    Unread,
    /// Отметить прочитанным.
    Read {
        #[arg(long)]
        id: i64,
    },
    /// Отметить все прочитанными.
    ReadAll,
    /// Удалить уведомление.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Получать уведомления в реальном времени до Ctrl+C.
    Watch,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging::init_logging(cli.verbose)?;

    let config = resolve_config(cli.server, cli.session_file)?;
    let client = SniClient::with_file_store(config).map_err(map_client_error)?;

    if needs_session(&cli.command) {
        restore_session(&client).await?;
    }

    match cli.command {
        Command::Signup {
            email,
            password,
            nickname,
        } => {
            client
                .signup(&email, &password, &nickname)
                .await
                .map_err(map_client_error)?;
            println!("Регистрация успешна, выполните `sni-cli login`");
        }
        Command::Login { email, password } => {
            let user = client
                .login(&email, &password)
                .await
                .map_err(map_client_error)?;
            print_user("Вход выполнен", &user);
        }
        Command::Logout => {
            client.logout().await;
            println!("Сессия завершена");
        }
        Command::Whoami => {
            let user = client.me().await.map_err(map_client_error)?;
            print_user("Текущий пользователь", &user);
        }
        Command::OauthUrl { provider } => {
            let provider: OAuthProvider = provider.parse().map_err(map_client_error)?;
            println!("{}", client.oauth_authorize_url(provider));
        }
        Command::OauthCallback { url } => {
            let user = client
                .complete_oauth_login(&url)
                .await
                .map_err(map_client_error)?;
            print_user("Вход выполнен", &user);
        }
        Command::Profile {
            nickname,
            bio,
            avatar,
        } => {
            let image = match avatar {
                Some(path) => Some(
                    client
                        .upload_file(&path)
                        .await
                        .map_err(map_client_error)?
                        .url,
                ),
                None => None,
            };
            let user = client
                .update_profile(&nickname, bio.as_deref(), image.as_deref())
                .await
                .map_err(map_client_error)?;
            print_user("Профиль обновлён", &user);
        }
        Command::User { id } => {
            let user = client.get_user(id).await.map_err(map_client_error)?;
            print_user("Пользователь", &user);
        }
        Command::Level { user } => {
            let level = client.user_level(user).await.map_err(map_client_error)?;
            print_level(&level);
        }
        Command::Ranking { page } => {
            let ranking = client
                .ranking(page.page, page.size)
                .await
                .map_err(map_client_error)?;
            print_page_header("Рейтинг", &ranking);
            for (index, user) in ranking.content.iter().enumerate() {
                let place = u64::from(ranking.number) * u64::from(ranking.size) + index as u64 + 1;
                println!("{place:>4}. {} ({} очков)", display_name(user), user.points);
            }
        }
        Command::Posts(command) => run_posts(&client, command).await?,
        Command::Snippets(command) => run_snippets(&client, command).await?,
        Command::Comments(command) => run_comments(&client, command).await?,
        Command::Badges(command) => run_badges(&client, command).await?,
        Command::Problems(command) => run_problems(&client, command).await?,
        Command::Evaluate {
            file,
            language,
            problem,
        } => {
            let code = read_source(&file)?;
            let evaluation = client
                .evaluate_code(&code, &language, problem)
                .await
                .map_err(map_client_error)?;
            print_evaluation(&evaluation);
        }
        Command::Notifications(command) => run_notifications(&client, command).await?,
        Command::Upload { path } => {
            let file = client.upload_file(&path).await.map_err(map_client_error)?;
            println!("Файл загружен: {}", file.url);
        }
    }

    Ok(())
}

async fn run_posts(client: &SniClient, command: PostsCommand) -> Result<()> {
    match command {
        PostsCommand::List {
            page,
            keyword,
            category,
            sort,
        } => {
            let query = PostQuery {
                keyword,
                category,
                sort,
                ..PostQuery::page(page.page, page.size)
            };
            let posts = client.list_posts(&query).await.map_err(map_client_error)?;
            print_page_header("Постов", &posts);
            for post in &posts.content {
                println!(
                    "- [{}] {} ({}, ♥{}, 💬{})",
                    post.id,
                    post.title,
                    author_name(post.author.as_ref().map(|a| a.nickname.as_str())),
                    post.like_count,
                    post.comment_count
                );
            }
        }
        PostsCommand::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            print_post("Пост", &post);
        }
        PostsCommand::Create {
            title,
            content,
            category,
        } => {
            let post = client
                .create_post(&NewPost {
                    title,
                    content,
                    category,
                })
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post);
        }
        PostsCommand::Update { id, title, content } => {
            // Если пользователь не передал --content, сохраняем текущее содержимое поста.
            let current = client.get_post(id).await.map_err(map_client_error)?;
            let content = content.unwrap_or(current.content);
            let post = client
                .update_post(
                    id,
                    &NewPost {
                        title,
                        content,
                        category: current.category,
                    },
                )
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        PostsCommand::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        PostsCommand::Like { id } => {
            let post = client.toggle_post_like(id).await.map_err(map_client_error)?;
            println!(
                "{} id={id}, лайков: {}",
                if post.liked { "Лайк поставлен" } else { "Лайк снят" },
                post.like_count
            );
        }
    }
    Ok(())
}

async fn run_snippets(client: &SniClient, command: SnippetsCommand) -> Result<()> {
    match command {
        SnippetsCommand::List {
            page,
            keyword,
            language,
            sort,
        } => {
            let query = SnippetQuery {
                keyword,
                language,
                sort,
                ..SnippetQuery::page(page.page, page.size)
            };
            let snippets = client
                .list_snippets(&query)
                .await
                .map_err(map_client_error)?;
            print_snippet_list(&snippets);
        }
        SnippetsCommand::Mine { page } => {
            let snippets = client
                .my_snippets(page.page, page.size)
                .await
                .map_err(map_client_error)?;
            print_snippet_list(&snippets);
        }
        SnippetsCommand::Get { id } => {
            let snippet = client.get_snippet(id).await.map_err(map_client_error)?;
            print_snippet("Сниппет", &snippet);
        }
        SnippetsCommand::Create {
            title,
            file,
            language,
            description,
            tags,
            private,
        } => {
            let code = read_source(&file)?;
            let snippet = client
                .create_snippet(&NewSnippet {
                    title,
                    description,
                    code,
                    language,
                    tags,
                    visibility: if private {
                        Visibility::Private
                    } else {
                        Visibility::Public
                    },
                })
                .await
                .map_err(map_client_error)?;
            print_snippet("Сниппет создан", &snippet);
        }
        SnippetsCommand::Delete { id } => {
            client.delete_snippet(id).await.map_err(map_client_error)?;
            println!("Сниппет удалён: id={id}");
        }
        SnippetsCommand::Like { id } => {
            let snippet = client
                .toggle_snippet_like(id)
                .await
                .map_err(map_client_error)?;
            println!(
                "{} id={id}, лайков: {}",
                if snippet.liked { "Лайк поставлен" } else { "Лайк снят" },
                snippet.like_count
            );
        }
    }
    Ok(())
}

async fn run_comments(client: &SniClient, command: CommentsCommand) -> Result<()> {
    match command {
        CommentsCommand::List { target } => {
            let comments = client
                .list_comments(target.target()?)
                .await
                .map_err(map_client_error)?;
            println!("Комментариев: {}", comments.len());
            for comment in &comments {
                print_comment(comment);
            }
        }
        CommentsCommand::Add {
            target,
            content,
            parent,
        } => {
            let comment = client
                .create_comment(target.target()?, &content, parent)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий добавлен: id={}", comment.id);
        }
        CommentsCommand::Edit { id, content } => {
            let comment = client
                .update_comment(id, &content)
                .await
                .map_err(map_client_error)?;
            print_comment(&comment);
        }
        CommentsCommand::Delete { id } => {
            client.delete_comment(id).await.map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
    }
    Ok(())
}

async fn run_badges(client: &SniClient, command: BadgesCommand) -> Result<()> {
    match command {
        BadgesCommand::List => {
            let badges = client.list_badges().await.map_err(map_client_error)?;
            print_badges(&badges);
        }
        BadgesCommand::User { id } => {
            let badges = client.user_badges(id).await.map_err(map_client_error)?;
            print_badges(&badges);
        }
        BadgesCommand::Set { id } => {
            let user = client
                .set_representative_badge(id)
                .await
                .map_err(map_client_error)?;
            print_user("Представительский значок обновлён", &user);
        }
    }
    Ok(())
}

async fn run_problems(client: &SniClient, command: ProblemsCommand) -> Result<()> {
    match command {
        ProblemsCommand::List {
            page,
            difficulty,
            keyword,
        } => {
            let query = ProblemQuery {
                difficulty,
                keyword,
                ..ProblemQuery::page(page.page, page.size)
            };
            let problems = client.list_problems(&query).await.map_err(map_client_error)?;
            print_page_header("Задач", &problems);
            for problem in &problems.content {
                println!(
                    "- [{}] {} ({}, принято {}/{})",
                    problem.id,
                    problem.title,
                    problem.difficulty.as_deref().unwrap_or("?"),
                    problem.accepted_count,
                    problem.submission_count
                );
            }
        }
        ProblemsCommand::Get { id } => {
            let problem = client.get_problem(id).await.map_err(map_client_error)?;
            print_problem(&problem);
        }
        ProblemsCommand::Submit { id, language, file } => {
            let code = read_source(&file)?;
            let submission = client
                .submit_solution(id, &language, &code)
                .await
                .map_err(map_client_error)?;
            print_submission(&submission);
        }
        ProblemsCommand::Submission { id } => {
            let submission = client.get_submission(id).await.map_err(map_client_error)?;
            print_submission(&submission);
        }
        ProblemsCommand::Mine { id } => {
            let submissions = client.my_submissions(id).await.map_err(map_client_error)?;
            for submission in &submissions {
                print_submission(submission);
            }
        }
    }
    Ok(())
}

async fn run_notifications(client: &SniClient, command: NotificationsCommand) -> Result<()> {
    match command {
        NotificationsCommand::List => {
            let notifications = client
                .list_notifications()
                .await
                .map_err(map_client_error)?;
            for notification in &notifications {
                print_notification(notification);
            }
        }
        NotificationsCommand::Unread => {
            let count = client.unread_count().await.map_err(map_client_error)?;
            println!("Непрочитанных: {count}");
        }
        NotificationsCommand::Read { id } => {
            client
                .mark_notification_read(id)
                .await
                .map_err(map_client_error)?;
            println!("Уведомление прочитано: id={id}");
        }
        NotificationsCommand::ReadAll => {
            client
                .mark_all_notifications_read()
                .await
                .map_err(map_client_error)?;
            println!("Все уведомления прочитаны");
        }
        NotificationsCommand::Delete { id } => {
            client
                .delete_notification(id)
                .await
                .map_err(map_client_error)?;
            println!("Уведомление удалено: id={id}");
        }
        NotificationsCommand::Watch => {
            let user = client
                .session()
                .current_user()
                .ok_or_else(|| map_client_error(SniClientError::Unauthorized))?;
            let notifications = client.notifications();
            notifications
                .connect(&user.email, |notification| print_notification(&notification))
                .map_err(map_client_error)?;
            println!("Ожидание уведомлений для {}, Ctrl+C для выхода", user.email);

            tokio::signal::ctrl_c()
                .await
                .context("не удалось дождаться Ctrl+C")?;
            notifications.disconnect().await;
        }
    }
    Ok(())
}

fn resolve_config(server: Option<String>, session_file: Option<PathBuf>) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("некорректные переменные окружения SNI_*")?;
    if let Some(server) = server {
        config = config.with_server(server);
    }
    if let Some(path) = session_file {
        config.session_file = path;
    }
    Ok(config)
}

fn needs_session(command: &Command) -> bool {
    !matches!(
        command,
        Command::Signup { .. }
            | Command::Login { .. }
            | Command::OauthUrl { .. }
            | Command::OauthCallback { .. }
    )
}

async fn restore_session(client: &SniClient) -> Result<()> {
    match client.restore_session().await {
        Ok(Some(user)) => debug!(user_id = user.id, "session restored"),
        Ok(None) => debug!("no stored session"),
        // просроченная сессия уже очищена; команда продолжит работу анонимно
        Err(SniClientError::Unauthorized) => {
            eprintln!("Сессия истекла, выполните `sni-cli login`");
        }
        Err(err) => return Err(map_client_error(err)),
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("не удалось прочитать {}", path.display()))?;
    if code.trim().is_empty() {
        return Err(anyhow!("файл {} пуст", path.display()));
    }
    Ok(code)
}

fn map_client_error(err: SniClientError) -> anyhow::Error {
    let message = match err {
        SniClientError::Unauthorized => {
            "требуется авторизация: выполните `sni-cli login ...`".to_string()
        }
        SniClientError::Forbidden(message) => format!("доступ запрещён: {message}"),
        SniClientError::NotFound => "ресурс не найден".to_string(),
        SniClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        SniClientError::Api { status, message } => format!("ошибка API ({status}): {message}"),
        SniClientError::Http(err) => format!("ошибка HTTP: {err}"),
        SniClientError::Decode(err) => format!("не удалось разобрать ответ: {err}"),
        SniClientError::Storage(err) => format!("ошибка файла сессии: {err}"),
        SniClientError::WebSocket(err) => format!("ошибка websocket: {err}"),
        SniClientError::Stomp(err) => format!("ошибка STOMP: {err}"),
    };
    anyhow!(message)
}

fn author_name(nickname: Option<&str>) -> &str {
    nickname.unwrap_or("аноним")
}

fn display_name(user: &User) -> String {
    match &user.representative_badge {
        Some(badge) => format!("{} [{}]", user.nickname, badge.name),
        None => user.nickname.clone(),
    }
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("  id: {}", user.id);
    println!("  nickname: {}", display_name(user));
    println!("  email: {}", user.email);
    println!("  points: {}", user.points);
    if let Some(level) = user.level {
        println!("  level: {level}");
    }
    if let Some(rank) = user.rank {
        println!("  rank: {rank:?}");
    }
    if let Some(bio) = &user.bio {
        println!("  bio: {bio}");
    }
}

fn print_level(level: &LevelInfo) {
    println!("Уровень {} ({:?}), очков: {}", level.level, level.rank, level.points);
    match level.next_level_points {
        Some(next) => println!("До следующего уровня: {}", (next - level.points).max(0)),
        None => println!("Максимальный уровень"),
    }
}

fn print_page_header<T>(title: &str, page: &Page<T>) {
    println!(
        "{title}: {} (страница {}/{}, всего {})",
        page.content.len(),
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    if let Some(category) = &post.category {
        println!("category: {category}");
    }
    println!(
        "author: {}",
        author_name(post.author.as_ref().map(|a| a.nickname.as_str()))
    );
    println!(
        "views: {}, likes: {}, comments: {}",
        post.view_count, post.like_count, post.comment_count
    );
    if let Some(created_at) = post.created_at {
        println!("created_at: {created_at}");
    }
    println!();
    println!("{}", post.content);
}

fn print_snippet_list(page: &Page<Snippet>) {
    print_page_header("Сниппетов", page);
    for snippet in &page.content {
        println!(
            "- [{}] {} ({}, ♥{}){}",
            snippet.id,
            snippet.title,
            snippet.language,
            snippet.like_count,
            if snippet.tags.is_empty() {
                String::new()
            } else {
                format!(" #{}", snippet.tags.join(" #"))
            }
        );
    }
}

fn print_snippet(title: &str, snippet: &Snippet) {
    println!("{title}");
    println!("id: {}", snippet.id);
    println!("title: {}", snippet.title);
    println!("language: {}", snippet.language);
    println!("visibility: {:?}", snippet.visibility);
    if !snippet.tags.is_empty() {
        println!("tags: {}", snippet.tags.join(", "));
    }
    if let Some(description) = &snippet.description {
        println!("description: {description}");
    }
    println!();
    println!("{}", snippet.code);
}

fn print_comment(comment: &Comment) {
    let indent = if comment.parent_id.is_some() { "    " } else { "" };
    println!(
        "{indent}[{}] {}: {}",
        comment.id,
        author_name(comment.author.as_ref().map(|a| a.nickname.as_str())),
        comment.content
    );
}

fn print_badges(badges: &[Badge]) {
    println!("Значков: {}", badges.len());
    for badge in badges {
        match &badge.description {
            Some(description) => println!("- [{}] {}: {description}", badge.id, badge.name),
            None => println!("- [{}] {}", badge.id, badge.name),
        }
    }
}

fn print_problem(problem: &Problem) {
    println!("[{}] {}", problem.id, problem.title);
    if let Some(difficulty) = &problem.difficulty {
        println!("difficulty: {difficulty}");
    }
    if let (Some(time), Some(memory)) = (problem.time_limit, problem.memory_limit) {
        println!("limits: {time} ms, {memory} MB");
    }
    if let Some(description) = &problem.description {
        println!();
        println!("{description}");
    }
    if let Some(input) = &problem.sample_input {
        println!();
        println!("sample input:\n{input}");
    }
    if let Some(output) = &problem.sample_output {
        println!("sample output:\n{output}");
    }
}

fn print_submission(submission: &Submission) {
    println!(
        "[{}] problem={} {} {:?}{}{}",
        submission.id,
        submission.problem_id,
        submission.language,
        submission.status,
        submission
            .runtime
            .map(|ms| format!(", {ms} ms"))
            .unwrap_or_default(),
        submission
            .memory
            .map(|kb| format!(", {kb} KB"))
            .unwrap_or_default()
    );
}

fn print_evaluation(evaluation: &AiEvaluation) {
    println!("Оценка: {}/100", evaluation.score);
    if !evaluation.summary.is_empty() {
        println!("{}", evaluation.summary);
    }
    for strength in &evaluation.strengths {
        println!("  + {strength}");
    }
    for improvement in &evaluation.improvements {
        println!("  - {improvement}");
    }
    if let Some(code) = &evaluation.refactored_code {
        println!();
        println!("{code}");
    }
}

fn print_notification(notification: &Notification) {
    let marker = if notification.read { " " } else { "*" };
    let id = notification
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{marker} [{id}] {}{}",
        notification
            .kind
            .as_deref()
            .map(|kind| format!("{kind}: "))
            .unwrap_or_default(),
        notification.message
    );
}
