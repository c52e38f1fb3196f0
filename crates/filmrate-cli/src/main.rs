//! filmrate - browse films and submit ratings from the command line.

/// Application configuration (TOML).
mod config;
/// Tabular output.
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
use filmrate_api::cache::DEFAULT_CLEANUP_INTERVAL;
use filmrate_api::film::{
    FetchOptions, FilmBrowser, FilmClient, FilmDetail, FilmsParams, LocalFilmApi, MAX_SCORE,
    MIN_SCORE, ReviewDraft, ReviewPatch, UserSession, refresh_film_rating, submit_review,
    unique_genres,
};

/// Environment variable overriding `api.base_url`.
const API_URL_ENV: &str = "FILMRATE_API_URL";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse films.
    Films(FilmsCommand),
    /// Manage reviews.
    Reviews(ReviewsCommand),
    /// Rate a film (logs in and submits a review).
    Rate(RateArgs),
    /// Look up users.
    Users(UsersCommand),
    /// Check a username and password.
    Login(CredentialArgs),
    /// Show or create the config file.
    Config(ConfigCommand),
}

/// Arguments for the `films` subcommand.
#[derive(clap::Args)]
struct FilmsCommand {
    /// Films subcommand to run.
    #[command(subcommand)]
    command: FilmsSubcommands,
}

/// Available films subcommands.
#[derive(Subcommand)]
enum FilmsSubcommands {
    /// List films page by page.
    List(FilmsListArgs),
    /// Show a film with its reviews.
    Show(IdArgs),
    /// List every genre in the catalog.
    Genres,
}

/// Arguments for the `films list` subcommand.
#[derive(clap::Args)]
struct FilmsListArgs {
    /// Search text (title, description, genre).
    #[arg(long)]
    search: Option<String>,
    /// Genre filter (e.g. "Action").
    #[arg(long)]
    genre: Option<String>,
    /// Page number (default: 1).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page: Option<u32>,
    /// Films per page (default: `display.page_size` from config).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,
}

/// Arguments carrying a single record ID.
#[derive(clap::Args)]
struct IdArgs {
    /// Record ID.
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `reviews` subcommand.
#[derive(clap::Args)]
struct ReviewsCommand {
    /// Reviews subcommand to run.
    #[command(subcommand)]
    command: ReviewsSubcommands,
}

/// Available reviews subcommands.
#[derive(Subcommand)]
enum ReviewsSubcommands {
    /// List reviews, optionally of one film.
    List(ReviewsListArgs),
    /// Edit a review and recompute its film's rating.
    Edit(ReviewsEditArgs),
    /// Delete a review.
    Delete(ReviewsDeleteArgs),
}

/// Arguments for the `reviews list` subcommand.
#[derive(clap::Args)]
struct ReviewsListArgs {
    /// Only reviews of this film.
    #[arg(long)]
    film_id: Option<String>,
}

/// Arguments for the `reviews edit` subcommand.
#[derive(clap::Args)]
struct ReviewsEditArgs {
    /// Review ID.
    #[arg(long, required = true)]
    id: String,
    /// New score (1-5).
    #[arg(long, value_parser = clap::value_parser!(u8).range(i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)))]
    score: Option<u8>,
    /// New comment.
    #[arg(long)]
    comment: Option<String>,
}

/// Arguments for the `reviews delete` subcommand.
#[derive(clap::Args)]
struct ReviewsDeleteArgs {
    /// Review ID.
    #[arg(long, required = true)]
    id: String,
    /// Film of the review; its rating is recomputed when given.
    #[arg(long)]
    film_id: Option<String>,
}

/// Username and password.
#[derive(clap::Args)]
struct CredentialArgs {
    /// Username.
    #[arg(long, env = "FILMRATE_USERNAME")]
    username: String,
    /// Password.
    #[arg(long, env = "FILMRATE_PASSWORD", hide_env_values = true)]
    password: String,
}

/// Arguments for the `rate` subcommand.
#[derive(clap::Args)]
struct RateArgs {
    /// Film to rate.
    #[arg(long, required = true)]
    film_id: String,
    /// Score (1-5).
    #[arg(long, required = true, value_parser = clap::value_parser!(u8).range(i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)))]
    score: u8,
    /// Comment (required, must not be blank).
    #[arg(long, required = true)]
    comment: String,
    /// Credentials of the reviewer.
    #[command(flatten)]
    credentials: CredentialArgs,
}

/// Arguments for the `users` subcommand.
#[derive(clap::Args)]
struct UsersCommand {
    /// Users subcommand to run.
    #[command(subcommand)]
    command: UsersSubcommands,
}

/// Available users subcommands.
#[derive(Subcommand)]
enum UsersSubcommands {
    /// Show a user.
    Show(IdArgs),
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the effective configuration.
    Show,
    /// Write a default config file.
    Init,
}

/// Loads the config file and applies the `FILMRATE_API_URL` override.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path =
        resolve_config_path(dir.map(PathBuf::as_path)).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok(config.with_base_url_override(std::env::var(API_URL_ENV).ok()))
}

/// Builds the API client from config and starts its cache cleanup task.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
fn build_client(config: &AppConfig) -> Result<FilmClient> {
    let base_url: Url = config
        .api
        .base_url
        .parse()
        .with_context(|| format!("invalid api.base_url: {}", config.api.base_url))?;

    let client = FilmClient::builder()
        .base_url(base_url)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(config.api.timeout())
        .retry_attempts(config.api.retry_attempts)
        .cache_ttl(config.api.cache_ttl())
        .build()
        .context("failed to build API client")?;

    // Dropping the handle detaches the task; it ends with the client.
    drop(client.spawn_cache_cleanup(DEFAULT_CLEANUP_INTERVAL));

    tracing::debug!(base_url = %client.base_url(), "API client ready");
    Ok(client)
}

/// Runs the `films list` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the film list cannot be loaded.
#[instrument(skip_all)]
async fn run_films_list(args: &FilmsListArgs, config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    let mut browser = FilmBrowser::with_page_size(&client, config.display.page_size);

    browser
        .fetch(FetchOptions {
            search: args.search.clone(),
            sort: args.genre.clone(),
            page: args.page,
            page_size: args.page_size,
        })
        .await;

    if let Some(err) = browser.error() {
        bail!("failed to list films: {err}");
    }
    output::print_films_page(browser.films(), browser.pagination());

    Ok(())
}

/// Runs the `films show` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the film does not load.
#[instrument(skip_all)]
async fn run_films_show(args: &IdArgs, config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    let detail = FilmDetail::load(&client, &args.id).await;
    if detail.film.is_none() {
        bail!("film {} could not be loaded", args.id);
    }
    output::print_detail(&detail);
    Ok(())
}

/// Runs the `films genres` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the films cannot be fetched.
#[instrument(skip_all)]
async fn run_films_genres(config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    let page = client
        .get_films(&FilmsParams::new())
        .await
        .context("failed to fetch films")?;
    output::print_genres(&unique_genres(&page.data));
    Ok(())
}

/// Runs the `reviews list` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the reviews cannot be fetched.
#[instrument(skip_all)]
async fn run_reviews_list(args: &ReviewsListArgs, config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    let reviews = client
        .get_reviews(args.film_id.as_deref())
        .await
        .context("failed to fetch reviews")?;
    output::print_reviews(&reviews);
    Ok(())
}

/// Runs the `reviews edit` subcommand.
///
/// # Errors
///
/// Returns an error if nothing is changed, the comment is blank, or an API
/// request fails.
#[instrument(skip_all)]
async fn run_reviews_edit(args: &ReviewsEditArgs, config: &AppConfig) -> Result<()> {
    if args.score.is_none() && args.comment.is_none() {
        bail!("nothing to change: pass --score and/or --comment");
    }
    let comment = match args.comment.as_deref().map(str::trim) {
        Some("") => bail!("please enter a comment"),
        Some(comment) => Some(String::from(comment)),
        None => None,
    };

    let client = build_client(config)?;
    let patch = ReviewPatch {
        score: args.score,
        comment,
        ..ReviewPatch::default()
    };
    let review = client
        .update_review(&args.id, &patch)
        .await
        .context("failed to update review")?;
    tracing::info!("Updated review {}", review.id);

    let (summary, _film) = refresh_film_rating(&client, &review.film_id)
        .await
        .context("failed to update film rating")?;
    output::print_rating_summary(&review.film_id, &summary);

    Ok(())
}

/// Runs the `reviews delete` subcommand.
///
/// # Errors
///
/// Returns an error if an API request fails.
#[instrument(skip_all)]
async fn run_reviews_delete(args: &ReviewsDeleteArgs, config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    client
        .delete_review(&args.id)
        .await
        .context("failed to delete review")?;
    tracing::info!("Deleted review {}", args.id);

    if let Some(film_id) = args.film_id.as_deref() {
        let (summary, _film) = refresh_film_rating(&client, film_id)
            .await
            .context("failed to update film rating")?;
        output::print_rating_summary(film_id, &summary);
    }

    Ok(())
}

/// Runs the `rate` subcommand.
///
/// # Errors
///
/// Returns an error if login fails, the review is invalid, or an API request fails.
#[instrument(skip_all)]
async fn run_rate(args: &RateArgs, config: &AppConfig) -> Result<()> {
    let draft = ReviewDraft {
        film_id: args.film_id.clone(),
        score: args.score,
        comment: args.comment.clone(),
    };
    draft.validate()?;

    let client = build_client(config)?;
    let user = client
        .login(&args.credentials.username, &args.credentials.password)
        .await?;
    let session = UserSession::from(user);

    let submitted = submit_review(&client, &session.id, &draft).await?;
    tracing::info!(
        "Review {} saved for \"{}\" by {}",
        submitted.review.id,
        submitted.film.title,
        session.username
    );
    output::print_rating_summary(&submitted.film.id, &submitted.summary);

    Ok(())
}

/// Runs the `users show` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the user cannot be fetched.
#[instrument(skip_all)]
async fn run_users_show(args: &IdArgs, config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    let user = client
        .get_user(&args.id)
        .await
        .context("failed to fetch user")?;
    tracing::info!("ID\tUsername\tEmail");
    tracing::info!("{}\t{}\t{}", user.id, user.username, user.email);
    Ok(())
}

/// Runs the `login` subcommand. Nothing is persisted.
///
/// # Errors
///
/// Returns an error if the credentials do not match or the request fails.
#[instrument(skip_all)]
async fn run_login(args: &CredentialArgs, config: &AppConfig) -> Result<()> {
    let client = build_client(config)?;
    let user = client.login(&args.username, &args.password).await?;
    output::print_session(&UserSession::from(user));
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be serialized.
fn run_config_show(config: &AppConfig) -> Result<()> {
    for line in config.to_toml()?.lines() {
        tracing::info!("{}", line);
    }
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
fn run_config_init(dir: Option<&PathBuf>) -> Result<()> {
    let config_path =
        resolve_config_path(dir.map(PathBuf::as_path)).context("failed to resolve config path")?;
    if config_path.exists() {
        bail!("config file already exists: {}", config_path.display());
    }
    AppConfig::default()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote default config to {}", config_path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    if let Commands::Config(cmd) = &cli.command
        && matches!(cmd.command, ConfigSubcommands::Init)
    {
        return run_config_init(dir);
    }

    let config = load_config(dir)?;
    match cli.command {
        Commands::Films(cmd) => match cmd.command {
            FilmsSubcommands::List(args) => run_films_list(&args, &config).await,
            FilmsSubcommands::Show(args) => run_films_show(&args, &config).await,
            FilmsSubcommands::Genres => run_films_genres(&config).await,
        },
        Commands::Reviews(cmd) => match cmd.command {
            ReviewsSubcommands::List(args) => run_reviews_list(&args, &config).await,
            ReviewsSubcommands::Edit(args) => run_reviews_edit(&args, &config).await,
            ReviewsSubcommands::Delete(args) => run_reviews_delete(&args, &config).await,
        },
        Commands::Rate(args) => run_rate(&args, &config).await,
        Commands::Users(cmd) => match cmd.command {
            UsersSubcommands::Show(args) => run_users_show(&args, &config).await,
        },
        Commands::Login(args) => run_login(&args, &config).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Show => run_config_show(&config),
            ConfigSubcommands::Init => run_config_init(dir),
        },
    }
}
