use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use ado_prs::azure::{AzureClient, ClientOptions, FetchError, PullRequest};
use ado_prs::clipboard::{copy_pull_request_url, SystemClipboard};
use ado_prs::config::{Config, Connection, SearchType};
use ado_prs::credentials::CredentialError;
use ado_prs::fetch::{load_pull_requests, PullRequestSource};
use ado_prs::output;
use ado_prs::pipeline::{self, ProjectionContext, StatusFilter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_INVALID_TITLE: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug, Clone, Default)]
struct ListArgs {
    /// Status to show (active, completed, abandoned, ALL); defaults to the config
    #[arg(short, long)]
    status: Option<String>,

    /// Tab-separated output for scripting
    #[arg(long)]
    tsv: bool,
}

#[derive(Args, Debug, Clone)]
struct SelectArgs {
    /// Index number of the PR (1-based, as shown in the list)
    index: usize,

    /// Pick from this repository's list (name or id) instead of every repository
    #[arg(long, conflicts_with = "mine")]
    repo: Option<String>,

    /// Pick from the PRs you are reviewing
    #[arg(long)]
    mine: bool,

    /// Status filter used to build the list
    #[arg(short, long)]
    status: Option<String>,
}

impl SelectArgs {
    fn source(&self) -> PullRequestSource {
        if self.mine {
            PullRequestSource::Reviewing
        } else if let Some(repo) = &self.repo {
            PullRequestSource::Repository(repo.clone())
        } else {
            PullRequestSource::AllRepositories
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List projects of the organization
    Projects,
    /// List repositories of the project
    Repos {
        /// Only show repositories whose name contains this text
        #[arg(short = 'q', long)]
        search: Option<String>,
    },
    /// List pull requests of one repository, or of every repository
    Prs {
        /// Repository name or id (all repositories when omitted)
        repo: Option<String>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// List pull requests where you are a reviewer
    Mine {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one pull request in detail
    Show(SelectArgs),
    /// Open a pull request in the browser
    Open(SelectArgs),
    /// Copy a pull request's web URL to the clipboard
    Copy(SelectArgs),
    /// Show the profile the token belongs to
    Whoami,
    /// Verify the token can read the project's repositories
    Check,
    /// Check a title against the [HISTORIA|TASK:CODE] description format
    CheckTitle {
        title: String,
    },
    /// Create the config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "ado-prs")]
#[command(about = "Browse Azure DevOps pull requests with SLA and title checks", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/ado-prs/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Organization, overriding the config file
    #[arg(long, global = true)]
    org: Option<String>,

    /// Project, overriding the config file
    #[arg(short, long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Everything a network command needs.
struct Session {
    client: AzureClient,
    connection: Connection,
    config: Config,
    use_colors: bool,
}

impl Session {
    fn project(&self) -> Result<&str> {
        self.connection.require_project()
    }

    fn projection_context(&self) -> Result<ProjectionContext<'_>> {
        Ok(ProjectionContext {
            organization: &self.connection.organization,
            project: self.project()?,
            excluded_reviewers: &self.config.excluded_reviewers,
            locale: self.config.locale,
            now: Utc::now(),
        })
    }

    fn status_filter(&self, status: Option<&str>) -> StatusFilter {
        match status {
            Some(s) => s.parse().unwrap_or_default(),
            None => self.config.status_filter(),
        }
    }

    /// Fetch, filter by status and sort. Also returns the statuses present
    /// before filtering.
    async fn pull_requests(
        &self,
        source: &PullRequestSource,
        filter: &StatusFilter,
    ) -> Result<(Vec<PullRequest>, Vec<String>)> {
        let start = Instant::now();
        let raw = load_pull_requests(&self.client, self.project()?, source).await?;
        let statuses = pipeline::available_statuses(&raw);
        if !pipeline::filter_matches_any(filter, &statuses) {
            tracing::warn!(
                "no pull request has status '{}'; statuses present: {}",
                filter,
                statuses.join(", ")
            );
        }
        let prs = pipeline::prepare_list(raw, filter);
        tracing::debug!(count = prs.len(), elapsed = ?start.elapsed(), filter = %filter, "pull requests ready");
        Ok((prs, statuses))
    }
}

/// Map an error to an exit code by the first typed cause found in its chain.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(fetch) = cause.downcast_ref::<FetchError>() {
            return if fetch.is_auth() || matches!(fetch, FetchError::IdentityUnresolved(_)) {
                EXIT_AUTH
            } else {
                EXIT_NETWORK
            };
        }
        if cause.downcast_ref::<CredentialError>().is_some() {
            return EXIT_AUTH;
        }
    }
    EXIT_CONFIG
}

#[tokio::main]
async fn main() {
    // rustls 0.23+ needs a process-wide crypto provider; a second install is harmless.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    ado_prs::logging::init(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    // Commands that need neither config nor network
    match &cli.command {
        Some(Commands::CheckTitle { title }) => {
            match pipeline::validate_title(title) {
                Ok(()) => {
                    println!("ok");
                    std::process::exit(EXIT_SUCCESS);
                }
                Err(e) => {
                    println!("{}", e);
                    std::process::exit(EXIT_INVALID_TITLE);
                }
            }
        }
        Some(Commands::Init) => {
            if let Err(e) = ado_prs::config::init::run_init_wizard(config_path) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let mut config = match ado_prs::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Command-line values take part in validation too
    config.apply_overrides(cli.org.as_deref(), cli.project.as_deref());

    if let Err(errors) = ado_prs::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let connection = match config.connection() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let token = match ado_prs::credentials::resolve_token(&connection.organization) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Credential error: {}", e);
            std::process::exit(EXIT_AUTH);
        }
    };

    let timeout = match config.timeout_duration() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let options = ClientOptions {
        timeout,
        retries: config.retries,
        ..ClientOptions::default()
    };

    let client = match ado_prs::azure::create_client(&connection.organization, &token, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create Azure DevOps client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let command = cli.command.unwrap_or(match config.search_type {
        SearchType::Projects => Commands::Projects,
        SearchType::Repositories => Commands::Repos { search: None },
        SearchType::MyPullRequests => Commands::Mine { list: ListArgs::default() },
    });

    let session = Session {
        client,
        connection,
        config,
        use_colors: output::should_use_colors(),
    };

    if let Err(e) = run(&session, command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

async fn run(session: &Session, command: Commands) -> Result<()> {
    let locale = session.config.locale;

    match command {
        Commands::Projects => {
            let mut projects = session.client.fetch_projects().await?;
            pipeline::sort_projects(&mut projects);
            println!("{}", output::format_project_list(&projects, session.use_colors));
        }
        Commands::Repos { search } => {
            let mut repos = session.client.fetch_repositories(session.project()?).await?;
            pipeline::sort_repositories(&mut repos);
            let matching = pipeline::filter_repositories(&repos, search.as_deref().unwrap_or(""));
            println!("{}", output::format_repository_list(&matching, session.use_colors));
        }
        Commands::Prs { repo, list } => {
            let source = match repo {
                Some(repo) => PullRequestSource::Repository(repo),
                None => PullRequestSource::AllRepositories,
            };
            print_pull_requests(session, &source, &list).await?;
        }
        Commands::Mine { list } => {
            print_pull_requests(session, &PullRequestSource::Reviewing, &list).await?;
        }
        Commands::Show(args) => {
            let pr = select_pull_request(session, &args).await?;
            let ctx = session.projection_context()?;
            let row = pipeline::project(&pr, &ctx);
            println!("{}", output::format_pr_detail(&row, locale, session.use_colors));
        }
        Commands::Open(args) => {
            let pr = select_pull_request(session, &args).await?;
            let url = pipeline::web_url_for(&pr, &session.connection.organization, session.project()?);
            ado_prs::browser::open_url(&url)?;
            println!("Opening {} in browser: {}", pr.short_ref(), url);
        }
        Commands::Copy(args) => {
            let pr = select_pull_request(session, &args).await?;
            let mut clipboard = SystemClipboard::new()?;
            let url = copy_pull_request_url(
                &mut clipboard,
                &pr,
                &session.connection.organization,
                session.project()?,
            )?;
            println!("Copied {} URL to clipboard: {}", pr.short_ref(), url);
        }
        Commands::Check => {
            let project = session.project()?;
            session.client.check_connection(project).await?;
            println!(
                "Connected to {}/{}",
                session.connection.organization, project
            );
        }
        Commands::Whoami => {
            let profile = session.client.fetch_current_user().await?;
            println!("{}", output::format_profile(&profile, &session.connection.organization));
        }
        Commands::CheckTitle { .. } | Commands::Init => {
            anyhow::bail!("this command runs without a connection")
        }
    }

    Ok(())
}

async fn print_pull_requests(
    session: &Session,
    source: &PullRequestSource,
    list: &ListArgs,
) -> Result<()> {
    let locale = session.config.locale;
    let filter = session.status_filter(list.status.as_deref());
    let (prs, statuses) = session.pull_requests(source, &filter).await?;

    let ctx = session.projection_context()?;
    let rows = pipeline::project_all(&prs, &ctx);

    if list.tsv {
        let tsv = output::format_tsv(&rows, locale);
        if !tsv.is_empty() {
            println!("{}", tsv);
        }
    } else {
        println!("{}", output::format_pr_table(&rows, locale, session.use_colors));
        println!();
        println!("{}", output::format_statuses(&statuses, &filter, session.use_colors));
    }
    Ok(())
}

/// Rebuild the list the user saw and pick the PR at a 1-based index.
async fn select_pull_request(session: &Session, args: &SelectArgs) -> Result<PullRequest> {
    let filter = session.status_filter(args.status.as_deref());
    let (mut prs, _) = session.pull_requests(&args.source(), &filter).await?;

    if args.index < 1 || args.index > prs.len() {
        anyhow::bail!(
            "Invalid index {}. Must be between 1 and {}.",
            args.index,
            prs.len()
        );
    }
    Ok(prs.swap_remove(args.index - 1))
}
