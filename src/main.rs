use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use markup5ever_rcdom::RcDom;

use i18n_harvest::config::HarvestConfig;
use i18n_harvest::control::{render_summary, ControlMessage};
use i18n_harvest::env::{core::NoColor, EnvVar};
use i18n_harvest::error::{HarvestError, HarvestResult};
use i18n_harvest::harvest::{DocumentSource, Extractor, Poller};
use i18n_harvest::page::PageSession;
use i18n_harvest::parsers::html::get_charset;
use i18n_harvest::remote::{
    ChainedTokens, SessionFileToken, StaticToken, TokenSource, TranslationClient,
};
use i18n_harvest::store::DomainStore;
use i18n_harvest::utils::PageLocation;

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Harvest data-i18n annotations from web pages and edit their translations
#[derive(Parser, Debug)]
#[command(name = "i18n-harvest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file [default: first of the search paths that exists]
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record database
    #[arg(short, long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Translation API origin [default: https://<page hostname>]
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    /// JSON file holding the page's session token data
    #[arg(long, global = true, value_name = "FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Page to open: a file path or a URL
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Page URL to record local files under
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a page's annotations once and record them
    Scan {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Re-extract whenever the page changes
    Watch {
        #[command(flatten)]
        page: PageArgs,

        /// Stop after this many polls
        #[arg(long, value_name = "N")]
        polls: Option<u64>,
    },
    /// List a domain's recorded keys
    Show { domain: String },
    /// Print a domain's record as one JSON object
    Export { domain: String },
    /// Clear a domain's record
    Reset { domain: String },
    /// List every domain with a record
    Domains,
    /// List the languages the translation API offers for a page
    Languages {
        #[arg(value_name = "PAGE_URL")]
        page: String,
    },
    /// Print one key's translation
    Get {
        #[arg(value_name = "PAGE_URL")]
        page: String,
        language: String,
        key: String,
    },
    /// Set one key's translation
    Set {
        #[arg(value_name = "PAGE_URL")]
        page: String,
        language: String,
        key: String,
        value: String,
    },
    /// Render a page in interactive mode
    Highlight {
        #[command(flatten)]
        page: PageArgs,

        /// Write the page here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Send control messages to a page and print the replies
    Message {
        #[command(flatten)]
        page: PageArgs,

        /// JSON messages such as {"action":"getEditStatus"}
        #[arg(value_name = "JSON")]
        messages: Vec<String>,

        /// Keyboard commands to run after the messages
        #[arg(long = "command", value_name = "NAME")]
        commands: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error_message(&format!("Error: {}", e));
        process::exit(1);
    }
}

async fn run(cli: Cli) -> HarvestResult<()> {
    let mut config = HarvestConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(api_base) = cli.api_base {
        config.api_base = Some(api_base);
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = Some(session_file);
    }
    config.validate()?;
    init_logging(&config);

    let http = reqwest::Client::new();

    match cli.command {
        Command::Scan { page } => {
            let store = DomainStore::open(&config.store_path)?;
            let mut session = open_page(&config, &http, &store, &page).await?;
            session.settle().await?;
            println!("{}", render_summary(&store.read(session.domain())?));
        }
        Command::Watch { page, polls } => {
            let store = DomainStore::open(&config.store_path)?;
            watch(&config, &http, &store, &page, polls).await?;
        }
        Command::Show { domain } => {
            let store = DomainStore::open(&config.store_path)?;
            println!("{}", render_summary(&store.read(&domain)?));
        }
        Command::Export { domain } => {
            let store = DomainStore::open(&config.store_path)?;
            println!("{}", store.export_json(&domain)?);
        }
        Command::Reset { domain } => {
            let store = DomainStore::open(&config.store_path)?;
            if store.reset(&domain)? {
                println!("Cleared i18n data for {}.", domain);
            } else {
                println!("No i18n data recorded for {}.", domain);
            }
        }
        Command::Domains => {
            let store = DomainStore::open(&config.store_path)?;
            for domain in store.domains()? {
                println!("{}", domain);
            }
        }
        Command::Languages { page } => {
            let client = translation_client(&config, &http, &PageLocation::parse(&page)?)?;
            for language in client.list_languages().await.into_result()? {
                println!("{}", language);
            }
        }
        Command::Get {
            page,
            language,
            key,
        } => {
            let client = translation_client(&config, &http, &PageLocation::parse(&page)?)?;
            let document = client.get_translation(&language).await.into_result()?;
            match document.lookup(&key) {
                Some(value) => println!("{}", value),
                None => {
                    return Err(HarvestError::NotFound(format!(
                        "no {} translation for {}",
                        language, key
                    )))
                }
            }
        }
        Command::Set {
            page,
            language,
            key,
            value,
        } => {
            let client = translation_client(&config, &http, &PageLocation::parse(&page)?)?;
            client
                .patch_key(&language, &key, &value)
                .await?
                .into_result()?;
            println!("Updated {} in {}", key, language);
        }
        Command::Highlight { page, output } => {
            let store = DomainStore::open(&config.store_path)?;
            let mut session = open_page(&config, &http, &store, &page).await?;
            session.settle().await?;
            session.enable_interactive_mode().await;
            session.settle().await?;

            let charset = get_charset(session.document()).unwrap_or_else(|| "utf-8".to_string());
            let html = session.serialize(&charset)?;
            match output {
                Some(path) => std::fs::write(path, html)?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&html)?;
                }
            }
        }
        Command::Message {
            page,
            messages,
            commands,
        } => {
            let store = DomainStore::open(&config.store_path)?;
            let mut session = open_page(&config, &http, &store, &page).await?;
            session.settle().await?;

            for message in messages.iter() {
                let reply = session
                    .handle_message(ControlMessage::from_json(message)?)
                    .await?;
                session.settle().await?;
                println!("{}", reply.to_json()?);
            }
            for command in commands.iter() {
                if let Some(reply) = session.handle_command(command).await? {
                    session.settle().await?;
                    println!("{}", reply.to_json()?);
                }
            }
        }
    }

    Ok(())
}

async fn watch(
    config: &HarvestConfig,
    http: &reqwest::Client,
    store: &DomainStore,
    page: &PageArgs,
    max_polls: Option<u64>,
) -> HarvestResult<()> {
    let source = DocumentSource::parse(&page.source);
    let location = page_location(&source, page.url.as_deref())?;
    let mut poller = Poller::new(source, http.clone());
    let mut session: Option<PageSession> = None;
    let mut polls = 0;

    tracing::info!(
        "Watching {} every {}ms",
        poller.source(),
        config.poll_interval_ms
    );

    loop {
        match poller.poll().await {
            Ok(Some(page)) => {
                let dom = page.to_dom();
                match session {
                    Some(ref mut open) => open.replace_document(dom),
                    None => {
                        let mut opened = new_session(config, http, store, location.clone(), dom)?;
                        opened.subscribe(|annotations| {
                            tracing::debug!("Settled with {} annotation(s)", annotations.len())
                        });
                        session = Some(opened);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Polling {} failed: {}", poller.source(), e),
        }

        if let Some(session) = session.as_mut() {
            if let Ok(Some(outcome)) = session.settle().await {
                if outcome.appended > 0 {
                    println!(
                        "{}: {} new key(s), {} total",
                        session.domain(),
                        outcome.appended,
                        outcome.total
                    );
                }
            }
        }

        polls += 1;
        if max_polls.is_some_and(|max| polls >= max) {
            return Ok(());
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}

async fn open_page(
    config: &HarvestConfig,
    http: &reqwest::Client,
    store: &DomainStore,
    page: &PageArgs,
) -> HarvestResult<PageSession> {
    let source = DocumentSource::parse(&page.source);
    let location = page_location(&source, page.url.as_deref())?;
    let dom = source.load(http).await?.to_dom();
    new_session(config, http, store, location, dom)
}

fn new_session(
    config: &HarvestConfig,
    http: &reqwest::Client,
    store: &DomainStore,
    location: PageLocation,
    dom: RcDom,
) -> HarvestResult<PageSession> {
    let client = translation_client(config, http, &location)?;
    let extractor = Extractor::new(&config.marker_attribute, &config.no_visible_value);
    Ok(PageSession::new(location, dom, extractor, store.clone(), client))
}

fn page_location(source: &DocumentSource, url: Option<&str>) -> HarvestResult<PageLocation> {
    match (url, source.url()) {
        (Some(url), _) => PageLocation::parse(url),
        (None, Some(url)) => PageLocation::from_url(url.clone()),
        (None, None) => Err(HarvestError::Config(format!(
            "{} is a local file; pass --url with the page URL to record it under",
            source
        ))),
    }
}

fn translation_client(
    config: &HarvestConfig,
    http: &reqwest::Client,
    location: &PageLocation,
) -> HarvestResult<TranslationClient> {
    TranslationClient::with_http(
        http.clone(),
        location,
        config.api_base.as_deref(),
        token_source(config),
    )
}

fn token_source(config: &HarvestConfig) -> Arc<dyn TokenSource> {
    let mut tokens = ChainedTokens::new();
    if let Some(token) = &config.access_token {
        tokens = tokens.with(StaticToken::new(token.clone()));
    }
    if let Some(path) = &config.session_file {
        tokens = tokens.with(SessionFileToken::new(path.clone()));
    }
    Arc::new(tokens)
}

fn init_logging(config: &HarvestConfig) {
    let level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(use_color())
        .with_target(false)
        .init();
}

fn use_color() -> bool {
    !NoColor::get_or_default(false) && atty::is(atty::Stream::Stderr)
}

fn print_error_message(msg: &str) {
    if use_color() {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}
