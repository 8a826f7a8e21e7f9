mod terminal;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use quiz_core::QuizSession;
use quiz_core::model::{QuizDocument, QuizId};
use services::{ApiConfig, AppServices, CacheBackend, Clock};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "quiz", about = "Generate and take article quizzes from the terminal")]
struct Args {
    /// Base URL of the quiz backend
    #[arg(long, env = "QUIZ_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// SQLite URL or path for the quiz cache
    #[arg(long, env = "QUIZ_DB_URL", default_value = "sqlite://quiz-cache.sqlite3")]
    db: String,

    /// Keep the cache in memory for this run only
    #[arg(long)]
    in_memory: bool,

    /// Where debug logs are written
    #[arg(long, env = "QUIZ_LOG_FILE", default_value = "quiz.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Take a quiz from the backend or a local JSON file
    Take {
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        id: Option<u64>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Generate a quiz for an article link and show it
    Generate {
        url: String,
        /// Start taking the quiz right away
        #[arg(long)]
        take: bool,
    },
    /// List past quizzes
    History,
    /// Show a quiz without taking it
    Show { id: u64 },
    /// Drop a quiz from the local cache
    Forget { id: u64 },
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite::memory:") || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_dir(db_url: &str) -> io::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn init_logging(path: &Path) {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(file) = File::create(path) {
        let _ = WriteLogger::init(LevelFilter::Debug, config, file);
    }
}

fn load_file(path: &Path) -> Result<QuizDocument, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}

fn take(session: QuizSession) -> io::Result<()> {
    let stdin = io::stdin();
    let parked = terminal::run_take(session, stdin.lock(), io::stdout())?;
    if let Some(report) = parked.report() {
        log::info!("left take mode with {}%", report.percentage());
    } else {
        log::info!("left take mode with {} answers", parked.answers().len());
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_file);

    let cache = if args.in_memory {
        CacheBackend::InMemory
    } else {
        let url = normalize_sqlite_url(&args.db);
        prepare_sqlite_dir(&url)?;
        CacheBackend::Sqlite(url)
    };
    let api = ApiConfig::from_env().with_base_url(args.api_url);
    let services = AppServices::new(api, &cache, Clock::default()).await?;
    let library = services.library();

    match args.command {
        Command::Take { file: Some(path), .. } => {
            let quiz = load_file(&path)?;
            take(QuizSession::new(Arc::new(quiz)))?;
        }
        Command::Take { id, file: None } => {
            let id = id.map(QuizId::new).ok_or("either --id or --file is required")?;
            let session = library.start_attempt(id).await?;
            take(session)?;
        }
        Command::Generate { url, take: start } => {
            let quiz = library.generate(&url).await?;
            terminal::print_overview(&mut io::stdout(), &quiz)?;
            if start {
                take(QuizSession::new(quiz))?;
            }
        }
        Command::History => {
            let listing = library.history().await?;
            if listing.from_cache {
                eprintln!("(backend unreachable, showing cached quizzes)");
            }
            if listing.items.is_empty() {
                println!("No quizzes yet.");
            }
            for item in listing.items {
                println!(
                    "{:>5}  {}  {} ({} questions)  {}",
                    item.id,
                    item.created_at.format("%Y-%m-%d %H:%M"),
                    item.title,
                    item.question_count,
                    item.url
                );
            }
        }
        Command::Show { id } => {
            let quiz = library.open(QuizId::new(id)).await?;
            terminal::print_overview(&mut io::stdout(), &quiz)?;
        }
        Command::Forget { id } => {
            library.forget(QuizId::new(id)).await?;
            println!("Removed quiz {id} from the local cache.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/q.db"), "sqlite:///tmp/q.db");
        assert_eq!(normalize_sqlite_url("/var/q.db"), "sqlite:///var/q.db");
        assert!(normalize_sqlite_url("cache.db").ends_with("/cache.db"));
    }

    #[test]
    fn take_requires_a_source() {
        assert!(Args::try_parse_from(["quiz", "take"]).is_err());
        assert!(Args::try_parse_from(["quiz", "take", "--id", "3", "--file", "q.json"]).is_err());
        assert!(Args::try_parse_from(["quiz", "take", "--id", "3"]).is_ok());
    }
}
