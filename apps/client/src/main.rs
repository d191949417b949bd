use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fashion_finder_client::{
    render::{render, write_images},
    HttpSearchApi, HttpSimilarityService, ImageFile, ImageSearchView, Session, Tab,
};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "fashion-finder", about = "Find fashion items that look like your photo")]
struct Cli {
    /// Search history API
    #[arg(long, env = "FASHION_FINDER_API_URL", default_value = "http://localhost:8082")]
    api_url: String,

    /// Image similarity service
    #[arg(
        long,
        env = "FASHION_FINDER_SIMILARITY_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    similarity_url: String,

    /// Access token; without one, searches are not saved
    #[arg(long, env = "FASHION_FINDER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image and show similar styles
    Search {
        file: PathBuf,
        /// Write the returned images here
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show recent searches
    History,
    /// Show recommendations drawn from recent searches
    ForYou {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fashion_finder_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let had_session = cli.token.is_some();

    let http = reqwest::Client::new();
    let mut view = ImageSearchView::new(
        HttpSearchApi::new(http.clone(), &cli.api_url),
        HttpSimilarityService::new(http, &cli.similarity_url),
        Session::default(),
    );
    if let Some(token) = cli.token {
        view.login(token);
    }

    view.mount().await;

    let out_dir = match cli.command {
        Command::Search { file, out_dir } => {
            let image = ImageFile::load(&file).await?;
            view.select_file(image);
            view.upload().await;
            view.set_tab(Tab::Search);
            out_dir
        }
        Command::History => {
            view.set_tab(Tab::History);
            None
        }
        Command::ForYou { out_dir } => {
            view.set_tab(Tab::ForYou);
            out_dir
        }
    };

    print!("{}", render(&view));

    if let Some(dir) = out_dir {
        let (prefix, images) = match view.tab() {
            Tab::ForYou => ("for-you", view.recommendations()),
            _ => ("similar", view.similar_images()),
        };
        let written = write_images(&dir, prefix, images)?;
        println!("wrote {} image(s) to {}", written.len(), dir.display());
    }

    if had_session && !view.session().is_authenticated() {
        warn!("The access token was rejected; sign in again to save searches");
    }

    if view.error().is_some() {
        std::process::exit(1);
    }

    Ok(())
}
