use clap::{Parser, Subcommand};
use gallery_feed::api::{self, HttpGalleryApi};
use gallery_feed::config::{self, AppConfig};
use gallery_feed::filter::FilterState;
use gallery_feed::render::{self, RenderOptions};
use gallery_feed::output;
use gallery_feed::session::{GalleryController, GallerySession};
use gallery_feed::types::RegionLookup;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Viewport width assumed when a command does not take one.
const DEFAULT_WIDTH: u32 = 1280;

/// Shared flags for commands that load the feed.
#[derive(clap::Args, Clone)]
struct FeedArgs {
    /// Only show items in this category id
    #[arg(long)]
    category: Option<u64>,

    /// Only show items in this region id
    #[arg(long)]
    region: Option<u64>,

    /// Stop after this many pages (including the first)
    #[arg(long)]
    max_pages: Option<u32>,
}

impl FeedArgs {
    fn filter(&self) -> FilterState {
        FilterState::new(self.category, self.region)
    }
}

#[derive(Parser)]
#[command(name = "gallery-feed")]
#[command(about = "Browse a remote photo gallery as an infinite masonry feed")]
#[command(long_about = "\
Browse a remote photo gallery as an infinite masonry feed

Pages are fetched from the gallery service and accumulated the way an
infinitely scrolling page would: page 1 on start or filter change, the next
page whenever the last item scrolls into view, until the service reports
no more.

Failed requests never abort a feed: the failure is logged and the feed ends
where it stood. Set RUST_LOG=gallery_feed=debug to see every request.

Run 'gallery-feed gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Gallery service base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List photo categories
    Categories,
    /// List regions
    Regions,
    /// List every gallery item, unpaginated
    Galleries,
    /// Load the feed page by page and print it
    Feed(FeedArgs),
    /// Print the masonry column assignment for a viewport width
    Layout {
        /// Viewport width in pixels
        #[arg(long)]
        width: u32,
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Write the loaded feed as a static HTML page
    Render {
        /// Output file
        #[arg(long, default_value = "gallery.html")]
        output: PathBuf,
        /// Flow items with CSS columns instead of the greedy layout
        #[arg(long)]
        css_columns: bool,
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Categories => {
            let (_, client) = connect(&cli)?;
            let categories = api::categories_or_empty(&client).await;
            output::print_categories(&categories);
        }
        Command::Regions => {
            let (_, client) = connect(&cli)?;
            let regions = api::regions_or_empty(&client).await;
            output::print_regions(&regions);
        }
        Command::Galleries => {
            let (_, client) = connect(&cli)?;
            let (items, regions) = tokio::join!(
                api::galleries_or_empty(&client),
                api::regions_or_empty(&client),
            );
            output::print_galleries(&items, &RegionLookup::new(regions));
        }
        Command::Feed(feed) => {
            let (config, api) = connect(&cli)?;
            let session = load_feed(api, &config, feed, DEFAULT_WIDTH).await;
            output::print_feed(&session, &config.labels);
        }
        Command::Layout { width, feed } => {
            let (config, api) = connect(&cli)?;
            let mut session = load_feed(api, &config, feed, *width).await;
            let assignment = session.assignment();
            output::print_layout(&assignment, *width);
        }
        Command::Render {
            output,
            css_columns,
            feed,
        } => {
            let (config, api) = connect(&cli)?;
            let session = load_feed(api, &config, feed, DEFAULT_WIDTH).await;
            let options = RenderOptions {
                css_columns: *css_columns,
            };
            let page = render::render_gallery(&session, &config, options);
            render::write_gallery(output, &page)?;
            println!(
                "Rendered {} items → {}",
                session.feed().len(),
                output.display()
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays the command output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gallery_feed=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file, apply CLI overrides on top, and build the client.
fn connect(cli: &Cli) -> Result<(AppConfig, HttpGalleryApi), Box<dyn std::error::Error>> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
        config.validate()?;
    }
    let api = HttpGalleryApi::from_config(&config.api)?;
    Ok((config, api))
}

/// Start a session and scroll until the feed ends or the page cap is hit.
async fn load_feed(
    api: HttpGalleryApi,
    config: &AppConfig,
    args: &FeedArgs,
    width: u32,
) -> GallerySession {
    let session = GallerySession::new(config.layout.clone(), width).with_filter(args.filter());
    let mut controller = GalleryController::new(api, config.api.page_size, session);
    controller.start().await;
    let extra = args.max_pages.map(|max| max.saturating_sub(1));
    let loaded = controller.scroll_to_end(extra).await;
    tracing::info!(pages = loaded + 1, "feed loaded");
    controller.into_session()
}
