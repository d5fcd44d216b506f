//! Command-line front end for the tag wiki.
//!
//! # Responsibility
//! - Resolve process configuration, start logging and open the page store.
//! - Expose the view/edit/save/tag flows for scripting and local use.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use tagwiki_core::{
    core_version, init_logging, is_routable_title, RenderedPage, SqlitePageStore, ViewOutcome,
    WikiConfig, WikiService, FRONT_PAGE_TITLE,
};

#[derive(Debug, Parser)]
#[command(name = "tagwiki", version, about = "Minimal tagged wiki over a SQLite page store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a page with links, timestamp and tags rendered.
    View(TitleArgs),
    /// Print the raw body of a page, or nothing for a new page.
    Edit(TitleArgs),
    /// Create or replace a page.
    Save(SaveArgs),
    /// List every distinct tag.
    Tags,
    /// List pages carrying a tag.
    Tagged(TaggedArgs),
    /// List every page title.
    Titles,
    /// Print the resolved configuration.
    Config,
}

#[derive(Debug, Args)]
struct TitleArgs {
    #[arg(default_value = FRONT_PAGE_TITLE)]
    title: String,
}

#[derive(Debug, Args)]
struct SaveArgs {
    title: String,
    #[arg(long, default_value = "")]
    body: String,
    #[arg(long, default_value = "", help = "Tags separated by \", \"")]
    tags: String,
}

#[derive(Debug, Args)]
struct TaggedArgs {
    tag: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = WikiConfig::from_env().context("failed to resolve configuration")?;

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        bail!("failed to initialize logging: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok version={} store={}",
        core_version(),
        config.store.url.display()
    );

    if let Commands::Config = cli.command {
        print_config(&config);
        return Ok(());
    }

    let store = SqlitePageStore::open(&config.store).context("failed to open page store")?;
    let service = WikiService::new(store);

    match cli.command {
        Commands::View(args) => {
            ensure_routable(&args.title)?;
            match service.load_page_for_view(&args.title)? {
                ViewOutcome::Render(page) => print_page(&page),
                ViewOutcome::RedirectToEdit(title) => {
                    println!("{title} does not exist yet; create it with `tagwiki save {title}`");
                }
            }
        }
        Commands::Edit(args) => {
            ensure_routable(&args.title)?;
            let page = service.load_page_for_edit(&args.title)?;
            println!("title: {}", page.title);
            println!("tags: {}", page.rendered_tags());
            println!();
            print!("{}", page.body);
        }
        Commands::Save(args) => {
            ensure_routable(&args.title)?;
            let page = service.save_page(&args.title, &args.body, &args.tags)?;
            println!("saved {} at {}", page.title, page.rendered_timestamp());
        }
        Commands::Tags => {
            for tag in service.distinct_tags()? {
                println!("{tag}");
            }
        }
        Commands::Tagged(args) => {
            for page in service.pages_tagged(&args.tag)? {
                println!("{}\t{}", page.title, page.rendered_timestamp);
            }
        }
        Commands::Titles => {
            for title in service.list_titles()? {
                println!("{title}");
            }
        }
        Commands::Config => {}
    }

    Ok(())
}

fn ensure_routable(title: &str) -> Result<()> {
    if !is_routable_title(title) {
        bail!("invalid page title `{title}`; titles are letters and digits only");
    }
    Ok(())
}

fn print_page(page: &RenderedPage) {
    println!("# {}", page.title);
    println!("updated: {}", page.rendered_timestamp);
    println!("tags: {}", page.rendered_tags);
    println!();
    println!("{}", page.rendered_body);
}

fn print_config(config: &WikiConfig) {
    println!("store_url={}", config.store.url.display());
    println!("pool_size={}", config.store.pool_size);
    println!("listen_addr={}", config.listen_addr());
    println!("log_level={}", config.log_level);
    match &config.log_dir {
        Some(dir) => println!("log_dir={}", dir.display()),
        None => println!("log_dir=stderr"),
    }
}
