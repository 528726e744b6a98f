use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{HttpProductApi, ProductStore};
use shared::domain::{ProductDraft, ProductFilters, ProductId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, validate};

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Browse and edit the product catalog")]
struct Cli {
    /// Base URL of the catalog API, e.g. https://host/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file to read instead of ./catalog.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Page the listing starts on
    #[arg(long, global = true, default_value_t = 1)]
    page: u32,
    /// Filter as field=value; repeatable, replaces configured filters
    #[arg(long = "filter", global = true, value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Show {
        id: i64,
    },
    Create(DraftArgs),
    Update {
        id: i64,
        #[command(flatten)]
        changes: ChangeArgs,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    stock: u32,
}

#[derive(Args, Debug)]
struct ChangeArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    stock: Option<u32>,
}

impl From<DraftArgs> for ProductDraft {
    fn from(args: DraftArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
        }
    }
}

impl ChangeArgs {
    fn apply(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(stock) = self.stock {
            draft.stock = stock;
        }
        draft
    }
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("filter '{raw}' has an empty field name"));
    }
    Ok((field.to_string(), value.to_string()))
}

fn check_draft(draft: &ProductDraft) -> Result<()> {
    if let Err(errors) = draft.validate() {
        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid product: {}", reasons.join("; "));
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt} [y/N] ")?;
    stdout.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url.clone() {
        settings.api_url = api_url;
        validate(&settings)?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let filters = if cli.filters.is_empty() {
        settings.default_filters.clone()
    } else {
        cli.filters.into_iter().collect::<ProductFilters>()
    };
    let api = HttpProductApi::new(&settings.api_url)
        .with_context(|| format!("invalid api_url '{}'", settings.api_url))?;
    info!("catalog: using api_url={}", api.api_url());
    let store = ProductStore::with_filters(Arc::new(api), filters);
    store.set_current_page(cli.page).await;

    match cli.command {
        Command::List => {
            let snapshot = store.ensure_loaded().await?;
            print!("{}", render::listing(&snapshot));
        }
        Command::Show { id } => {
            let product = store.show(ProductId(id)).await?;
            print!("{}", render::detail(&product));
        }
        Command::Create(args) => {
            let draft = ProductDraft::from(args);
            check_draft(&draft)?;
            store.create(&draft).await?;
            println!("created '{}'", draft.name);
            print!("{}", render::listing(&store.snapshot().await));
        }
        Command::Update { id, changes } => {
            let id = ProductId(id);
            store.ensure_loaded().await?;
            let current = store.find(id).await?;
            let draft = changes.apply(ProductDraft::from(&current));
            check_draft(&draft)?;
            store.update(id, &draft).await?;
            println!("updated product {id}");
            print!("{}", render::listing(&store.snapshot().await));
        }
        Command::Delete { id, yes } => {
            let id = ProductId(id);
            store.ensure_loaded().await?;
            let current = store.find(id).await?;
            if !yes && !confirm(&format!("Delete product {id} ({})?", current.name))? {
                println!("aborted");
                return Ok(());
            }
            store.delete(id).await?;
            println!("deleted product {id}");
            print!("{}", render::listing(&store.snapshot().await));
        }
    }

    Ok(())
}
