use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use meta_tags::config;
use meta_tags::{MetaPath, MetaTagState, MetaTags, MetaVars, Tag, VarValue};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "meta-tags")]
#[command(about = "Render title, meta and canonical link tags for a page")]
#[command(long_about = "\
Render title, meta and canonical link tags for a page

Tags set on the command line win over translated defaults. With --controller,
missing fields are filled from the translation files listed in
meta-tags.toml, walking up from metas.<controller>.<action> to
metas.defaults.

Example:

  meta-tags render --controller users --action show --var name=Alice

  [metas.users.show.title]
  anonymous = \"Profile\"
  named = \"Profile of %{name}\"

Run 'meta-tags gen-config' to generate a documented meta-tags.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding meta-tags.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Page metadata flags shared by the rendering commands.
#[derive(clap::Args, Clone)]
struct PageArgs {
    /// Controller path for translated defaults (e.g. `users`, `admin/users`)
    #[arg(long)]
    controller: Option<String>,

    /// Action for translated defaults
    #[arg(long, default_value = "index")]
    action: String,

    /// Page title; repeat to append parts
    #[arg(long)]
    title: Vec<String>,

    /// Page description
    #[arg(long)]
    description: Option<String>,

    /// Comma-separated keywords
    #[arg(long, value_delimiter = ',')]
    keywords: Vec<String>,

    /// Mark the page noindex for all crawlers
    #[arg(long)]
    noindex: bool,

    /// Mark the page noindex for a named crawler (repeatable)
    #[arg(long, value_name = "CRAWLER")]
    noindex_for: Vec<String>,

    /// Mark the page nofollow for all crawlers
    #[arg(long)]
    nofollow: bool,

    /// Mark the page nofollow for a named crawler (repeatable)
    #[arg(long, value_name = "CRAWLER")]
    nofollow_for: Vec<String>,

    /// Canonical URL
    #[arg(long)]
    canonical: Option<String>,

    /// Substitution variable; repeat a name to give it several candidates
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the head fragment
    Render(PageArgs),
    /// Print the page title as plain text
    Title(PageArgs),
    /// Print a stock meta-tags.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Render(args) => {
            let config = config::load_config(&cli.config_dir)?;
            let mut meta = build_page(&args);
            apply_translations(&mut meta, &args, &config, &cli.config_dir)?;
            let html = meta.render(&config.layout.to_defaults())?;
            println!("{}", html.into_string());
        }
        Command::Title(args) => {
            let config = config::load_config(&cli.config_dir)?;
            let mut meta = build_page(&args);
            apply_translations(&mut meta, &args, &config, &cli.config_dir)?;
            println!("{}", meta.display_title(&config.layout.to_defaults())?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Parse a `NAME=VALUE` pair.
fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

/// Group repeated `--var` names into candidate lists.
fn collect_vars(pairs: &[(String, String)]) -> MetaVars {
    let mut grouped: IndexMap<&str, Vec<String>> = IndexMap::new();
    for (name, value) in pairs {
        grouped.entry(name.as_str()).or_default().push(value.clone());
    }
    grouped
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                VarValue::One(values.remove(0))
            } else {
                VarValue::Many(values)
            };
            (name.to_string(), value)
        })
        .collect()
}

fn build_page(args: &PageArgs) -> MetaTags {
    let mut meta = MetaTags::new();
    if let Some((first, rest)) = args.title.split_first() {
        meta.title(first.as_str(), None);
        for part in rest {
            meta.set_tags(MetaTagState::new().with(Tag::Title, part.as_str()), true);
        }
    }
    if let Some(description) = &args.description {
        meta.description(description.as_str());
    }
    if !args.keywords.is_empty() {
        meta.keywords(args.keywords.clone());
    }
    if args.noindex {
        meta.noindex(true);
    }
    if !args.noindex_for.is_empty() {
        meta.noindex(args.noindex_for.clone());
    }
    if args.nofollow {
        meta.nofollow(true);
    }
    if !args.nofollow_for.is_empty() {
        meta.nofollow(args.nofollow_for.clone());
    }
    if let Some(url) = &args.canonical {
        meta.canonical(url.as_str());
    }
    meta.set_vars(collect_vars(&args.vars), true);
    meta
}

fn apply_translations(
    meta: &mut MetaTags,
    args: &PageArgs,
    config: &config::MetaConfig,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(controller) = &args.controller else {
        return Ok(());
    };
    let catalog = config.catalog(config_dir)?;
    let path = MetaPath::for_action(controller, &args.action);
    debug!(path = %path.key(), "applying translated defaults");
    meta.apply_translations(&catalog, &path)?;
    Ok(())
}
