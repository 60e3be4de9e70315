//! Doc Translator CLI - translate documents while preserving their layout.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use doc_translator_core::{
    BudgetAnalyzer, DocumentTranslator, EngineDocument, JsonDocument, Lang, TextColor,
    TranslateOptions, TranslationCache, create_translator,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, ValueEnum)]
enum ColorOption {
    DarkRed,
    Black,
    Blue,
    DarkGreen,
    Purple,
}

impl From<ColorOption> for TextColor {
    fn from(opt: ColorOption) -> Self {
        match opt {
            ColorOption::DarkRed => Self::dark_red(),
            ColorOption::Black => Self::black(),
            ColorOption::Blue => Self::blue(),
            ColorOption::DarkGreen => Self::dark_green(),
            ColorOption::Purple => Self::purple(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "doc-translate")]
#[command(author, version, about = "Translate documents while preserving layout", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a document into an overlay layer
    Translate(TranslateArgs),
    /// Report translation cost without calling the backend
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input document (structured JSON)
    input: PathBuf,

    /// Source language code
    #[arg(short = 's', long, default_value = "en")]
    source: String,

    /// Target language code
    #[arg(short = 't', long, default_value = "zh-CN")]
    target: String,

    /// Name of the overlay layer holding translated text
    #[arg(short = 'l', long, default_value = "Text")]
    layer: String,

    /// Translator backend
    #[arg(long, default_value = "openai")]
    translator: String,

    /// Translated text color
    #[arg(short, long, value_enum, default_value = "dark-red")]
    color: ColorOption,

    /// Do not keep original text visible on the base layer
    #[arg(long)]
    no_original: bool,

    /// Fallback font file for blocks without a usable embedded font
    #[arg(long)]
    font: Option<PathBuf>,

    /// Durable translation cache location
    #[arg(long)]
    cache: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Input document (structured JSON)
    input: PathBuf,

    /// Source language code
    #[arg(short = 's', long, default_value = "en")]
    source: String,

    /// Target language code
    #[arg(short = 't', long, default_value = "zh-CN")]
    target: String,

    /// Translator backend
    #[arg(long, default_value = "openai")]
    translator: String,

    /// Durable translation cache location
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Per-request token target for the over-budget count
    #[arg(long, default_value_t = 2048)]
    threshold: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Command::Translate(args) => translate(args).await,
        Command::Info(args) => info_report(args).await,
    }
}

async fn translate(args: TranslateArgs) -> Result<()> {
    info!("loading document: {}", args.input.display());
    let mut doc = JsonDocument::open(&args.input)
        .context(format!("Failed to load document: {}", args.input.display()))?;

    let total_pages = doc.page_count();
    info!("document has {} pages", total_pages);

    let options = TranslateOptions {
        source_lang: Lang::new(&args.source),
        target_lang: Lang::new(&args.target),
        layer_name: args.layer,
        text_color: args.color.into(),
        keep_original: !args.no_original,
        default_font: args.font,
        cache_path: args.cache,
    };

    let pipeline = DocumentTranslator::new(&args.translator, options)
        .context("Failed to initialize translator")?;

    // Setup progress bar
    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(total_pages as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let output = pipeline
        .translate_document(
            &mut doc,
            &args.input,
            Some(Box::new(move |done, _total| {
                #[allow(clippy::cast_possible_truncation)]
                progress.set_position(done as u64);
            })),
        )
        .await
        .context("Translation failed")?;

    pb.finish_with_message("Translation complete");

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Translated document saved to: {}", output.display());
    }

    Ok(())
}

async fn info_report(args: InfoArgs) -> Result<()> {
    let doc = JsonDocument::open(&args.input)
        .context(format!("Failed to load document: {}", args.input.display()))?;

    let source = Lang::new(&args.source);
    let target = Lang::new(&args.target);
    let translator = create_translator(&args.translator, &source, &target, args.cache.as_deref())
        .context("Failed to initialize translator")?;

    let mut cache = TranslationCache::new(args.cache.as_deref(), Arc::clone(&translator))
        .context("Failed to open cache")?;

    let analyzer = BudgetAnalyzer::new(translator, args.threshold);
    let report = analyzer.analyze(&doc, &cache);
    cache.close().context("Failed to close cache")?;
    let report = report?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("pages:                    {}", doc.page_count());
        println!("requests needed:          {}", report.requests);
        println!("total request tokens:     {}", report.total_request_tokens);
        println!("largest request tokens:   {}", report.max_request_tokens);
        println!(
            "requests over {} tokens: {}",
            args.threshold, report.over_threshold
        );
        println!("blocks already cached:    {}", report.cached_blocks);
    }

    Ok(())
}
