use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use cardsheet::{
    Card, CardSize, CardsClient, ConfigEditor, Dimensions, DisplayMode, Error, Exporter, Face,
    FlipDirection, HandoffStore, ImageRenderer, Layout, Margins, Pagination, PaperSize,
    PrintConfig, Quality, Spacing,
};
use clap::{Args, Parser, Subcommand};

static EXPORTER: Exporter = Exporter::new();

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log per-page and per-card detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render cards onto print sheets and write a PDF
    Export {
        /// Card list (JSON: {"cards": [...]} or a bare array)
        input: Option<PathBuf>,
        /// Use the cards stashed by `fetch --select` instead of a file
        #[arg(long, conflicts_with = "input")]
        from_session: bool,
        #[arg(short, long)]
        output: PathBuf,
        /// Directory relative artwork paths are resolved against
        /// (defaults to the input file's directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Seconds to wait for one remote image before skipping the card
        #[arg(long, default_value_t = 10)]
        image_timeout: u64,
        #[command(flatten)]
        print: PrintArgs,
    },
    /// Show the computed layout and which cards land on which page
    Plan {
        input: Option<PathBuf>,
        #[arg(long, conflicts_with = "input")]
        from_session: bool,
        #[command(flatten)]
        print: PrintArgs,
    },
    /// Download cards from the backend
    Fetch {
        #[arg(long, default_value = "http://localhost:5000")]
        server: String,
        /// Only these card ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        /// Write the cards to this file
        #[arg(short, long, required_unless_present = "select")]
        output: Option<PathBuf>,
        /// Stash the cards for a later `export --from-session`
        #[arg(long)]
        select: bool,
    },
}

#[derive(Args)]
struct PrintArgs {
    /// a4, a3, letter, or WIDTHxHEIGHT in mm
    #[arg(long, default_value = "a4")]
    paper: PaperSize,
    /// poker, tarot, mtg, yugioh, sgs, hearthstone, catan, ticket-to-ride,
    /// or WIDTHxHEIGHT in mm
    #[arg(long, default_value = "poker")]
    card: String,
    /// One value, or top,right,bottom,left (mm)
    #[arg(long, default_value = "5")]
    margins: Margins,
    /// One value, or horizontal,vertical (mm)
    #[arg(long, default_value = "5")]
    spacing: Spacing,
    /// front_only, back_only, duplex, merged
    #[arg(long, default_value = "front_only")]
    mode: DisplayMode,
    /// long_edge or short_edge (duplex only)
    #[arg(long, default_value = "long_edge")]
    flip: FlipDirection,
    /// low, medium, high, or a positive factor
    #[arg(long, default_value = "low")]
    quality: Quality,
}

impl PrintArgs {
    fn to_config(&self) -> Result<PrintConfig, Error> {
        let mut editor = ConfigEditor::new(PrintConfig::default());
        editor
            .set_paper(self.paper)
            .set_margins(self.margins)
            .set_spacing(self.spacing)
            .set_display_mode(self.mode)
            .set_flip_direction(self.flip)
            .set_quality(self.quality);
        match self.card.parse::<CardSize>() {
            Ok(size) => {
                editor.set_card_size(size);
            }
            Err(_) => {
                let custom: Dimensions = self.card.parse()?;
                editor.set_card_size(CardSize::Custom).set_custom_card_size(custom);
            }
        }
        editor.apply().cloned()
    }
}

fn read_cards(input: Option<&PathBuf>, from_session: bool) -> Result<Vec<Card>, Error> {
    match input {
        Some(path) => cardsheet::load_cards(path),
        None if from_session => Ok(HandoffStore::session().take_print_cards()),
        None => Err(Error::InvalidConfig(
            "no input: pass a card file or --from-session".into(),
        )),
    }
}

fn print_plan(cards: &[Card], config: &PrintConfig) -> Result<(), Error> {
    let layout = Layout::compute(config);
    let card = config.card_dimensions();
    println!(
        "Paper {} ({}x{}mm), card {} ({}x{}mm), quality x{}",
        config.paper.name,
        config.paper.width,
        config.paper.height,
        config.card_size.name(),
        card.width,
        card.height,
        config.quality.0
    );
    println!(
        "Grid {} x {} = {} card(s) per page, mode {:?}, flip {:?}",
        layout.cards_per_row,
        layout.cards_per_column,
        layout.cards_per_page,
        config.display_mode,
        config.flip_direction
    );
    layout.ensure_capacity()?;

    let pagination = Pagination::new(cards, &layout, config.display_mode);
    let total = pagination.total_page_count();
    println!("{} card(s) on {} page(s)", cards.len(), total);
    println!();
    println!("+{:-<8}+{:-<7}+{:-<62}+", "", "", "");
    println!("| {:<6} | {:<5} | {:<60} |", "Page", "Side", "Slots");
    println!("+{:-<8}+{:-<7}+{:-<62}+", "", "", "");
    for page in pagination.pages() {
        let slots: Vec<String> = page
            .cards
            .iter()
            .map(|p| {
                let face = match p.face {
                    Face::Front => "",
                    Face::Back => "*",
                };
                format!("{}:{}{}", p.slot, p.card.id, face)
            })
            .collect();
        let side = if page.is_back { "back" } else { "front" };
        println!(
            "| {:<6} | {:<5} | {:<60} |",
            format!("{}/{}", page.index + 1, total),
            side,
            slots.join(" ")
        );
    }
    println!("+{:-<8}+{:-<7}+{:-<62}+", "", "", "");
    println!("(* = back face)");
    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Export {
            input,
            from_session,
            output,
            base_dir,
            image_timeout,
            print,
        } => {
            let config = print.to_config()?;
            let cards = read_cards(input.as_ref(), from_session)?;
            let base_dir = base_dir
                .or_else(|| input.as_ref().and_then(|p| p.parent().map(|d| d.to_path_buf())))
                .unwrap_or_else(|| PathBuf::from("."));
            let mut renderer = ImageRenderer::new(base_dir, Duration::from_secs(image_timeout));

            let mut last = None;
            let report = cardsheet::export_cards_to_pdf(
                &EXPORTER,
                &cards,
                &config,
                &mut renderer,
                &output,
                &mut |pct| {
                    if last != Some(pct) {
                        last = Some(pct);
                        eprint!("\rExporting {pct:>3}%");
                        std::io::stderr().flush().ok();
                    }
                },
            )?;
            eprintln!();
            println!(
                "Wrote {} page(s) to {} ({} card(s) placed)",
                report.page_count,
                output.display(),
                report.placed
            );
            for skipped in &report.skipped {
                println!(
                    "  skipped '{}' ({:?}) on page {}: {}",
                    skipped.card_id,
                    skipped.face,
                    skipped.page + 1,
                    skipped.reason
                );
            }
        }
        Commands::Plan { input, from_session, print } => {
            let config = print.to_config()?;
            let cards = read_cards(input.as_ref(), from_session)?;
            print_plan(&cards, &config)?;
        }
        Commands::Fetch { server, ids, output, select } => {
            let client = CardsClient::new(&server, Duration::from_secs(30))?;
            let cards = if ids.is_empty() {
                client.get_cards()?
            } else {
                client.find_cards(&ids)?
            };
            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_vec_pretty(&cards)?)?;
                println!("Wrote {} card(s) to {}", cards.len(), path.display());
            }
            if select {
                let store = HandoffStore::session();
                store.stash_print_cards(&cards)?;
                println!("Selected {} card(s) for printing", cards.len());
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
