//! # Wayfarer CLI Application
//!
//! Command-line front end for the itinerary builder.
//!
//! ## Subcommands
//!
//! - `plan`: Build a full itinerary for a trip
//! - `check`: Run the page existence check against one URL
//! - `fetch`: Print the markdown the extractor would send for a page
//!
//! Configuration comes from the environment (and `.env`); see
//! `wayfarer::config` for the variables. Logs go to stderr so the
//! itinerary on stdout can be piped.

#![recursion_limit = "256"]

mod telemetry;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::instrument;
use wayfarer::config::AppConfig;
use wayfarer::existence::{FailureMarker, check_existence};
use wayfarer::extract::{ExtractionResult, RigExtractionService};
use wayfarer::fetch::{FetchBackend, FetchConfig, Fetcher, PageFetcher};
use wayfarer::itinerary::{Aggregator, ItineraryResponse, TripRequest};
use wayfarer::model::Client;
use wayfarer::pipeline::SourcePipeline;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Build a travel itinerary from public travel sites",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an itinerary for a trip
    Plan(PlanArgs),

    /// Check whether a page has content
    Check(CheckArgs),

    /// Fetch a page and print it as markdown
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Where the trip goes
    #[arg(short, long)]
    destination: String,

    /// Where the trip starts
    #[arg(short, long)]
    origin: String,

    /// Number of adults travelling
    #[arg(short, long, default_value = "1")]
    party_size: u32,

    /// First night of the stay (YYYY-MM-DD)
    #[arg(short, long)]
    start: NaiveDate,

    /// Check-out day (YYYY-MM-DD)
    #[arg(short, long)]
    end: NaiveDate,

    /// Number of hotel rooms
    #[arg(short, long, default_value = "1")]
    rooms: u32,

    /// Why you are travelling, used to flag relevant results
    #[arg(long, default_value = "sightseeing")]
    purpose: String,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Run the category pipelines concurrently
    #[arg(short, long)]
    concurrent: bool,

    /// Fetch backend (spider|http), overrides WAYFARER_FETCH_BACKEND
    #[arg(short, long, value_parser = ["spider", "http"])]
    backend: Option<String>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Page to check
    #[arg(required = true)]
    url: String,

    /// Text the site shows when the page has no content
    #[arg(short, long)]
    marker: String,

    /// Selector of the element carrying the marker
    #[arg(short, long)]
    selector: String,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Page to fetch
    #[arg(required = true)]
    url: String,

    /// Selector of the content to keep
    #[arg(short, long, default_value = "body")]
    selector: String,

    /// Fetch backend (spider|http)
    #[arg(short, long, value_parser = ["spider", "http"])]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Telemetry settings may come from `.env` too
    dotenvy::dotenv().ok();
    let _otel = telemetry::init_tracing_subscriber()?;

    match cli.command {
        Some(Commands::Plan(args)) => {
            plan_command(args).await?;
        }
        Some(Commands::Check(args)) => {
            check_command(args).await?;
        }
        Some(Commands::Fetch(args)) => {
            fetch_command(args).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["wayfarer", "--help"]);
        }
    }

    Ok(())
}

fn fetcher(backend: Option<&str>, mut fetch_config: FetchConfig) -> anyhow::Result<Fetcher> {
    if let Some(backend) = backend {
        fetch_config.backend = backend.parse::<FetchBackend>()?;
    }
    Ok(Fetcher::from_config(fetch_config)?)
}

#[instrument]
async fn plan_command(args: PlanArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let fetcher = fetcher(args.backend.as_deref(), config.fetch.clone())?;

    let client = Client::new_gemini(&config.gemini_api_key, &config.model);
    let service = RigExtractionService::new(client);
    let pipeline = SourcePipeline::new(fetcher, service, config.pipeline.chunk_token_threshold);
    let aggregator = Aggregator::new(pipeline, config.sources.clone())
        .with_concurrency(args.concurrent || config.pipeline.concurrent);

    let trip = TripRequest {
        destination: args.destination,
        origin: args.origin,
        party_size: args.party_size,
        stay_start: args.start,
        stay_end: args.end,
        room_count: args.rooms,
        purpose: args.purpose,
    };

    eprintln!("Planning a trip from {} to {}...", trip.origin, trip.destination);
    let itinerary = aggregator.build_itinerary(&trip).await?;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&itinerary)?);
        }
        _ => print_itinerary(&trip, &itinerary),
    }

    Ok(())
}

#[instrument]
async fn check_command(args: CheckArgs) -> anyhow::Result<()> {
    let fetcher = fetcher(None, AppConfig::fetch_from_env()?)?;
    let marker = FailureMarker::new(args.marker, args.selector);

    if check_existence(&fetcher, &args.url, &marker).await {
        println!("{}: content found", args.url);
    } else {
        println!("{}: no content", args.url);
    }

    Ok(())
}

#[instrument]
async fn fetch_command(args: FetchArgs) -> anyhow::Result<()> {
    let fetcher = fetcher(args.backend.as_deref(), AppConfig::fetch_from_env()?)?;

    let page = fetcher.fetch(&args.url, &args.selector).await?;
    if !page.success {
        anyhow::bail!("{} did not load", args.url);
    }

    println!("{}", page.markdown());
    Ok(())
}

fn print_itinerary(trip: &TripRequest, itinerary: &ItineraryResponse) {
    println!("\nTrip to {} ({} to {})", trip.destination, trip.stay_start, trip.stay_end);

    section("Summary", &itinerary.summary, |summary| {
        println!("History: {}", summary.history);
        println!("Transportation: {}", summary.transportation);
        println!("Things to do: {}", summary.things_to_do);
        println!("Food: {}", summary.food);
        println!("Hotels: {}", summary.hotels);
    });

    section("Getting there", &itinerary.routes, |routes| {
        for (i, path) in routes.paths.iter().enumerate() {
            println!("{}. {}{}", i + 1, path.methods, relevant_mark(path.relevant));
            println!("   Time: {}", path.time);
            println!("   Price: {}", path.price_range);
        }
    });

    section("Events", &itinerary.events, |events| {
        for (i, event) in events.events.iter().enumerate() {
            println!("{}. {}{}", i + 1, event.name, relevant_mark(event.relevant));
            println!("   When: {}", event.time);
            println!("   Where: {}", event.area);
        }
    });

    section("Hotels", &itinerary.hotels, |hotels| {
        for (i, hotel) in hotels.hotels.iter().enumerate() {
            println!(
                "{}. {} ({:.1}/10){}",
                i + 1,
                hotel.name,
                hotel.review_score,
                relevant_mark(hotel.relevant)
            );
            println!("   {} per night, {} total", hotel.per_night_price, hotel.total_price);
            println!("   Distance: {}", hotel.distance);
            if !hotel.extra_info.trim().is_empty() {
                println!("   {}", hotel.extra_info);
            }
        }
    });

    section("Attractions", &itinerary.attractions, |attractions| {
        for (i, attraction) in attractions.attractions.iter().enumerate() {
            println!("{}. {} - {}", i + 1, attraction.name, attraction.location);
            println!("   {}", attraction.description);
        }
    });
    println!();
}

fn section<T>(title: &str, result: &ExtractionResult<T>, render: impl FnOnce(&T)) {
    println!("\n{}", title);
    println!("{}", "-".repeat(title.len()));
    match result {
        ExtractionResult::Available { data } => render(data),
        ExtractionResult::Unavailable { .. } => println!("No data available"),
    }
}

fn relevant_mark(relevant: bool) -> &'static str {
    if relevant { " *" } else { "" }
}
