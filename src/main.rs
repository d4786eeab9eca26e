use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gtfs_structures::Gtfs;

use mc_transit_planner::fare::icd_fare_hook;
use mc_transit_planner::{gtfs, persist, run_mcraptor, run_range_mcraptor, JourneyError};

#[derive(Parser)]
#[command(name = "mc-transit-planner", about = "Multi-criteria round-based transit journey planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plans journeys from one origin station, dumping one JSON file per destination.
    Plan {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        origin: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value_t = 5)]
        rounds: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Builds and persists a Timetable from a GTFS feed directory.
    Ingest {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        date: String,
        #[arg(short, long)]
        agencies: Vec<String>,
        #[arg(long, default_value_t = 180)]
        transfer_cost: u32,
        #[arg(long)]
        icd: bool,
    },
    /// Diffs two directories of per-destination journey dumps.
    Compare {
        #[arg(long = "original-dir")]
        original_dir: PathBuf,
        #[arg(long = "parallel-dir")]
        parallel_dir: PathBuf,
        #[arg(long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Plan { input, origin, start, end, rounds, out } => run_plan(input, origin, start, end, rounds, out),
        Command::Ingest { input, output, date, agencies, transfer_cost, icd } => run_ingest(input, output, date, agencies, transfer_cost, icd),
        Command::Compare { original_dir, parallel_dir, verbose } => run_compare(original_dir, parallel_dir, verbose),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::from(3)
        }
    }
}

fn run_plan(input: PathBuf, origin: String, start: String, end: Option<String>, rounds: usize, out: PathBuf) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let tt = persist::read_timetable(&input)?;

    let Some(origin_idx) = tt.station_idx(&origin) else {
        eprintln!("unknown origin station: {origin}");
        return Ok(ExitCode::from(4));
    };

    let t_dep = mc_transit_planner::utils::parse_time(&start)?;

    std::fs::create_dir_all(&out)?;

    let journeys = if let Some(end) = end {
        let search = run_mcraptor(&tt, origin_idx, t_dep, rounds, None)?;
        let Some(dest_idx) = tt.station_idx(&end) else {
            eprintln!("unknown destination station: {end}");
            return Ok(ExitCode::from(4));
        };
        let journeys = match mc_transit_planner::reconstruct_journeys(&tt, &search, dest_idx) {
            Ok(journeys) => journeys,
            Err(JourneyError::NoJourneyFound) => Vec::new(),
            Err(e @ (JourneyError::BrokenChain | JourneyError::InfiniteLoop)) => return Err(Box::new(e)),
        };
        let serialized: Vec<_> = journeys.iter().map(|j| j.serialize(&tt)).collect();
        let path = out.join(format!("{end}.json"));
        std::fs::write(&path, serde_json::to_vec_pretty(&serialized)?)?;
        serialized.len()
    } else {
        let search = run_mcraptor(&tt, origin_idx, t_dep, rounds, None)?;
        let mut total = 0;
        for (dest_idx, station) in tt.stations() {
            if dest_idx == origin_idx {
                continue;
            }
            let journeys = match mc_transit_planner::reconstruct_journeys(&tt, &search, dest_idx) {
                Ok(journeys) => journeys,
                Err(JourneyError::NoJourneyFound) => continue,
                Err(e @ (JourneyError::BrokenChain | JourneyError::InfiniteLoop)) => return Err(Box::new(e)),
            };
            let serialized: Vec<_> = journeys.iter().map(|j| j.serialize(&tt)).collect();
            total += serialized.len();
            let path = out.join(format!("{}.json", station.id));
            std::fs::write(&path, serde_json::to_vec_pretty(&serialized)?)?;
        }
        total
    };

    println!("wrote {journeys} journeys to {}", out.display());
    Ok(ExitCode::SUCCESS)
}

fn run_ingest(input: PathBuf, output: PathBuf, date: String, agencies: Vec<String>, transfer_cost: u32, icd: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if !input.exists() {
        eprintln!("GTFS input not found: {}", input.display());
        return Ok(ExitCode::from(3));
    }

    let service_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?;
    let feed = Gtfs::new(input.to_str().ok_or("non-UTF8 input path")?)?;

    let hook: Option<&mc_transit_planner::fare::FareHook> = if icd { Some(&icd_fare_hook) } else { None };
    let tt = gtfs::build_timetable(&feed, service_date, &agencies, transfer_cost, hook)?;

    persist::write_timetable(&output, &tt)?;
    println!(
        "ingested {} stations, {} stops, {} routes into {}",
        tt.num_stations(),
        tt.num_stops(),
        tt.num_routes(),
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_compare(original_dir: PathBuf, parallel_dir: PathBuf, verbose: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if !original_dir.exists() || !parallel_dir.exists() {
        eprintln!("both --original-dir and --parallel-dir must exist");
        return Ok(ExitCode::from(3));
    }

    let original_files = json_files_in(&original_dir)?;
    let parallel_files = json_files_in(&parallel_dir)?;
    let common: HashSet<&String> = original_files.intersection(&parallel_files).collect();

    println!("Found {} files in original directory", original_files.len());
    println!("Found {} files in parallel directory", parallel_files.len());
    println!("Common files: {}", common.len());

    let mut identical_files = 0;
    let mut files_with_differences = 0;
    let mut names: Vec<&&String> = common.iter().collect();
    names.sort();

    for &&name in &names {
        let original: Vec<serde_json::Value> = load_json(&original_dir.join(name))?;
        let parallel: Vec<serde_json::Value> = load_json(&parallel_dir.join(name))?;

        let original_set: HashSet<String> = original.iter().map(comparable_key).collect();
        let parallel_set: HashSet<String> = parallel.iter().map(comparable_key).collect();

        let only_in_original = original_set.difference(&parallel_set).count();
        let only_in_parallel = parallel_set.difference(&original_set).count();

        if only_in_original == 0 && only_in_parallel == 0 {
            identical_files += 1;
            if verbose {
                println!("{name}: identical ({} journeys)", original.len());
            }
        } else {
            files_with_differences += 1;
            println!(
                "{name}: original={} parallel={} only_in_original={only_in_original} only_in_parallel={only_in_parallel}",
                original.len(),
                parallel.len()
            );
        }
    }

    println!("\nTotal files compared: {}", names.len());
    println!("Identical files: {identical_files}");
    println!("Files with differences: {files_with_differences}");

    Ok(ExitCode::SUCCESS)
}

fn json_files_in(dir: &std::path::Path) -> std::io::Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().extension().is_some_and(|ext| ext == "json") {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

fn load_json(path: &std::path::Path) -> std::io::Result<Vec<serde_json::Value>> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes).unwrap_or_default())
}

/// A journey's comparable identity: departure/arrival/duration/transfers
/// plus each leg's (route_id, from_stop, to_stop, departure_time,
/// arrival_time), with legs sorted so two structurally-equal journeys
/// compare equal regardless of serialization order.
fn comparable_key(journey: &serde_json::Value) -> String {
    let mut legs: Vec<serde_json::Value> = journey.get("legs").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    legs.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    format!(
        "{:?}|{:?}|{:?}|{:?}|{}",
        journey.get("departure_time"),
        journey.get("arrival_time"),
        journey.get("total_duration"),
        journey.get("num_transfers"),
        legs.iter().map(ToString::to_string).collect::<Vec<_>>().join(";")
    )
}
