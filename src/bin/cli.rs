//! linksight CLI - Debug tool for the positioning engine
//!
//! Usage:
//!   linksight-cli replay <course.json> <fixes.json>
//!   linksight-cli target <from-lat> <from-lng> <to-lat> <to-lng>
//!   linksight-cli demo [--holes <n>] [--seed <n>]
//!
//! This tool runs fix streams through the enrichment pipeline with
//! verbose output, helping to understand how holes, zones and shots are
//! being derived.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use linksight::engine::{LocationEngine, StaticCourseProvider};
use linksight::synthetic::{
    generate_course, generate_round, RoundScenarioConfig, SyntheticCourseConfig,
};
use linksight::{Coordinate, CourseGeometry, Enrichment, LocationFix};

#[derive(Parser)]
#[command(name = "linksight-cli")]
#[command(about = "Debug tool for course-relative positioning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a fix stream through the enrichment pipeline
    Replay {
        /// JSON file holding one CourseGeometry
        course: PathBuf,

        /// JSON file holding an array of LocationFix records
        fixes: PathBuf,
    },

    /// Distance, club and bearing from one point to another
    Target {
        from_lat: f64,
        from_lng: f64,
        to_lat: f64,
        to_lng: f64,
    },

    /// Walk a synthetic round and compare detected vs expected shots
    Demo {
        /// Number of holes on the synthetic course
        #[arg(long, default_value = "18")]
        holes: u32,

        /// RNG seed for the fix stream
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { course, fixes } => run_replay(&course, &fixes, cli.verbose),
        Commands::Target {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => run_target(from_lat, from_lng, to_lat, to_lng),
        Commands::Demo { holes, seed } => run_demo(holes, seed, cli.verbose),
    }
}

fn load_course(path: &PathBuf) -> Option<CourseGeometry> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(course) => Some(course),
        Err(e) => {
            eprintln!("Invalid course JSON in {}: {}", path.display(), e);
            None
        }
    }
}

fn load_fixes(path: &PathBuf) -> Option<Vec<LocationFix>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(fixes) => Some(fixes),
        Err(e) => {
            eprintln!("Invalid fixes JSON in {}: {}", path.display(), e);
            None
        }
    }
}

fn run_replay(course_path: &PathBuf, fixes_path: &PathBuf, verbose: bool) -> ExitCode {
    let course = match load_course(course_path) {
        Some(course) => course,
        None => return ExitCode::FAILURE,
    };
    let fixes = match load_fixes(fixes_path) {
        Some(fixes) => fixes,
        None => return ExitCode::FAILURE,
    };

    println!("\n{}", "=".repeat(60));
    println!(
        "Replaying {} fixes over '{}' ({} holes)",
        fixes.len(),
        course.name,
        course.holes.len()
    );
    println!("{}", "=".repeat(60));

    let mut provider = StaticCourseProvider::new();
    provider.insert(course);
    let mut engine = LocationEngine::new(Box::new(provider));

    replay(&mut engine, fixes, verbose);
    ExitCode::SUCCESS
}

fn run_target(from_lat: f64, from_lng: f64, to_lat: f64, to_lng: f64) -> ExitCode {
    let from = Coordinate::new(from_lat, from_lng);
    let target = Coordinate::new(to_lat, to_lng);
    match linksight::target_advice(&from, &target) {
        Ok(advice) => {
            println!("Distance: {:.1} m ({:.1} yd)", advice.distance_meters, advice.distance_yards);
            println!("Bearing:  {:.1} deg ({})", advice.bearing_degrees, advice.compass);
            println!("Club:     {}", advice.recommended_club);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cannot compute target advice: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_demo(holes: u32, seed: u64, verbose: bool) -> ExitCode {
    let course_config = SyntheticCourseConfig {
        hole_count: holes,
        ..SyntheticCourseConfig::default()
    };
    let course = generate_course("demo-links", &course_config);
    let round_config = RoundScenarioConfig {
        seed,
        ..RoundScenarioConfig::default()
    };
    let round = generate_round(&course, &round_config);

    println!("\n{}", "=".repeat(60));
    println!(
        "Demo: {} holes, {} fixes, expecting {} shots",
        holes,
        round.fixes.len(),
        round.expected_shots
    );
    println!("{}", "=".repeat(60));

    let mut provider = StaticCourseProvider::new();
    provider.insert(course);
    let mut engine = LocationEngine::new(Box::new(provider));

    let detected = replay(&mut engine, round.fixes, verbose);
    println!(
        "\nDetected {} shots (expected {})",
        detected, round.expected_shots
    );
    if detected == round.expected_shots {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run fixes through the engine, printing enriched rows and shot events.
/// Returns the number of shots detected.
fn replay(engine: &mut LocationEngine, fixes: Vec<LocationFix>, verbose: bool) -> usize {
    let mut shots = 0usize;
    for fix in fixes {
        match engine.enrich(fix) {
            Ok(Enrichment { location, shot }) => {
                if verbose {
                    println!(
                        "  {} hole={} zone={} tee={} pin={} in_course={}",
                        location.fix.timestamp_ms,
                        location
                            .current_hole
                            .map_or("-".to_string(), |h| h.to_string()),
                        location.position_on_hole,
                        location
                            .distance_to_tee_meters
                            .map_or("-".to_string(), |d| format!("{:.0}m", d)),
                        location
                            .distance_to_pin_meters
                            .map_or("-".to_string(), |d| format!("{:.0}m", d)),
                        location.within_course_boundary,
                    );
                }
                if let Some(shot) = shot {
                    shots += 1;
                    println!(
                        "SHOT #{:<3} hole {:<2} {:.1} m at {}",
                        shots,
                        shot.hole_number
                            .map_or("-".to_string(), |h| h.to_string()),
                        shot.distance_meters,
                        shot.timestamp_ms
                    );
                }
            }
            Err(e) => println!("REJECTED: {}", e),
        }
    }

    let stats = engine.stats();
    println!("\n{}", "-".repeat(60));
    println!(
        "courses cached: {}  rounds tracked: {}  records: {}  shots: {}",
        stats.cached_courses, stats.tracked_rounds, stats.history_len, stats.shots_emitted
    );
    shots
}
