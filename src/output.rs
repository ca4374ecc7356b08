//! Terminal rendering of query results, itineraries, and map summaries.

use crate::map::MapView;
use crate::query::{QueryOutcome, QueryResult, VehicleClass};
use crate::solver::SolverHealth;

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Example queries shown when trainvox is invoked with no command.
pub const EXAMPLE_QUERIES: &[&str] = &[
    "Je veux aller de Paris à Bordeaux",
    "Je veux aller de Lyon à Marseille",
    "Je veux aller de Toulouse à Bordeaux",
];

/// Format minutes as "2 h 35 min" / "45 min".
fn format_duration(minutes: f64) -> String {
    let total = minutes.round() as i64;
    let hours = total / 60;
    let mins = total % 60;
    if hours > 0 {
        format!("{} h {:02} min", hours, mins)
    } else {
        format!("{} min", mins)
    }
}

/// Render a query result.
///
/// `verbose` ≥ 1 adds confidence and solver model metadata.
pub fn print_result(result: &QueryResult, verbose: u8) {
    if !result.transcript.is_empty() {
        println!("{DIM}Your search{RESET}");
        println!("  «{}»", result.transcript);
    }

    if let (Some(origin), Some(destination)) = (&result.origin, &result.destination) {
        println!("  {BOLD}{}{RESET} → {BOLD}{}{RESET}", origin, destination);
    }

    if verbose >= 1 {
        println!("{DIM}confidence {:.2}{RESET}", result.confidence);
        if let Some(stt) = &result.stt {
            println!(
                "{DIM}stt: {} ({}) in {:.2}s{RESET}",
                stt.model, stt.language, stt.processing_time
            );
        }
        if let Some(nlp) = &result.nlp {
            println!(
                "{DIM}nlp: {} via {} — {} location(s){RESET}",
                nlp.model,
                nlp.extraction_method,
                nlp.locations_found.len()
            );
        }
    }

    match &result.outcome {
        QueryOutcome::Resolved(itinerary) => {
            println!();
            print_itinerary(itinerary);
        }
        QueryOutcome::Failed(message) => {
            println!();
            println!("{RED}{}{RESET}", message);
            println!("{DIM}Check your input and try again{RESET}");
        }
        QueryOutcome::Incomplete => {
            println!();
            if result.is_valid {
                println!("{YELLOW}Understood, but no itinerary was returned.{RESET}");
            } else {
                println!(
                    "{YELLOW}Could not extract both an origin and a destination.{RESET}"
                );
            }
        }
    }
}

/// Render the step list, per-segment details, and totals of an itinerary.
pub fn print_itinerary(itinerary: &crate::query::Itinerary) {
    let last = itinerary.steps.len().saturating_sub(1);
    for (index, step) in itinerary.steps.iter().enumerate() {
        let glyph = if index == 0 || index == last {
            "◉"
        } else {
            "○"
        };
        println!("  {glyph} {step}");

        if index < itinerary.segments.len() {
            let segment = &itinerary.segments[index];
            println!(
                "  {DIM}│   {} · {} · {:.0} km{RESET}",
                class_label(segment.vehicle_class),
                format_duration(segment.duration_min),
                segment.distance_km
            );
        } else if index < last {
            println!("  {DIM}│{RESET}");
        }
    }

    println!();
    let transfers = itinerary.steps.len().saturating_sub(2);
    println!(
        "  {BOLD}{}{RESET} · {:.0} km · {} transfer{}",
        format_duration(itinerary.total_time),
        itinerary.total_distance,
        transfers,
        if transfers == 1 { "" } else { "s" }
    );
}

/// Color a vehicle class label the way the map legend does.
fn class_label(class: VehicleClass) -> String {
    let color = match class {
        VehicleClass::Express => RED,
        VehicleClass::Budget => CYAN,
        VehicleClass::Intercity => "\x1b[35m",
        VehicleClass::Regional => YELLOW,
        VehicleClass::Other => DIM,
    };
    format!("{color}{class}{RESET}")
}

/// Render a one-paragraph summary of the map primitives.
pub fn print_map_summary(view: &MapView) {
    let terminals = view.markers.iter().filter(|m| m.terminal).count();
    println!(
        "{DIM}map: {} marker(s) ({} terminal), {} line(s){RESET}",
        view.markers.len(),
        terminals,
        view.lines.len()
    );

    match view.bounds {
        Some(bounds) => {
            let center = bounds.center();
            println!(
                "{DIM}view: ({:.4}, {:.4}) – ({:.4}, {:.4}), centered on ({:.4}, {:.4}){RESET}",
                bounds.min_lat,
                bounds.min_lon,
                bounds.max_lat,
                bounds.max_lon,
                center.lat,
                center.lon
            );
        }
        None => {
            println!("{DIM}view: nothing to fit{RESET}");
        }
    }
}

/// Render the solver health probe outcome.
pub fn print_health(health: &SolverHealth) {
    let state = |loaded: bool| {
        if loaded {
            format!("{GREEN}loaded{RESET}")
        } else {
            format!("{RED}not loaded{RESET}")
        }
    };

    if health.available {
        println!("{GREEN}solver is up{RESET}");
    } else {
        println!("{RED}solver is unavailable{RESET}");
    }
    println!("  stt:         {}", state(health.stt_loaded));
    println!("  nlp:         {}", state(health.nlp_loaded));
    println!("  pathfinding: {}", state(health.pathfinding_loaded));
}

/// Print the example queries for the bare invocation.
pub fn print_examples() {
    println!("Example searches:");
    for example in EXAMPLE_QUERIES {
        println!("  trainvox query \"{example}\"");
    }
    println!("  trainvox route Paris Lyon");
    println!("  trainvox listen");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_under_an_hour() {
        assert_eq!(format_duration(45.0), "45 min");
        assert_eq!(format_duration(0.4), "0 min");
    }

    #[test]
    fn format_duration_over_an_hour() {
        assert_eq!(format_duration(155.0), "2 h 35 min");
        assert_eq!(format_duration(60.0), "1 h 00 min");
    }

    #[test]
    fn format_duration_rounds_fractional_minutes() {
        assert_eq!(format_duration(89.6), "1 h 30 min");
    }

    #[test]
    fn class_label_embeds_class_name() {
        assert!(class_label(VehicleClass::Express).contains("Express"));
        assert!(class_label(VehicleClass::Other).contains("Other"));
    }

    #[test]
    fn example_queries_are_usable_as_text_queries() {
        for example in EXAMPLE_QUERIES {
            assert!(!example.trim().is_empty());
        }
    }
}
