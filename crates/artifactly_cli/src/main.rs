//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `artifactly_core` linkage.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `artifactly [radius unit]`. With arguments, prints the radius
//! converted to meters; an unknown unit falls back to the raw radius.

use artifactly_core::db::migrations::latest_version;
use artifactly_core::geo::units::to_meters_from_label;
use artifactly_core::{to_meters, Preferences};

fn main() {
    println!("artifactly_core ping={}", artifactly_core::ping());
    println!("artifactly_core version={}", artifactly_core::core_version());
    println!("artifactly_core schema_version={}", latest_version());

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let radius_m = match args.as_slice() {
        [radius, unit] => match radius.parse::<u32>() {
            Ok(radius) => to_meters_from_label(radius, unit),
            Err(_) => {
                eprintln!("radius must be a non-negative integer, got `{radius}`");
                std::process::exit(2);
            }
        },
        _ => {
            let prefs = Preferences::default();
            to_meters(prefs.radius(), prefs.radius_unit())
        }
    };
    println!("artifactly_core radius_m={radius_m}");
}
