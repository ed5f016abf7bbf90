use chrono::NaiveTime;
use colored::*;

use slotgrid::config::Config;
use slotgrid::domain::models::availability::SlotPatch;
use slotgrid::domain::models::region::Region;
use slotgrid::domain::models::time_block::{DayType, TimeBlock};
use slotgrid::domain::services::reconciliation::ReconciliationEngine;
use slotgrid::domain::services::renames::SlotRenameTable;
use slotgrid::infra::factory::bootstrap_state;

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("valid hour")
}

/// Rehearses a catalog redesign against a seeded in-memory window and
/// prints what reconciliation would carry over, backfill and drop, so a
/// rename-table change can be sanity-checked before it ships.
#[tokio::main]
async fn main() {
    let _guard = slotgrid::init_logging();
    println!("{}", "Slot catalog migration dry-run".bold().green());

    let config = Config::from_env();
    let state = bootstrap_state(&config);
    let blocks = state.time_block_repo.clone();
    let regions = state.region_repo.clone();
    let availability = state.availability_repo.clone();

    // Pre-redesign catalog: day-part ids, two regions.
    for (id, hour, day_type) in [
        ("morning", 10, DayType::Weekday),
        ("afternoon", 14, DayType::Weekday),
        ("weekend-morning", 11, DayType::Weekend),
    ] {
        blocks
            .upsert(&TimeBlock::new(id, at(hour), id, day_type))
            .await
            .expect("seed catalog");
    }
    regions
        .upsert(&Region::new("east", "East", "#2563eb"))
        .await
        .expect("seed registry");
    regions
        .upsert(&Region::new("west", "West", "#dc2626"))
        .await
        .expect("seed registry");

    let engine = ReconciliationEngine::new(&state, SlotRenameTable::catalog_redesign_v1());
    let seeded = engine
        .initialize(config.window_days)
        .await
        .expect("initialize window");
    println!(
        "Seeded {} day(s), window of {} from {}",
        seeded.created.len().to_string().cyan(),
        config.window_days,
        config.local_today()
    );

    // Live state that the migration must not lose, on the next weekday.
    let mut busy_date = config.local_today();
    while DayType::of(busy_date) != DayType::Weekday {
        busy_date += chrono::Duration::days(1);
    }
    availability
        .set_slot(busy_date, "morning", "east", SlotPatch { available: Some(false), booked: Some(2), ..Default::default() })
        .await
        .expect("mark booked slot");
    println!("Marked morning/east on {} as closed with 2 bookings", busy_date);

    // The redesign under rehearsal: rename morning, drop afternoon and
    // the west region, grow a new evening block.
    blocks.remove("morning").await.expect("retire block");
    blocks
        .upsert(&TimeBlock::new("wd-morning", at(10), "Morning 10:00", DayType::Weekday))
        .await
        .expect("renamed block");
    blocks.remove("afternoon").await.expect("retire block");
    blocks
        .upsert(&TimeBlock::new("wd-evening", at(18), "Evening 18:00", DayType::Weekday))
        .await
        .expect("new block");
    regions.remove("west").await.expect("retire region");

    let report = match engine.reconcile(config.window_days).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", "Reconciliation failed:".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!("\n{}", "Reconciliation report".bold());
    println!(
        "  rebuilt {}, unchanged {}, skipped {}",
        report.reconciled.len().to_string().green(),
        report.unchanged.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  {} {} ({})", "skipped".yellow(), skipped.date, skipped.reason);
    }
    if report.dropped.is_empty() {
        println!("  {}", "no slots dropped".green());
    } else {
        println!("  {} slot(s) dropped:", report.dropped.len().to_string().red());
        for dropped in &report.dropped {
            println!(
                "    {} {}/{} on {}",
                "-".red(),
                dropped.time_block_id,
                dropped.region_id,
                dropped.date
            );
        }
    }

    let migrated = availability
        .get(busy_date)
        .await
        .expect("read back")
        .expect("record still present");
    match migrated.slot("wd-morning", "east") {
        Some(slot) => println!(
            "\nCarried over wd-morning/east on {}: available={} booked={} capacity={}",
            busy_date, slot.available, slot.booked, slot.capacity
        ),
        None => println!("{}", "\nwd-morning/east missing after migration!".red().bold()),
    }
}
