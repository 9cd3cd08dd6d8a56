use packline::core::config::hhmmss;
use packline::{LineConfig, RunReport, Simulation};
use std::error::Error;

fn write_reports(config: &LineConfig, report: &RunReport) -> Result<(), Box<dyn Error>> {
    let mut pallets = csv::Writer::from_path("pallet_events.csv")?;
    pallets.write_record(["pallet_seq", "time_sec_from_midnight", "clock_time", "complete"])?;
    for record in &report.completions {
        pallets.write_record([
            record.sequence.to_string(),
            format!("{:.0}", record.time),
            hhmmss(record.time),
            record.complete.to_string(),
        ])?;
    }
    pallets.flush()?;

    let mut summary = csv::Writer::from_path("sim_summary.csv")?;
    let rows = [
        ("cases_out", report.cases_out.to_string()),
        ("pallets_out", report.pallets_out.to_string()),
        ("cases_per_pallet", config.cases_per_pallet.to_string()),
        ("buffers", format!("{:?}", config.link_capacities)),
        ("seed", config.seed.to_string()),
    ];
    for (key, value) in &rows {
        summary.write_record([*key, value.as_str()])?;
    }
    summary.flush()?;

    let mut log = csv::Writer::from_path("line_log.csv")?;
    log.write_record([
        "event",
        "time_sec",
        "clock",
        "in_pallet_cases",
        "pallet_size",
        "projected_pallet",
    ])?;
    let optional = |v: Option<u64>| v.map(|x| x.to_string()).unwrap_or_default();
    for record in &report.pause_log {
        log.write_record([
            record.label.clone(),
            format!("{:.0}", record.time),
            hhmmss(record.time),
            optional(record.in_pallet_cases),
            optional(record.pallet_size),
            optional(record.projected_pallet),
        ])?;
    }
    log.flush()?;
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = LineConfig::default();
    let mut simulation = Simulation::from_config(&config)?;
    let report = simulation.run()?;

    println!(
        "cases_out={} pallets_out={} (pallet size {})",
        report.cases_out, report.pallets_out, config.cases_per_pallet
    );
    write_reports(&config, &report)?;
    println!("wrote pallet_events.csv, sim_summary.csv, line_log.csv");
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        eprintln!("packline: {error}");
        std::process::exit(1);
    }
}
