use anyhow::Context;
use tracing::info;

use volunteer_shifts::{display, parser, schedule, store, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string()); // Default password, change this!

        println!("Starting web server on port {}...", port);
        println!("Sign-up page at http://localhost:{}", port);
        println!("Admin page at http://localhost:{}/admin", port);

        web::start_server(port, password).await?;
        return Ok(());
    }

    // CLI mode: generate rosters for every shift in the definition sheet
    let csv_path = args.get(1).map(String::as_str).unwrap_or("data/shifts.csv");

    println!("Loading shift definitions from CSV...");
    let mut shifts = parser::load_shifts(csv_path)
        .with_context(|| format!("loading shifts from {csv_path}"))?;
    println!("Loaded {} shift definition(s)", shifts.len());

    let mut staged = store::PendingChanges::new();
    for task in &mut shifts {
        let report = schedule::initialise(task, &mut staged);
        display::print_report(task, &report);

        let filename = format!("roster_{}.txt", task.name.to_lowercase().replace(' ', "_"));
        display::write_roster_to_file(task, &filename)?;
        println!("Roster saved to {}", filename);
    }
    info!(
        inserts = staged.inserts.len(),
        removes = staged.removes.len(),
        "staged slot changes"
    );

    Ok(())
}
