use drone_ops::agent::Coordinator;
use drone_ops::config::Config;
use drone_ops::domain::{Drone, DroneStatus, Mission, Pilot, PilotStatus, Priority, TagSet};
use drone_ops::store::{CsvStore, MemoryStore, RosterStore};
use drone_ops::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const USAGE: &str = "Use 'demo', 'ask <message>' or 'chat'.";
const ASK_USAGE: &str = "Usage: drone-ops ask <message>";

#[derive(Debug, PartialEq)]
enum Mode {
    Demo,
    Ask(String),
    Chat,
}

/// Mode from the command line; `Err` carries the usage line to print.
fn parse_mode(args: &[String]) -> std::result::Result<Mode, String> {
    match args.first().map(String::as_str).unwrap_or("demo") {
        "demo" => Ok(Mode::Demo),
        "ask" => match args[1..].join(" ").trim() {
            "" => Err(ASK_USAGE.to_string()),
            message => Ok(Mode::Ask(message.to_string())),
        },
        "chat" => Ok(Mode::Chat),
        other => Err(format!("Unknown mode: '{}'. {}", other, USAGE)),
    }
}

fn seed_pilots() -> Vec<Pilot> {
    vec![
        Pilot {
            pilot_id: "P001".into(),
            name: "Arjun".into(),
            skills: TagSet::parse("Mapping, Survey"),
            certifications: TagSet::parse("DGCA, Night Ops"),
            location: "Bangalore".into(),
            status: PilotStatus::Available,
            current_assignment: None,
        },
        Pilot {
            pilot_id: "P002".into(),
            name: "Neha".into(),
            skills: TagSet::parse("Inspection"),
            certifications: TagSet::parse("DGCA"),
            location: "Mumbai".into(),
            status: PilotStatus::Assigned,
            current_assignment: Some("PRJ001".into()),
        },
        Pilot {
            pilot_id: "P003".into(),
            name: "Rohit".into(),
            skills: TagSet::parse("Inspection, Mapping"),
            certifications: TagSet::parse("DGCA"),
            location: "Mumbai".into(),
            status: PilotStatus::Assigned,
            current_assignment: Some("PRJ003".into()),
        },
        Pilot {
            pilot_id: "P004".into(),
            name: "Sneha".into(),
            skills: TagSet::parse("Survey, Thermal"),
            certifications: TagSet::parse("DGCA, Night Ops"),
            location: "Bangalore".into(),
            status: PilotStatus::OnLeave,
            current_assignment: None,
        },
    ]
}

fn seed_drones() -> Vec<Drone> {
    vec![
        Drone {
            drone_id: "D001".into(),
            model: "DJI M300".into(),
            capabilities: TagSet::parse("LiDAR, RGB"),
            status: DroneStatus::Available,
            location: "Bangalore".into(),
            current_assignment: None,
            maintenance_due: "2026-03-01".into(),
        },
        Drone {
            drone_id: "D002".into(),
            model: "DJI Mavic 3".into(),
            capabilities: TagSet::parse("RGB"),
            status: DroneStatus::Maintenance,
            location: "Mumbai".into(),
            current_assignment: Some("PRJ001".into()),
            maintenance_due: "2026-02-01".into(),
        },
        Drone {
            drone_id: "D003".into(),
            model: "DJI Mavic 3T".into(),
            capabilities: TagSet::parse("Thermal, Inspection"),
            status: DroneStatus::Available,
            location: "Mumbai".into(),
            current_assignment: None,
            maintenance_due: "2026-04-15".into(),
        },
        Drone {
            drone_id: "D004".into(),
            model: "Autel EVO II".into(),
            capabilities: TagSet::parse("Thermal"),
            status: DroneStatus::Available,
            location: "Bangalore".into(),
            current_assignment: None,
            maintenance_due: "2026-02-20".into(),
        },
    ]
}

fn seed_missions() -> Vec<Mission> {
    let d = |day: u32| format!("2026-02-{:02}", day);
    vec![
        Mission {
            project_id: "PRJ001".into(),
            client: "Client A".into(),
            location: "Mumbai".into(),
            required_skills: TagSet::parse("Inspection"),
            required_certs: TagSet::parse("DGCA"),
            start_date: d(6),
            end_date: d(8),
            priority: Priority::Normal,
        },
        Mission {
            project_id: "PRJ002".into(),
            client: "Client B".into(),
            location: "Bangalore".into(),
            required_skills: TagSet::parse("Mapping"),
            required_certs: TagSet::parse("DGCA"),
            start_date: d(6),
            end_date: d(9),
            priority: Priority::Normal,
        },
        Mission {
            project_id: "PRJ003".into(),
            client: "Client C".into(),
            location: "Mumbai".into(),
            required_skills: TagSet::parse("Inspection"),
            required_certs: TagSet::parse("DGCA"),
            start_date: d(1),
            end_date: d(4),
            priority: Priority::Normal,
        },
        Mission {
            project_id: "PRJ004".into(),
            client: "Client D".into(),
            location: "Mumbai".into(),
            required_skills: TagSet::parse("Inspection"),
            required_certs: TagSet::parse("DGCA"),
            start_date: d(7),
            end_date: d(9),
            priority: Priority::Urgent,
        },
    ]
}

fn ask_and_print<S: RosterStore>(coordinator: &mut Coordinator<S>, message: &str) {
    println!("  [?] {}", message);
    match coordinator.respond(message) {
        Ok(reply) => {
            for line in reply.text.lines() {
                println!("      {}", line);
            }
        }
        Err(e) => println!("      [!!] {}", e),
    }
    println!();
}

fn run_demo() {
    println!();
    println!("=====================================================================");
    println!("  Drone Operations Coordinator -- Simulation Demo");
    println!("  Pilot & Drone Matching, Urgent Reassignment, Conflict Detection");
    println!("=====================================================================");

    let store = MemoryStore::new(seed_pilots(), seed_drones(), seed_missions());

    println!("\n--- Phase 1: Roster, Fleet and Missions ---\n");
    for p in &store.pilots {
        println!("  [+] {}", p);
    }
    for d in &store.drones {
        println!("  [+] {}", d);
    }
    for m in &store.missions {
        println!("  [+] {}", m);
    }

    let mut coordinator = Coordinator::new(store, Config::default());
    match coordinator.snapshot() {
        Ok(snap) => println!("\n  Stats: {}\n", snap.stats()),
        Err(e) => println!("\n  [!!] {}\n", e),
    }

    println!("--- Phase 2: Roster and Fleet Queries ---\n");
    ask_and_print(&mut coordinator, "Who is available in Bangalore?");
    ask_and_print(&mut coordinator, "Pilots with Night Ops certification");
    ask_and_print(&mut coordinator, "Drones available in Mumbai");

    println!("--- Phase 3: Assignment Suggestions ---\n");
    ask_and_print(&mut coordinator, "Suggest assignment for PRJ002");
    ask_and_print(&mut coordinator, "Suggest assignment for PRJ001");

    println!("--- Phase 4: Conflict Detection ---\n");
    ask_and_print(&mut coordinator, "Check conflicts");

    println!("--- Phase 5: Urgent Reassignment ---\n");
    ask_and_print(&mut coordinator, "Urgent reassignment for PRJ004");
    ask_and_print(
        &mut coordinator,
        "Confirm reassignment PRJ004 to P003 and D003",
    );
    ask_and_print(&mut coordinator, "Set drone D002 status to Available");

    println!("--- Phase 6: Final State ---\n");
    ask_and_print(&mut coordinator, "Check conflicts");
    match coordinator.snapshot() {
        Ok(snap) => println!("  Stats: {}", snap.stats()),
        Err(e) => println!("  [!!] {}", e),
    }
    println!("\n--- Simulation Complete ---\n");
}

fn csv_coordinator() -> Result<Coordinator<CsvStore>> {
    let config = Config::from_env()?;
    let store = CsvStore::new(config.data_dir.clone());
    info!(
        data_dir = %store.dir().display(),
        use_ledger = config.use_ledger,
        "Using CSV data"
    );
    Ok(Coordinator::new(store, config))
}

fn run_ask(message: &str) -> Result<()> {
    let mut coordinator = csv_coordinator()?;
    let reply = coordinator.respond(message)?;
    println!("{}", reply.text);
    Ok(())
}

async fn run_chat() -> Result<()> {
    let mut coordinator = csv_coordinator()?;

    println!("\n=====================================================================");
    println!("  Drone Operations Coordinator -- Chat");
    println!("  Type 'help' for examples, 'quit' to exit");
    println!("=====================================================================\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if matches!(message, "quit" | "exit") {
            break;
        }
        let reply = coordinator.respond(message)?;
        println!("{}\n", reply.text);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match parse_mode(&args) {
        Ok(Mode::Demo) => {
            run_demo();
            Ok(())
        }
        Ok(Mode::Ask(message)) => run_ask(&message),
        Ok(Mode::Chat) => run_chat().await,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(1);
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(args: &[&str]) -> std::result::Result<Mode, String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        parse_mode(&args)
    }

    #[test]
    fn ask_without_message_prints_ask_usage() {
        assert_eq!(mode(&["ask"]), Err(ASK_USAGE.to_string()));
        assert_eq!(mode(&["ask", " "]), Err(ASK_USAGE.to_string()));
        assert_eq!(
            mode(&["ask", "Check", "conflicts"]),
            Ok(Mode::Ask("Check conflicts".into()))
        );
    }

    #[test]
    fn defaults_to_demo_and_rejects_unknown_modes() {
        assert_eq!(mode(&[]), Ok(Mode::Demo));
        assert_eq!(mode(&["chat"]), Ok(Mode::Chat));
        let err = mode(&["serve"]).unwrap_err();
        assert!(err.starts_with("Unknown mode: 'serve'"));
    }
}
