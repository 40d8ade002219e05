use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;
use log::error;
use seat_reservations::config::AppConfig;
use seat_reservations::controller::{Controller, Outcome};
use seat_reservations::display::{format_holder, import_summary, render_reservations, render_seat_map};
use seat_reservations::store::{FileStorage, ReservationStore};
use seat_reservations::transfer::export_csv;
use seat_reservations::web;

const USAGE: &str = "usage: seat-reservations <command>
  web [port]                      serve the seat map on http://localhost:<port> (default 8080)
  slots                           list departures and how many seats are taken
  show <slot>                     print the seat map and reservations of a departure
  show <slot> <seat>              print who holds a seat
  reserve <slot> <seat> [name] [id]
  cancel <slot> <seat> [--yes]
  export [dir]                    write the raw reservation file (default: current dir)
  export-csv <file>               write every reservation as CSV
  import <file>                   merge reservations from an exported file
  reset [--yes]                   delete ALL reservations";

/// Asks on the terminal; anything but y/yes declines
fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).map(String::as_str);
    let assume_yes = args.iter().any(|a| a == "--yes");

    if arg(0) == Some("web") {
        let port = arg(1).and_then(|p| p.parse::<u16>().ok()).unwrap_or(8080);
        println!("Starting web server on port {}...", port);
        println!("Reservations stored in {}", config.data_dir.display());
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, config).await?;
        return Ok(());
    }

    let store = ReservationStore::with_key(FileStorage::new(&config.data_dir), config.storage_key.clone());
    let mut controller = Controller::new(store, &config);
    let mut confirm = |prompt: &str| assume_yes || ask(prompt);

    let result = match (arg(0), arg(1), arg(2)) {
        (Some("slots"), _, _) => {
            let capacity = controller.grid().seat_count();
            let stored = controller.store().slot_summaries();
            for slot in controller.slots() {
                let taken = stored.iter().find(|(s, _)| s == slot).map_or(0, |(_, n)| *n);
                println!("{}  {:>2}/{} taken", slot, taken, capacity);
            }
            for (slot, taken) in stored.iter().filter(|(s, _)| !controller.slots().contains(s)) {
                println!("{}  {:>2}/{} taken (not a scheduled departure)", slot, taken, capacity);
            }
            Ok(())
        }
        (Some("show"), Some(slot), Some(seat)) => {
            controller.select_slot(slot);
            controller.inspect(seat).map(|r| {
                println!("Seat {} at {}", r.seat, slot);
                println!("  Holder: {}", format_holder(&r.holder_name));
                println!("  ID:     {}", if r.holder_id.is_empty() { "-" } else { r.holder_id.as_str() });
                println!("  Since:  {}", r.created_at);
            })
        }
        (Some("show"), Some(slot), _) => {
            controller.select_slot(slot);
            print!("{}", render_seat_map(&controller.seat_map()));
            controller.reservations().map(|list| print!("\n{}", render_reservations(slot, &list)))
        }
        (Some("reserve"), Some(slot), Some(seat)) => {
            let name = arg(3).unwrap_or("");
            let id = arg(4).unwrap_or("");
            controller.select_slot(slot);
            controller
                .select_seat(seat)
                .and_then(|_| controller.reserve(name, id))
                .map(|r| println!("Reservation confirmed: {} at {}", r.seat, slot))
        }
        (Some("cancel"), Some(slot), Some(seat)) => {
            controller.select_slot(slot);
            controller.cancel(seat, &mut confirm).map(|outcome| match outcome {
                Outcome::Done => println!("Reservation cancelled."),
                Outcome::Declined => println!("Nothing changed."),
            })
        }
        (Some("export"), dir, _) => {
            let dir = Path::new(dir.unwrap_or("."));
            controller
                .export_to_dir(dir)
                .map(|path| println!("Exported to {}", path.display()))
        }
        (Some("export-csv"), Some(file), _) => {
            let out = File::create(file)?;
            export_csv(&controller.store().load(), out)?;
            println!("Reservations written to {}", file);
            Ok(())
        }
        (Some("import"), Some(file), _) => controller
            .import_file(Path::new(file))
            .map(|changes| println!("{}", import_summary(changes))),
        (Some("reset"), _, _) => controller.reset_all(&mut confirm).map(|outcome| match outcome {
            Outcome::Done => println!("All reservations deleted."),
            Outcome::Declined => println!("Nothing changed."),
        }),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
