use std::process;

use tmm::settings;
use tmm::sweep::Sweep;

fn main() {
    let settings = settings::load_config().unwrap_or_else(|e| {
        eprintln!("[ERROR] setup: {e:#}");
        process::exit(1);
    });

    let mut sweep = Sweep::new(settings);

    if let Err(e) = sweep.solve() {
        eprintln!("[ERROR] calculation: {e:#}");
        process::exit(1);
    }

    if let Err(e) = sweep.writeup() {
        eprintln!("[ERROR] output: {e:#}");
        process::exit(1);
    }
}
