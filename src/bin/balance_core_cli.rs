use std::process;

fn main() {
    balance_core::init();

    if let Err(err) = balance_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
