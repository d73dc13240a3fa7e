fn main() {
    if let Err(e) = classpeek_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
