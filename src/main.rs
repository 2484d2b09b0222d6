fn main() {
    if let Err(err) = dynamic_filter::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
