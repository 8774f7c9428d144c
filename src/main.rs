fn main() {
    if let Err(err) = bulkstream::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
