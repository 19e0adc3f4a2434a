fn main() {
    if let Err(err) = graphit::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
