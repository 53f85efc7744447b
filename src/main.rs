fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = drugviz_lib::run() {
        eprintln!("drugviz: {e}");
        std::process::exit(1);
    }
}
