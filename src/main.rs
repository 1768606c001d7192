use convhist::FigureOptions;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = FigureOptions::default();
    match convhist::run(&options) {
        Ok(path) => log::info!("convergence history written to `{}`", path.display()),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    }
}
