use std::env;
use std::process;
use std::thread;
use std::time::Duration as STDDuration;

use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use oekorps::session_storage::SessionStorage;

mod settings;
use settings::AppSettings;

mod rest_api;
use rest_api::APIStorage;

fn main() {
    let args: Vec<String> = env::args().collect();
    let path_to_config = match args.len() {
        2 => args[1].as_str(),
        _ => {
            println!("Args should contain exactly one string: path to TOML configuration file. Setting to default './data/conf.toml'");
            "./data/conf.toml"
        }
    };
    let app_settings = match AppSettings::new(path_to_config) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Can't prepare settings due the error: {}", err);
            process::exit(1);
        }
    };

    let default_level = if app_settings.is_debug() { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_str())))
        .init();

    info!("Settings are:\n\t{}", app_settings);

    let blend_policy = match app_settings.calculation.get_blend_policy() {
        Ok(policy) => policy,
        Err(err) => {
            error!("Can't select electricity blend policy due the error: {}", err);
            process::exit(1);
        }
    };

    info!("Press `Ctrl-C` to stop main programm");
    ctrlc::set_handler(move || {
        info!("Ctrl+C has been pressed! Exit in 2 seconds");
        thread::sleep(STDDuration::from_secs(2));
        process::exit(1);
    }).expect("Error setting `Ctrl-C` handler");

    /* Start idle sessions sweeper */
    let sessions = SessionStorage::new(app_settings.worker.session_ttl_seconds, app_settings.sessions.max_sessions);
    sessions.start_sweeper_thread(app_settings.worker.sweep_interval_milliseconds);

    let storage = APIStorage {
        sessions,
        app_settings,
        blend_policy,
    };
    match rest_api::start_rest_api(storage) {
        Ok(_) => {},
        Err(err) => {
            error!("Can't start API due the error: {:?}", err);
            process::exit(1);
        }
    }
}
