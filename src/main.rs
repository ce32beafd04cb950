use std::io;
use std::path::PathBuf;

use log::{error, info};

use generate_conf::{generate, FileSink, GenerateOptions, PreviewSink};
use validate::BatchPolicy;

mod generate_conf;
mod inventory;
mod prefix;
mod render;
mod types;
mod validate;

const APP_NAME: &str = "netcfg";

fn main() {
    let app = clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about("Generate network device configurations from a YAML inventory")
        .arg(
            clap::Arg::new("INVENTORY")
                .long("inventory")
                .default_value("routers.yaml")
                .help("Path to the YAML device inventory file"),
        )
        .arg(
            clap::Arg::new("OUTPUT-DIR")
                .long("output-dir")
                .default_value("output")
                .help("Directory where generated .cfg files will be saved"),
        )
        .arg(
            clap::Arg::new("TEMPLATES-DIR")
                .long("templates-dir")
                .default_value("templates")
                .help("Directory containing the vendor templates"),
        )
        .arg(
            clap::Arg::new("DRY-RUN")
                .long("dry-run")
                .action(clap::ArgAction::SetTrue)
                .help("Print generated configs to stdout without writing files"),
        )
        .arg(
            clap::Arg::new("DEVICE")
                .long("device")
                .help("Only generate config for the device with this hostname"),
        )
        .arg(
            clap::Arg::new("ALL-ERRORS")
                .long("all-errors")
                .action(clap::ArgAction::SetTrue)
                .help("Report every invalid inventory record instead of stopping at the first"),
        )
        .arg(
            clap::Arg::new("VERBOSE")
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enables DEBUG log level"),
        );

    let matches = app.get_matches();

    setup_logger(&matches);

    let inventory = matches
        .get_one::<String>("INVENTORY")
        .expect("--inventory has a default");
    let output_dir = matches
        .get_one::<String>("OUTPUT-DIR")
        .expect("--output-dir has a default");
    let templates_dir = matches
        .get_one::<String>("TEMPLATES-DIR")
        .expect("--templates-dir has a default");
    let dry_run = matches.get_flag("DRY-RUN");

    let options = GenerateOptions {
        inventory: PathBuf::from(inventory),
        templates_dir: PathBuf::from(templates_dir),
        device: matches.get_one::<String>("DEVICE").cloned(),
        policy: if matches.get_flag("ALL-ERRORS") {
            BatchPolicy::CollectAll
        } else {
            BatchPolicy::FailFast
        },
    };

    let result = if dry_run {
        generate(&options, &mut PreviewSink::new(io::stdout().lock()))
    } else {
        generate(&options, &mut FileSink::new(output_dir))
    };

    match result {
        Ok(generated) if dry_run => {
            info!("Dry-run complete. {generated} config(s) rendered.");
        }
        Ok(generated) => {
            info!("Done. {generated} config(s) saved to '{output_dir}'.");
        }
        Err(err) => {
            error!("Generating configs failed: {err:#}");
            std::process::exit(1)
        }
    }
}

fn setup_logger(matches: &clap::ArgMatches) {
    let mut log_builder = env_logger::Builder::new();
    if matches.get_flag("VERBOSE") {
        log_builder.filter(None, log::LevelFilter::Debug);
    } else {
        log_builder.filter(None, log::LevelFilter::Info);
    }
    log_builder.init();
}
