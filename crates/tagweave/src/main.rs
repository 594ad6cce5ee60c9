mod cli;
mod commands;
mod context;
mod logging;
mod output;
mod snapshot;

use clap::Parser;
use cli::{Cli, Commands};
use context::Options;

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let options = Options {
        config: cli.config,
        assets: cli.assets,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Render {
            template,
            data,
            record,
        } => commands::render::run(&template, &data, record, &options),
        Commands::Loop {
            item,
            data,
            rows,
            header,
            footer,
            record,
        } => commands::loop_items::run(
            commands::loop_items::LoopArgs {
                item,
                rows,
                header,
                footer,
            },
            &data,
            record,
            &options,
        ),
        Commands::Check {
            condition,
            data,
            record,
        } => commands::check::run(&condition, &data, record, &options),
        Commands::Fields { data, record, json } => {
            commands::fields::run(&data, record, json, &options)
        }
        Commands::Filters { json } => commands::filters::run(json, &options),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
