mod cli;
mod fields_cmd;
mod labels_cmd;
mod logging;
mod page_range;
mod schema_cmd;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        cli::Commands::Schema(ref args) => schema_cmd::run(args),
        cli::Commands::Fields {
            ref file,
            ref pages,
            ref format,
        } => fields_cmd::run(file, pages.as_deref(), format),
        cli::Commands::Labels {
            ref file,
            ref pages,
            max_distance,
            top_k,
        } => labels_cmd::run(file, pages.as_deref(), max_distance, top_k),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
