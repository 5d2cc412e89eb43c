//! Command-line entry point: parse flags, load schemas, assemble output,
//! then write or print each generated file.

mod cli;
mod output;

use clap::CommandFactory;
use fieldgen_codegen::assemble;
use fieldgen_schema::TypeCatalog;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let matches = cli::Cli::command().get_matches();
    let specs = cli::requests(&matches)?;

    let locations: Vec<_> = specs
        .iter()
        .map(|spec| spec.request.location.clone())
        .collect();
    let catalog = TypeCatalog::load(&locations)?;

    let requests: Vec<_> = specs.iter().map(|spec| spec.request.clone()).collect();
    let results = assemble(&catalog, &requests)?;

    for (path, result) in &results {
        let rendered = output::render_file(result);
        // The first request targeting a path decides whether it is printed.
        let dry_run = specs
            .iter()
            .find(|spec| &spec.request.output.path == path)
            .is_some_and(|spec| spec.dry_run);
        if dry_run {
            println!("{rendered}");
        } else {
            output::write_file(path, &rendered)?;
            tracing::info!(path = %path.display(), "wrote generated file");
        }
    }

    Ok(())
}
