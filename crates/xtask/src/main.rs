use clap::{Parser, Subcommand};
use snafu::{ResultExt, Snafu};

mod crd;

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to generate CRD previews"))]
    Crd { source: crd::Error },
}

/// Development tasks for the Appforge workspace.
#[derive(Debug, Parser)]
enum Command {
    /// Work with the custom resource definitions.
    #[command(subcommand)]
    Crd(CrdCommand),
}

#[derive(Debug, Subcommand)]
enum CrdCommand {
    /// Write the CRD manifests to crates/appforge-crds/crds.
    Preview,
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let command = Command::parse();

    match command {
        Command::Crd(crd_command) => match crd_command {
            CrdCommand::Preview => crd::generate_preview().context(CrdSnafu),
        },
    }
}
