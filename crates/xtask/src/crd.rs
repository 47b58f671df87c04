use std::path::{Path, PathBuf};

use appforge_crds::{
    component::Component,
    yaml::{self, CustomResourceExt},
};
use snafu::{OptionExt, ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to get manifest directory"))]
    GetManifestDirectory { source: std::env::VarError },

    #[snafu(display("failed to get parent directory of {path}", path = path.display()))]
    GetParentDirectory { path: PathBuf },

    #[snafu(display("failed to create CRD directory at {path}", path = path.display()))]
    CreateCrdDirectory {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to write CRD to file at {path}", path = path.display()))]
    WriteCrd { source: yaml::Error, path: PathBuf },
}

/// Writes the CRD manifests into the `crds` directory of the appforge-crds
/// crate, so schema changes show up in review diffs.
pub fn generate_preview() -> Result<(), Error> {
    let path = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .context(GetManifestDirectorySnafu)?;

    let path = path
        .parent()
        .with_context(|| GetParentDirectorySnafu { path: path.clone() })?
        .join("appforge-crds/crds");

    std::fs::create_dir_all(&path)
        .with_context(|_| CreateCrdDirectorySnafu { path: path.clone() })?;

    write_crd::<Component>(&path, "Component")
}

fn write_crd<C>(base_path: &Path, crd_name: &str) -> Result<(), Error>
where
    C: CustomResourceExt,
{
    let mut path = base_path.join(crd_name);
    path.set_extension("yaml");

    C::write_yaml_schema(&path).with_context(|_| WriteCrdSnafu { path: path.clone() })
}
