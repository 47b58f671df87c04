//! Defaulting and validation rules for [`Component`] objects.

use appforge_crds::component::Component;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use url::Url;

use crate::validation;

/// GitHub is currently the only supported git vendor for component sources.
pub const SUPPORTED_GIT_HOST: &str = "github.com";

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for rejected component admission requests.
///
/// The rendered messages are returned verbatim to API clients as the rejection
/// reason, with source messages appended along the chain.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("invalid component name {name:?}"))]
    InvalidDns1035Name {
        source: validation::Errors,
        name: String,
    },

    #[snafu(display("invalid git source URL {url:?}"))]
    InvalidSchemeGitSourceUrl {
        source: url::ParseError,
        url: String,
    },

    #[snafu(display(
        "unsupported git vendor {host:?} in git source URL {url:?}, only {supported:?} is supported",
        supported = SUPPORTED_GIT_HOST
    ))]
    InvalidGithubVendorUrl { url: String, host: String },

    #[snafu(display("a git source URL or a container image must be provided"))]
    MissingGitOrImageSource,

    #[snafu(display("the component name cannot be changed to {component_name:?} after creation"))]
    ComponentNameUpdate { component_name: String },

    #[snafu(display("the application name cannot be changed to {application:?} after creation"))]
    ApplicationNameUpdate { application: String },

    #[snafu(display("the git source cannot be changed to {url:?} after creation"))]
    GitSourceUpdate { url: String },

    /// Indicates that the previous object revision is missing or not a
    /// component. This only happens when the webhook is registered for a
    /// foreign resource type.
    #[snafu(display("the previous object revision is not a component"))]
    InvalidComponent,
}

/// Applies defaults to a component before it is persisted.
///
/// There are currently no defaults to apply, but the mutating webhook stays
/// registered so future defaults only require changes right here. Defaulting
/// must be idempotent and must not fail.
pub fn default(_component: &mut Component) {}

/// Validates a component that is about to be created.
///
/// A component must be named by a valid DNS-1035 label and must be built from
/// a source: either a git repository hosted on a supported vendor, or a
/// prebuilt container image.
pub fn validate_create(component: &Component) -> Result<()> {
    let name = component.metadata.name.as_deref().unwrap_or_default();

    // Component names flow into Service names and route hostnames, which
    // require DNS-1035 labels.
    validation::is_rfc_1035_label(name).context(InvalidDns1035NameSnafu { name })?;

    if let Some(git) = component.spec.git_source() {
        let url = Url::parse(&git.url).context(InvalidSchemeGitSourceUrlSnafu { url: &git.url })?;
        let host = url.host_str().unwrap_or_default();

        ensure!(
            host.eq_ignore_ascii_case(SUPPORTED_GIT_HOST),
            InvalidGithubVendorUrlSnafu {
                url: &git.url,
                host,
            }
        );
    } else {
        ensure!(
            component.spec.has_container_image(),
            MissingGitOrImageSourceSnafu
        );
    }

    Ok(())
}

/// Validates the transition between two revisions of a component.
///
/// The component name, the application name and the git source are write-once.
/// Everything else, e.g. the container image, replicas or ports, may change
/// freely. Switching the source type by removing or adding a git source is
/// allowed as well, only modifying an existing git source is rejected.
pub fn validate_update(component: &Component, old_component: Option<&Component>) -> Result<()> {
    // The API server always delivers the previous revision on UPDATE, so a
    // missing one means the webhook is registered for a foreign type.
    let old_component = old_component.context(InvalidComponentSnafu)?;

    ensure!(
        component.spec.component_name == old_component.spec.component_name,
        ComponentNameUpdateSnafu {
            component_name: &component.spec.component_name,
        }
    );

    ensure!(
        component.spec.application == old_component.spec.application,
        ApplicationNameUpdateSnafu {
            application: &component.spec.application,
        }
    );

    if let (Some(git), Some(old_git)) = (
        &component.spec.source.git,
        &old_component.spec.source.git,
    ) {
        ensure!(git == old_git, GitSourceUpdateSnafu { url: &git.url });
    }

    Ok(())
}

/// Validates a component that is about to be deleted. Deletions are always
/// allowed.
pub fn validate_delete(_component: &Component) -> Result<()> {
    Ok(())
}
