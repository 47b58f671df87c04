use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Describes a single buildable and deployable unit of an application.
///
/// A Component is built from exactly one source: either a Git repository which the platform
/// builds into a container image, or a prebuilt container image which is deployed as-is.
/// Components are grouped into applications via their `application` field, and the platform
/// writes the generated deployment manifests into a GitOps repository recorded in the status.
#[derive(CustomResource, Serialize, Deserialize, Default, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "appforge.io",
    version = "v1alpha1",
    kind = "Component",
    namespaced,
    status = "ComponentStatus",
    plural = "components"
)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// The name of the component. Must be unique within the application.
    pub component_name: String,

    /// The name of the application the component is part of.
    pub application: String,

    /// The source the component is built from. Mutually exclusive with `containerImage`.
    #[serde(default)]
    pub source: ComponentSource,

    /// A prebuilt container image to deploy instead of building one from source.
    pub container_image: Option<String>,

    /// The name of a Secret holding credentials to access the source repository.
    pub secret: Option<String>,

    /// The number of replicas to deploy. Defaults to one replica.
    pub replicas: Option<i32>,

    /// The port the component listens on.
    pub target_port: Option<i32>,

    /// The hostname to expose the component on. A hostname is generated when left unset.
    pub route: Option<String>,
}

impl ComponentSpec {
    /// Returns the Git source of the component, if one is set.
    ///
    /// A Git source without a URL carries no usable information, so it is treated as if no
    /// Git source was set at all.
    pub fn git_source(&self) -> Option<&GitSource> {
        self.source.git.as_ref().filter(|git| !git.url.is_empty())
    }

    /// Returns true if the component deploys a prebuilt container image.
    pub fn has_container_image(&self) -> bool {
        self.container_image
            .as_deref()
            .is_some_and(|image| !image.is_empty())
    }
}

/// The source a component is built from.
///
/// Currently only Git repositories are supported.
#[derive(Serialize, Deserialize, Default, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSource {
    /// A Git repository holding the component sources.
    pub git: Option<GitSource>,
}

/// A Git repository holding the sources of a component.
#[derive(Serialize, Deserialize, Default, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    /// The URL of the repository, e.g. `https://github.com/example/component`.
    pub url: String,

    /// The branch, tag or commit to build. Defaults to the default branch of the repository.
    pub revision: Option<String>,

    /// The directory within the repository holding the component. Defaults to the repository
    /// root.
    pub context: Option<String>,

    /// A URL to a devfile describing how to build the component. Takes precedence over any
    /// devfile found in the repository.
    pub devfile_url: Option<String>,

    /// A URL to a Dockerfile to build the component with. Takes precedence over any devfile.
    pub dockerfile_url: Option<String>,
}

/// The most recently observed state of a component.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    /// The container image the last successful build produced.
    pub container_image: Option<String>,

    /// The devfile the last build was run with.
    pub devfile: Option<String>,

    /// The GitOps repository the deployment manifests of the component are written to.
    pub git_ops: Option<GitOpsStatus>,
}

/// Describes where the generated deployment manifests of a component live.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitOpsStatus {
    /// The URL of the GitOps repository.
    pub repository_url: Option<String>,

    /// The branch the manifests are committed to.
    pub branch: Option<String>,

    /// The directory within the GitOps repository the manifests are written to.
    pub context: Option<String>,
}

#[cfg(test)]
mod tests {
    use kube::CustomResourceExt;
    use rstest::rstest;

    use super::*;

    #[test]
    fn crd_identity() {
        let crd = Component::crd();

        assert_eq!(crd.metadata.name.as_deref(), Some("components.appforge.io"));
        assert_eq!(crd.spec.group, "appforge.io");
        assert_eq!(crd.spec.names.kind, "Component");
        assert_eq!(crd.spec.names.plural, "components");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.versions.len(), 1);
        assert_eq!(crd.spec.versions[0].name, "v1alpha1");
    }

    #[test]
    fn deserialize_git_component() {
        let component = serde_yaml::from_str::<Component>(
            "
apiVersion: appforge.io/v1alpha1
kind: Component
metadata:
  name: billing-service
  namespace: demo
spec:
  componentName: billing-service
  application: demo-app
  source:
    git:
      url: https://github.com/example/billing-service
      revision: main
      context: services/billing
",
        )
        .unwrap();

        assert_eq!(component.spec.component_name, "billing-service");
        assert_eq!(component.spec.application, "demo-app");
        assert!(!component.spec.has_container_image());

        let git = component.spec.git_source().unwrap();
        assert_eq!(git.url, "https://github.com/example/billing-service");
        assert_eq!(git.revision.as_deref(), Some("main"));
        assert_eq!(git.context.as_deref(), Some("services/billing"));
    }

    #[test]
    fn deserialize_image_component() {
        let component = serde_yaml::from_str::<Component>(
            "
apiVersion: appforge.io/v1alpha1
kind: Component
metadata:
  name: billing-service
spec:
  componentName: billing-service
  application: demo-app
  containerImage: quay.io/example/billing-service:1.2.3
  replicas: 2
  targetPort: 8080
",
        )
        .unwrap();

        assert_eq!(component.spec.git_source(), None);
        assert!(component.spec.has_container_image());
        assert_eq!(component.spec.replicas, Some(2));
        assert_eq!(component.spec.target_port, Some(8080));
    }

    #[rstest]
    #[case::no_source(None, None)]
    #[case::empty_url(Some(""), None)]
    #[case::url(Some("https://github.com/example/component"), Some("https://github.com/example/component"))]
    fn git_source_requires_url(#[case] url: Option<&str>, #[case] expected: Option<&str>) {
        let spec = ComponentSpec {
            source: ComponentSource {
                git: url.map(|url| GitSource {
                    url: url.to_owned(),
                    ..GitSource::default()
                }),
            },
            ..ComponentSpec::default()
        };

        assert_eq!(spec.git_source().map(|git| git.url.as_str()), expected);
    }

    #[rstest]
    #[case::unset(None, false)]
    #[case::empty(Some(""), false)]
    #[case::image(Some("quay.io/example/component:latest"), true)]
    fn container_image_requires_value(#[case] image: Option<&str>, #[case] expected: bool) {
        let spec = ComponentSpec {
            container_image: image.map(str::to_owned),
            ..ComponentSpec::default()
        };

        assert_eq!(spec.has_container_image(), expected);
    }
}
