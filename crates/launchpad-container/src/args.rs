//! Arguments for the container publish invocation.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const PUBLISH_COMMAND: &str = "publish";
const PUBLISH_PROFILE: &str = "DefaultContainer";
const DEFAULT_SINGLE_FILE: &str = "false";
const DEFAULT_TRIMMED: &str = "false";
const DEFAULT_SELF_CONTAINED: &str = "true";
const DEFAULT_OS: &str = "linux";
const DEFAULT_ARCH: &str = "x64";

pub const PUBLISH_SINGLE_FILE_PROPERTY: &str = "PublishSingleFile";
pub const PUBLISH_TRIMMED_PROPERTY: &str = "PublishTrimmed";
pub const DUPLICATE_OUTPUT_PROPERTY: &str = "ErrorOnDuplicatePublishOutputFiles";

/// Where and how a project image is pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub project_path: PathBuf,
    pub registry: String,
    pub repository: Option<String>,
    /// Passed as `ContainerImageName` when set. When `None` the SDK names the
    /// image after the project assembly; the `launchpad` binary always sets it.
    pub image_name: Option<String>,
    pub tag: String,
}

impl BuildTarget {
    /// Image reference the pushed container will be reachable at.
    ///
    /// ```
    /// use launchpad_container::BuildTarget;
    ///
    /// let target = BuildTarget {
    ///     project_path: "Api.csproj".into(),
    ///     registry: "myreg.io".to_owned(),
    ///     repository: Some("team".to_owned()),
    ///     image_name: None,
    ///     tag: "v1".to_owned(),
    /// };
    /// assert_eq!(target.image_reference("api"), "myreg.io/team/api:v1");
    /// ```
    pub fn image_reference(&self, default_name: &str) -> String {
        // arch-lint: allow(no-silent-result-drop) reason="unset or empty image name falls back to the caller's default name"
        let name = non_empty(self.image_name.as_deref()).unwrap_or(default_name);
        match non_empty(self.repository.as_deref()) {
            Some(repo) => format!("{}/{repo}/{name}:{}", self.registry, self.tag),
            None => format!("{}/{name}:{}", self.registry, self.tag),
        }
    }
}

/// Publish properties read from the project; unset values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PublishFlags {
    #[serde(rename = "PublishSingleFile", default)]
    pub single_file: Option<String>,
    #[serde(rename = "PublishTrimmed", default)]
    pub trimmed: Option<String>,
}

#[derive(Deserialize)]
struct PropertiesDocument {
    #[serde(rename = "Properties", default)]
    properties: PublishFlags,
}

impl PublishFlags {
    /// Parse the JSON printed by `msbuild -getProperty:A -getProperty:B`.
    /// Empty output yields all-default flags.
    pub fn from_properties_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str::<PropertiesDocument>(json).map(|doc| doc.properties)
    }

    fn single_file_or_default(&self) -> &str {
        // arch-lint: allow(no-silent-result-drop) reason="an unset msbuild property means the documented default"
        non_empty(self.single_file.as_deref()).unwrap_or(DEFAULT_SINGLE_FILE)
    }

    fn trimmed_or_default(&self) -> &str {
        // arch-lint: allow(no-silent-result-drop) reason="an unset msbuild property means the documented default"
        non_empty(self.trimmed.as_deref()).unwrap_or(DEFAULT_TRIMMED)
    }
}

/// Ordered argument list builder.
///
/// MSBuild properties render as one `-p:Name=value` token; switches render
/// as two tokens.
#[derive(Debug, Clone, Default)]
pub struct ArgumentsBuilder {
    args: Vec<String>,
}

impl ArgumentsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn switch(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn property(self, name: &str, value: &str) -> Self {
        self.arg(format!("-p:{name}={value}"))
    }

    /// Append the property only when `value` is present and non-empty.
    pub fn property_if_set(self, name: &str, value: Option<&str>) -> Self {
        match non_empty(value) {
            Some(value) => self.property(name, value),
            None => self,
        }
    }

    pub fn build(self) -> Vec<String> {
        self.args
    }
}

/// Compose the publish invocation for one project.
///
/// Order: target, profile, single-file, trimmed, self-contained, OS, arch,
/// registry, repository (if set), image name (if set), tag.
pub fn build_args(project_path: &Path, flags: &PublishFlags, target: &BuildTarget) -> Vec<String> {
    ArgumentsBuilder::new()
        .arg(PUBLISH_COMMAND)
        .arg(project_path.to_string_lossy())
        .property("PublishProfile", PUBLISH_PROFILE)
        .property(PUBLISH_SINGLE_FILE_PROPERTY, flags.single_file_or_default())
        .property(PUBLISH_TRIMMED_PROPERTY, flags.trimmed_or_default())
        .switch("--self-contained", DEFAULT_SELF_CONTAINED)
        .switch("--os", DEFAULT_OS)
        .switch("--arch", DEFAULT_ARCH)
        .property("ContainerRegistry", &target.registry)
        .property_if_set("ContainerRepository", target.repository.as_deref())
        .property_if_set("ContainerImageName", target.image_name.as_deref())
        .property("ContainerImageTag", &target.tag)
        .build()
}

/// `args` with duplicate publish output files allowed.
pub fn allow_duplicate_output(args: &[String]) -> Vec<String> {
    let mut args = args.to_vec();
    args.push(format!("-p:{DUPLICATE_OUTPUT_PROPERTY}=false"));
    args
}

/// Arguments for the project-property query.
pub(crate) fn property_query_args(project_path: &Path) -> Vec<String> {
    ArgumentsBuilder::new()
        .arg("msbuild")
        .arg(project_path.to_string_lossy())
        .arg(format!("-getProperty:{PUBLISH_SINGLE_FILE_PROPERTY}"))
        .arg(format!("-getProperty:{PUBLISH_TRIMMED_PROPERTY}"))
        .build()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> BuildTarget {
        BuildTarget {
            project_path: PathBuf::from("/src/Api/Api.csproj"),
            registry: "myreg.io".to_owned(),
            repository: None,
            image_name: None,
            tag: "v1".to_owned(),
        }
    }

    #[test]
    fn args_follow_fixed_order() {
        let mut target = target();
        target.repository = Some("team".to_owned());
        target.image_name = Some("api".to_owned());

        let args = build_args(&target.project_path, &PublishFlags::default(), &target);

        assert_eq!(
            args,
            vec![
                "publish",
                "/src/Api/Api.csproj",
                "-p:PublishProfile=DefaultContainer",
                "-p:PublishSingleFile=false",
                "-p:PublishTrimmed=false",
                "--self-contained",
                "true",
                "--os",
                "linux",
                "--arch",
                "x64",
                "-p:ContainerRegistry=myreg.io",
                "-p:ContainerRepository=team",
                "-p:ContainerImageName=api",
                "-p:ContainerImageTag=v1",
            ]
        );
    }

    #[test]
    fn unset_repository_and_image_name_are_omitted() {
        let target = target();
        let args = build_args(&target.project_path, &PublishFlags::default(), &target);

        assert!(!args.iter().any(|a| a.starts_with("-p:ContainerRepository")));
        assert!(!args.iter().any(|a| a.starts_with("-p:ContainerImageName")));
        assert_eq!(
            args.iter()
                .filter(|a| *a == "-p:ContainerRegistry=myreg.io")
                .count(),
            1
        );
        assert_eq!(
            args.iter()
                .filter(|a| *a == "-p:ContainerImageTag=v1")
                .count(),
            1
        );
    }

    #[test]
    fn empty_repository_counts_as_unset() {
        let mut target = target();
        target.repository = Some(String::new());
        let args = build_args(&target.project_path, &PublishFlags::default(), &target);
        assert!(!args.iter().any(|a| a.starts_with("-p:ContainerRepository")));
    }

    #[test]
    fn project_publish_flags_are_used() {
        let flags = PublishFlags {
            single_file: Some("true".to_owned()),
            trimmed: Some("true".to_owned()),
        };
        let target = target();
        let args = build_args(&target.project_path, &flags, &target);

        assert!(args.contains(&"-p:PublishSingleFile=true".to_owned()));
        assert!(args.contains(&"-p:PublishTrimmed=true".to_owned()));
    }

    #[test]
    fn properties_json_parses_msbuild_output() {
        let json = r#"{ "Properties": { "PublishSingleFile": "true", "PublishTrimmed": "" } }"#;
        let flags = PublishFlags::from_properties_json(json).unwrap();
        assert_eq!(flags.single_file.as_deref(), Some("true"));
        assert_eq!(flags.trimmed_or_default(), "false");
    }

    #[test]
    fn properties_json_empty_output_defaults() {
        assert_eq!(
            PublishFlags::from_properties_json("  \n").unwrap(),
            PublishFlags::default()
        );
        assert_eq!(
            PublishFlags::from_properties_json("{}").unwrap(),
            PublishFlags::default()
        );
    }

    #[test]
    fn properties_json_rejects_garbage() {
        assert!(PublishFlags::from_properties_json("MSBUILD : error").is_err());
    }

    #[test]
    fn allow_duplicate_output_appends_override_last() {
        let args = allow_duplicate_output(&["publish".to_owned()]);
        assert_eq!(
            args,
            vec!["publish", "-p:ErrorOnDuplicatePublishOutputFiles=false"]
        );
    }

    #[test]
    fn image_reference_without_repository() {
        let mut target = target();
        assert_eq!(target.image_reference("api"), "myreg.io/api:v1");
        target.image_name = Some("storefront".to_owned());
        assert_eq!(target.image_reference("api"), "myreg.io/storefront:v1");
    }

    #[test]
    fn property_query_requests_both_flags() {
        let args = property_query_args(Path::new("Api.csproj"));
        assert_eq!(
            args,
            vec![
                "msbuild",
                "Api.csproj",
                "-getProperty:PublishSingleFile",
                "-getProperty:PublishTrimmed",
            ]
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn optional_value() -> impl Strategy<Value = Option<String>> {
            proptest::option::of("[a-z0-9.-]{0,12}")
        }

        proptest! {
            #[test]
            fn registry_and_tag_appear_exactly_once(
                registry in "[a-z0-9.-]{1,20}",
                tag in "[a-zA-Z0-9._-]{1,16}",
                repository in optional_value(),
                image_name in optional_value(),
            ) {
                let target = BuildTarget {
                    project_path: PathBuf::from("App.csproj"),
                    registry: registry.clone(),
                    repository,
                    image_name,
                    tag: tag.clone(),
                };
                let args = build_args(&target.project_path, &PublishFlags::default(), &target);

                let registry_flag = format!("-p:ContainerRegistry={registry}");
                let tag_flag = format!("-p:ContainerImageTag={tag}");
                prop_assert_eq!(args.iter().filter(|a| **a == registry_flag).count(), 1);
                prop_assert_eq!(args.iter().filter(|a| **a == tag_flag).count(), 1);
                prop_assert_eq!(args.last(), Some(&tag_flag));
                prop_assert_eq!(args.first().map(String::as_str), Some("publish"));
            }

            #[test]
            fn repository_flag_present_iff_non_empty(
                repository in optional_value(),
            ) {
                let mut target = BuildTarget {
                    project_path: PathBuf::from("App.csproj"),
                    registry: "r.io".to_owned(),
                    repository: None,
                    image_name: None,
                    tag: "t".to_owned(),
                };
                target.repository = repository.clone();
                let args = build_args(&target.project_path, &PublishFlags::default(), &target);

                let has_flag = args.iter().any(|a| a.starts_with("-p:ContainerRepository="));
                let expected = repository.is_some_and(|r| !r.is_empty());
                prop_assert_eq!(has_flag, expected);
            }
        }
    }
}
