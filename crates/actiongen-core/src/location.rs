//! Output location resolution.
//!
//! The output path names both where the source document goes and what it is
//! called: `MCServerLauncher.Daemon/Remote/Action/ActionTemplate.cs` yields the
//! namespace `MCServerLauncher.Daemon.Remote.Action` and the outer class
//! `ActionTemplate`. The enumeration document is written next to it.

use std::path::{Component, Path, PathBuf};

use crate::naming::{normalize, NamingConvention};
use crate::{Error, Result};

/// Default file name of the enumeration document
pub const DEFAULT_ENUM_FILE_NAME: &str = "ActionType.cs";

/// Identifiers and paths derived from the configured output path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    /// Namespace shared by both documents
    pub namespace: String,
    /// Name of the outer static class in the source document
    pub class_name: String,
    /// Name of the generated enum
    pub enum_name: String,
    /// Source document path, relative to the project root
    pub source_path: PathBuf,
    /// Enumeration document path, relative to the project root
    pub enum_path: PathBuf,
}

impl OutputLocation {
    /// Resolve an output path relative to `project_root`
    ///
    /// Absolute paths are accepted only when they lie under the project root.
    pub fn resolve(
        project_root: &Path,
        output_path: &Path,
        enum_file_name: &str,
    ) -> Result<Self> {
        let relative = if output_path.is_absolute() {
            strip_root(project_root, output_path).ok_or_else(|| {
                Error::config(format!(
                    "Output path {} is outside the project root {}",
                    output_path.display(),
                    project_root.display()
                ))
            })?
        } else {
            output_path.to_path_buf()
        };

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str().ok_or_else(|| {
                    Error::config(format!(
                        "Output path {} is not valid UTF-8",
                        output_path.display()
                    ))
                })?),
                Component::CurDir => {}
                _ => {
                    return Err(Error::config(format!(
                        "Output path {} must stay inside the project root",
                        output_path.display()
                    )));
                }
            }
        }

        let Some((file_name, dirs)) = segments.split_last() else {
            return Err(Error::config("Output path is empty"));
        };
        if dirs.is_empty() {
            return Err(Error::config(format!(
                "Output path {} needs a parent directory to derive a namespace from",
                output_path.display()
            )));
        }

        let class_name = normalize(file_stem(file_name), NamingConvention::Pascal);
        if class_name.is_empty() {
            return Err(Error::config(format!(
                "Output file {file_name} has no usable name"
            )));
        }

        let enum_name = normalize(file_stem(enum_file_name), NamingConvention::Pascal);
        if enum_name.is_empty() || enum_file_name.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "Invalid enumeration file name {enum_file_name}"
            )));
        }

        let dir: PathBuf = dirs.iter().collect();
        Ok(Self {
            namespace: dirs.join("."),
            class_name,
            enum_name,
            source_path: dir.join(file_name),
            enum_path: dir.join(enum_file_name),
        })
    }
}

fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
}

/// Strip the project root off an absolute path
///
/// A relative root is taken from the current directory first, so `.` works
/// for paths under the working directory.
pub fn strip_root(project_root: &Path, path: &Path) -> Option<PathBuf> {
    let root = std::path::absolute(project_root).ok()?;
    path.strip_prefix(&root).ok().map(Path::to_path_buf)
}

/// Render a relative path with `/` separators regardless of platform
pub fn display_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> Result<OutputLocation> {
        OutputLocation::resolve(Path::new("/work/project"), Path::new(path), DEFAULT_ENUM_FILE_NAME)
    }

    #[test]
    fn test_namespace_and_class_from_path() -> Result<()> {
        let location = resolve("MCServerLauncher.Daemon/Remote/Action/ActionTemplate.cs")?;
        assert_eq!(location.namespace, "MCServerLauncher.Daemon.Remote.Action");
        assert_eq!(location.class_name, "ActionTemplate");
        assert_eq!(location.enum_name, "ActionType");
        assert_eq!(
            location.source_path,
            PathBuf::from("MCServerLauncher.Daemon/Remote/Action/ActionTemplate.cs")
        );
        assert_eq!(
            location.enum_path,
            PathBuf::from("MCServerLauncher.Daemon/Remote/Action/ActionType.cs")
        );
        Ok(())
    }

    #[test]
    fn test_snake_case_stem_is_normalized() -> Result<()> {
        let location = resolve("./Daemon/action_template.cs")?;
        assert_eq!(location.namespace, "Daemon");
        assert_eq!(location.class_name, "ActionTemplate");
        Ok(())
    }

    #[test]
    fn test_absolute_path_under_root_is_relativized() -> Result<()> {
        let location = resolve("/work/project/Daemon/Action/Actions.cs")?;
        assert_eq!(location.namespace, "Daemon.Action");
        assert_eq!(location.source_path, PathBuf::from("Daemon/Action/Actions.cs"));
        Ok(())
    }

    #[test]
    fn test_absolute_path_under_relative_root() -> Result<()> {
        let cwd = std::env::current_dir()?;
        let location = OutputLocation::resolve(
            Path::new("."),
            &cwd.join("Daemon/Action/ActionTemplate.cs"),
            DEFAULT_ENUM_FILE_NAME,
        )?;
        assert_eq!(location.namespace, "Daemon.Action");
        assert_eq!(location.source_path, PathBuf::from("Daemon/Action/ActionTemplate.cs"));

        let outside = cwd.parent().unwrap_or(Path::new("/")).join("Other/Actions.cs");
        let err = OutputLocation::resolve(Path::new("."), &outside, DEFAULT_ENUM_FILE_NAME);
        assert!(matches!(err, Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["Actions.cs", "", "/elsewhere/Daemon/Actions.cs", "../Daemon/Actions.cs", "Daemon/_.cs"] {
            let err = resolve(path).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{path}: {err}");
        }
    }

    #[test]
    fn test_custom_enum_file_name() -> Result<()> {
        let location =
            OutputLocation::resolve(Path::new("."), Path::new("Daemon/Actions.cs"), "action_kind.cs")?;
        assert_eq!(location.enum_name, "ActionKind");
        assert_eq!(location.enum_path, PathBuf::from("Daemon/action_kind.cs"));

        let err = OutputLocation::resolve(Path::new("."), Path::new("Daemon/Actions.cs"), "x/y.cs");
        assert!(err.is_err());
        Ok(())
    }

    #[test]
    fn test_display_posix() {
        let path: PathBuf = ["Daemon", "Resources", "actions_meta.yml"].iter().collect();
        assert_eq!(display_posix(&path), "Daemon/Resources/actions_meta.yml");
    }
}
