//! Compiler and linker settings for consumers of an installation.

use std::path::PathBuf;

use boostup_schema::Toolset;
use serde::Serialize;

const MSVC_DEFINES: [&str; 2] = ["_DLL", "BOOST_ALL_DYN_LINK"];
const MSVC_CXX_FLAGS: [&str; 1] = ["/EHsc"];
// Avoids LNK4098 when mixing the static and dynamic CRT.
const MSVC_LINK_FLAGS: [&str; 1] = ["/NODEFAULTLIB:libcmt"];

const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Search paths and toolset extras to prepend to a build's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFlags {
    /// Toolset the installation was built with.
    pub toolset: Toolset,
    /// Header search directories, base first.
    pub include_dirs: Vec<PathBuf>,
    /// Library search directories.
    pub lib_dirs: Vec<PathBuf>,
    /// Preprocessor defines.
    pub defines: Vec<String>,
    /// Extra C++ compiler flags.
    pub cxx_flags: Vec<String>,
    /// Extra linker flags.
    pub link_flags: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl BuildFlags {
    /// Flags for `toolset`, adding the runtime-linkage settings MSVC needs.
    pub fn new(toolset: Toolset, include_dirs: Vec<PathBuf>, lib_dirs: Vec<PathBuf>) -> Self {
        let (defines, cxx_flags, link_flags) = if toolset.is_msvc() {
            (
                owned(&MSVC_DEFINES),
                owned(&MSVC_CXX_FLAGS),
                owned(&MSVC_LINK_FLAGS),
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        Self {
            toolset,
            include_dirs,
            lib_dirs,
            defines,
            cxx_flags,
            link_flags,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// `cargo:` lines for a build script.
    pub fn cargo_directives(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .lib_dirs
            .iter()
            .map(|dir| format!("cargo:rustc-link-search=native={}", dir.display()))
            .collect();
        lines.push(format!("cargo:include={}", join_paths(&self.include_dirs)));
        if !self.defines.is_empty() {
            lines.push(format!("cargo:defines={}", self.defines.join(",")));
        }
        if !self.cxx_flags.is_empty() {
            lines.push(format!("cargo:cxxflags={}", self.cxx_flags.join(" ")));
        }
        lines.extend(
            self.link_flags
                .iter()
                .map(|flag| format!("cargo:rustc-link-arg={flag}")),
        );
        lines
    }

    /// POSIX shell `export` lines prepending to the compiler search variables.
    pub fn shell_exports(&self) -> Vec<String> {
        let prepend = |var: &str, paths: &[PathBuf]| {
            format!(
                "export {var}={}\"${{{var}:+{PATH_SEPARATOR}${var}}}\"",
                shell_quote(&join_paths(paths))
            )
        };

        let mut lines = vec![
            prepend("CPLUS_INCLUDE_PATH", &self.include_dirs),
            prepend("LIBRARY_PATH", &self.lib_dirs),
        ];
        for (var, values) in [
            ("BOOST_DEFINES", &self.defines),
            ("BOOST_CXXFLAGS", &self.cxx_flags),
            ("BOOST_LINKFLAGS", &self.link_flags),
        ] {
            if !values.is_empty() {
                lines.push(format!("export {var}={}", shell_quote(&values.join(" "))));
            }
        }
        lines
    }
}
