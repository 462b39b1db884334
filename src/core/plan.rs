//! Resolved build plan
//!
//! A [`BuildPlan`] gathers everything one build invocation resolved: the
//! options, compiler configuration, generator runs, auxiliary libraries and
//! linker script. It is handed to the compiler driver either as JSON or as a
//! Make fragment.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::core::codegen::{generated_sources, plan_generators, GeneratorRequest};
use crate::core::compose::{compose, ComposeContext, CompileConfig};
use crate::core::libraries::{assemble, link_set, LibraryManifest};
use crate::core::linker::select_linker_script;
use crate::core::options::{BuildOptions, ResolvedOptions};
use crate::core::project::{ProjectManifest, ProjectPaths};
use crate::core::sdk::SdkLayout;
use crate::error::OptionError;

/// Everything resolved for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    /// Project name
    pub project: String,
    /// Validated options
    pub options: BuildOptions,
    /// SDK locations
    pub sdk: SdkLayout,
    /// Project directories
    pub paths: ProjectPaths,
    /// Compiler, assembler and linker configuration
    pub compile: CompileConfig,
    /// Planned generator runs
    pub generators: Vec<GeneratorRequest>,
    /// Auxiliary libraries
    pub libraries: LibraryManifest,
    /// Selected linker script
    pub linker_script: PathBuf,
    /// Library search path including the build directory
    pub link_dirs: Vec<PathBuf>,
    /// Final link set, auxiliary libraries first
    pub link_libraries: Vec<String>,
}

impl BuildPlan {
    /// Resolve the plan from validated options
    ///
    /// Does not touch the filesystem; artifact presence is checked by the
    /// caller.
    pub fn resolve(
        manifest: &ProjectManifest,
        options: BuildOptions,
        sdk: SdkLayout,
        paths: ProjectPaths,
    ) -> Result<Self, OptionError> {
        let compile = compose(&options, &ComposeContext { sdk: &sdk, paths: &paths });
        let generators = plan_generators(&options, manifest, &sdk, &paths)?;
        let libraries = assemble(&options, &sdk, &paths, &generated_sources(&generators));
        let linker_script = select_linker_script(options.stack, options.chip, &sdk);

        let mut link_dirs = vec![paths.build_dir.clone()];
        link_dirs.extend(compile.lib_dirs.iter().cloned());
        let link_libraries = link_set(&libraries, &compile.resolved_libraries);

        Ok(Self {
            project: manifest.project.name.clone(),
            options,
            sdk,
            paths,
            compile,
            generators,
            libraries,
            linker_script,
            link_dirs,
            link_libraries,
        })
    }

    /// Operator diagnostics printed after configuration
    pub fn diagnostics(&self) -> Vec<String> {
        vec![
            format!("JENNIC_STACK: {}", self.options.stack),
            format!("JENNIC_MAC:   {}", self.options.mac),
            format!("LIBS:    {:?}", self.compile.libraries),
        ]
    }

    /// Serialise as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render as a Make fragment
    pub fn to_make(&self) -> String {
        fn line(out: &mut String, name: &str, items: &[String]) {
            let _ = writeln!(out, "{name} := {}", items.join(" "));
        }
        fn paths<'a>(prefix: &str, items: impl IntoIterator<Item = &'a PathBuf>) -> Vec<String> {
            items
                .into_iter()
                .map(|p| format!("{prefix}{}", p.display()))
                .collect()
        }

        let compile = &self.compile;
        let mut out = String::new();
        let _ = writeln!(out, "# jnbuild configuration for {}", self.project);
        line(&mut out, "CFLAGS", &compile.cc_flags);
        line(&mut out, "CXXFLAGS", &compile.cxx_flags);
        line(&mut out, "ASFLAGS", &compile.assembler_command_flags());
        line(&mut out, "LDFLAGS", &compile.link_flags);
        line(&mut out, "CPPDEFINES", &compile.define_flags());
        line(&mut out, "CPPPATH", &compile.include_flags());
        line(&mut out, "LIBPATH", &paths("-L", &self.link_dirs));
        let libs: Vec<String> = self.link_libraries.iter().map(|l| format!("-l{l}")).collect();
        line(&mut out, "LIBS", &libs);
        let _ = writeln!(out, "LDSCRIPT := {}", self.linker_script.display());
        line(
            &mut out,
            "AUX_LIBS",
            &paths("", self.libraries.libraries.iter().map(|l| &l.archive)),
        );
        out
    }
}

/// Make variables listing each auxiliary library's sources
pub fn render_sources(sources: &[(String, Vec<PathBuf>)]) -> String {
    let mut out = String::new();
    for (name, files) in sources {
        let files: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        let _ = writeln!(out, "{name}_SRCS := {}", files.join(" "));
    }
    out
}

/// Options report for `check`: name, value, source
pub fn option_report(resolved: &ResolvedOptions) -> Vec<(String, String, String)> {
    resolved
        .iter()
        .map(|(name, option)| {
            let value = option
                .value
                .as_ref()
                .map_or_else(|| "-".to_string(), |v| match v {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            ((*name).to_string(), value, option.source.to_string())
        })
        .collect()
}
