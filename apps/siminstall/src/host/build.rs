//! Archive extraction and the cmake build tool.

use super::process::{run_captured, run_logged};
use siminstall_core::{BuildRequest, Builder, Extractor, ToolFailure};
use std::path::{Path, PathBuf};
use std::process::Command;

// =============================================================================
// EXTRACTION
// =============================================================================

/// Expands archives with `tar`.
#[derive(Debug, Default)]
pub struct TarExtractor;

/// The single top-level directory of an extracted tree, or `dir` itself.
pub fn source_root(dir: &Path) -> Result<PathBuf, ToolFailure> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ToolFailure::io(&format!("read {}", dir.display()), &e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ToolFailure::io(&format!("read {}", dir.display()), &e))?;

    match entries.as_slice() {
        [only] if only.path().is_dir() => Ok(only.path()),
        _ => Ok(dir.to_path_buf()),
    }
}

impl Extractor for TarExtractor {
    fn extract(&self, archive: &Path, into: &Path) -> Result<PathBuf, ToolFailure> {
        std::fs::create_dir_all(into)
            .map_err(|e| ToolFailure::io(&format!("create {}", into.display()), &e))?;
        run_captured(
            Command::new("tar")
                .arg("-xf")
                .arg(archive)
                .arg("-C")
                .arg(into),
        )?;
        let root = source_root(into)?;
        tracing::info!(root = %root.display(), "archive extracted");
        Ok(root)
    }
}

// =============================================================================
// CMAKE
// =============================================================================

/// Configures and compiles with cmake; all output goes to the request's log.
#[derive(Debug, Clone)]
pub struct CmakeBuilder {
    program: String,
}

impl CmakeBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn configure_command(&self, request: &BuildRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-S")
            .arg(&request.source_dir)
            .arg("-B")
            .arg(&request.build_dir)
            .arg(format!(
                "-D{}={}",
                request.gui_option,
                if request.gui { "ON" } else { "OFF" }
            ))
            .arg("-DCMAKE_BUILD_TYPE=Release");
        for define in &request.defines {
            cmd.arg(format!("-D{}", define));
        }
        cmd
    }

    pub fn build_command(&self, request: &BuildRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--build").arg(&request.build_dir).arg("--parallel");
        if let Some(jobs) = request.jobs {
            cmd.arg(jobs.to_string());
        }
        cmd
    }
}

impl Builder for CmakeBuilder {
    fn build(&self, request: &BuildRequest) -> Result<(), ToolFailure> {
        tracing::info!(log = %request.log_file.display(), "configuring");
        run_logged(&mut self.configure_command(request), &request.log_file)?;
        tracing::info!("compiling");
        run_logged(&mut self.build_command(request), &request.log_file)
    }

    fn version_output(&self) -> Result<String, ToolFailure> {
        let output = run_captured(Command::new(&self.program).arg("--version"))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn request() -> BuildRequest {
        BuildRequest {
            source_dir: PathBuf::from("/tmp/w/src/lammps-stable/cmake"),
            build_dir: PathBuf::from("/tmp/w/build"),
            gui_option: "BUILD_LAMMPS_GUI".into(),
            gui: true,
            jobs: None,
            defines: vec!["BUILD_TOOLS=ON".into()],
            log_file: PathBuf::from("/tmp/w/lammps-build.log"),
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn configure_passes_gui_flag_and_defines() {
        let cmd = CmakeBuilder::new("cmake").configure_command(&request());
        assert_eq!(
            args(&cmd),
            vec![
                "-S",
                "/tmp/w/src/lammps-stable/cmake",
                "-B",
                "/tmp/w/build",
                "-DBUILD_LAMMPS_GUI=ON",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DBUILD_TOOLS=ON",
            ]
        );
    }

    #[test]
    fn gui_off() {
        let mut req = request();
        req.gui = false;
        let cmd = CmakeBuilder::new("cmake").configure_command(&req);
        assert!(args(&cmd).contains(&"-DBUILD_LAMMPS_GUI=OFF".to_string()));
    }

    #[test]
    fn build_job_count() {
        let builder = CmakeBuilder::new("cmake");
        assert_eq!(
            args(&builder.build_command(&request())),
            vec!["--build", "/tmp/w/build", "--parallel"]
        );

        let mut req = request();
        req.jobs = Some(8);
        assert_eq!(
            args(&builder.build_command(&req)),
            vec!["--build", "/tmp/w/build", "--parallel", "8"]
        );
    }

    #[test]
    fn single_top_level_directory_is_the_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("lammps-22Jul2025")).expect("mkdir");
        assert_eq!(
            source_root(dir.path()).expect("root"),
            dir.path().join("lammps-22Jul2025")
        );
    }

    #[test]
    fn flat_archive_root_is_the_extraction_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("src")).expect("mkdir");
        fs::write(dir.path().join("README"), "").expect("write");
        assert_eq!(source_root(dir.path()).expect("root"), dir.path());
    }
}
