//! Job submission scripts. Scripts are written, never submitted.

use crate::context::SweepInputs;
use crate::enumerate::Case;
use crate::template::{Template, TokenValues};
use crate::writer;
use ff_core::{FfError, FfResult};
use std::path::{Path, PathBuf};

pub const CASE_SCRIPT: &str = "runFASTFarm.sh";
pub const LOW_BATCH_SCRIPT: &str = "runAllLowBox.sh";
pub const HIGH_BATCH_SCRIPT: &str = "runAllHighBox.sh";

#[derive(Debug, Clone, PartialEq)]
pub enum JobInput {
    Single(String),
    Batch(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobContext {
    pub job_name: String,
    pub work_dir: PathBuf,
    pub binary: PathBuf,
    pub input: JobInput,
    /// Additional values, e.g. case tokens for a per-case job.
    pub extra: TokenValues,
}

impl JobContext {
    fn tokens(&self) -> TokenValues {
        let mut v = self.extra.clone();
        v.set("job_name", &self.job_name)
            .set("work_dir", self.work_dir.display())
            .set("binary", self.binary.display());
        match &self.input {
            JobInput::Single(file) => {
                v.set("input_file", file);
            }
            JobInput::Batch(files) => {
                v.set("inputs", files.join("\n")).set("n_inputs", files.len());
            }
        }
        v
    }
}

pub fn render_submission_script(template: &Template, ctx: &JobContext) -> FfResult<String> {
    template.render(&ctx.tokens())
}

/// Render and write an executable script at `dest`.
pub fn prepare_submission_script(
    template: &Template,
    ctx: &JobContext,
    dest: &Path,
) -> FfResult<PathBuf> {
    let text = render_submission_script(template, ctx)?;
    if let Some(parent) = dest.parent() {
        writer::ensure_dir(parent)?;
    }
    writer::write_if_changed(dest, text.as_bytes())?;
    writer::set_executable(dest)?;
    Ok(dest.to_path_buf())
}

/// Context of the FAST.Farm job for one case.
pub fn case_job(case: &Case, inputs: &SweepInputs, fastfarm_input: &str) -> JobContext {
    JobContext {
        job_name: case.job_name(),
        work_dir: inputs.case_dir(case),
        binary: inputs.execution.fastfarm_bin.clone(),
        input: JobInput::Single(fastfarm_input.to_string()),
        extra: inputs.case_tokens(case),
    }
}

/// Write the TurbSim batch scripts at the sweep base. `low` and `high` are
/// box inputs relative to the base path.
pub fn write_batch_scripts(
    inputs: &SweepInputs,
    low: Vec<String>,
    high: Vec<String>,
) -> FfResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (template, name, files, job) in [
        (&inputs.scripts.turbsim_low, LOW_BATCH_SCRIPT, low, "lowBox"),
        (&inputs.scripts.turbsim_high, HIGH_BATCH_SCRIPT, high, "highBox"),
    ] {
        let Some(template) = template else {
            continue;
        };
        let binary = inputs
            .execution
            .turbsim_bin
            .clone()
            .ok_or_else(|| FfError::config("TurbSim batch scripts require execution.turbsim_bin"))?;
        let ctx = JobContext {
            job_name: job.to_string(),
            work_dir: inputs.base_path.clone(),
            binary,
            input: JobInput::Batch(files),
            extra: TokenValues::new(),
        };
        written.push(prepare_submission_script(template, &ctx, &inputs.base_path.join(name))?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_script_lists_inputs() {
        let t = Template::parse(
            "#SBATCH -J {{ job_name }}\ncd {{ work_dir }}\n# {{ n_inputs }} boxes\n{{ inputs }}\n",
        )
        .unwrap();
        let ctx = JobContext {
            job_name: "lowBox".into(),
            work_dir: PathBuf::from("/scratch/sweep"),
            binary: PathBuf::from("turbsim"),
            input: JobInput::Batch(vec!["a/Low.inp".into(), "b/Low.inp".into()]),
            extra: TokenValues::new(),
        };
        let text = render_submission_script(&t, &ctx).unwrap();
        assert_eq!(
            text,
            "#SBATCH -J lowBox\ncd /scratch/sweep\n# 2 boxes\na/Low.inp\nb/Low.inp\n"
        );
    }

    #[test]
    fn single_job_uses_input_file() {
        let t = Template::parse("{{ binary }} {{ input_file }}").unwrap();
        let ctx = JobContext {
            job_name: "j".into(),
            work_dir: PathBuf::from("."),
            binary: PathBuf::from("FAST.Farm"),
            input: JobInput::Single("FarmInput.fstf".into()),
            extra: TokenValues::new(),
        };
        assert_eq!(render_submission_script(&t, &ctx).unwrap(), "FAST.Farm FarmInput.fstf");
    }

    #[test]
    fn prepare_writes_executable_script() {
        let dir = std::env::temp_dir().join(format!("ff-sweep-jobs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let t = Template::parse("echo {{ job_name }}\n").unwrap();
        let ctx = JobContext {
            job_name: "hello".into(),
            work_dir: dir.clone(),
            binary: PathBuf::from("sh"),
            input: JobInput::Single(String::new()),
            extra: TokenValues::new(),
        };
        let path = prepare_submission_script(&t, &ctx, &dir.join("run.sh")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "echo hello\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
