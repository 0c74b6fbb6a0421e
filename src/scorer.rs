use std::io::Write;
use std::process::Command;

use log::{debug, warn};
use tempfile::Builder;

use crate::config::ScorerConfig;
use crate::error::ScreenError;
use crate::models::Sample;

/// Column header the scoring script's `read_csv` expects.
pub const CSV_HEADER: &str = "sebiaSerumCurve,sebiaSerumGelControlCurve";

/// Renders a sample as the single-row CSV the scoring script consumes.
/// Hex curve values contain no commas, so no escaping is done. An absent
/// curve encodes as the literal text "null", which the script then rejects
/// on its own terms.
pub fn encode_csv(sample: &Sample) -> String {
    let serum = sample.serum_curve_hex.as_deref().unwrap_or("null");
    let control = sample.gel_control_curve_hex.as_deref().unwrap_or("null");
    format!("{CSV_HEADER}\n{serum},{control}\n")
}

/// The scoring script emits its numeric-array fields as JSON arrays wrapped
/// in an extra pair of quotes (`"[1,2]"` where `[1,2]` is meant). Strips a
/// quote directly before `[` and directly after `]`, leaving all other
/// quotes alone. Idempotent.
pub fn repair_quoted_arrays(text: &str) -> String {
    text.replace("\"[", "[").replace("]\"", "]")
}

/// Parses the scorer's stdout as a JSON array of samples, applying the
/// quote repair first.
pub fn decode_output(text: &str) -> Result<Vec<Sample>, ScreenError> {
    let repaired = repair_quoted_arrays(text);
    serde_json::from_str(&repaired).map_err(|e| ScreenError::Decode(e.to_string()))
}

/// Owns the scoring-script invocation pipeline. Stateless apart from its
/// configuration; one instance is shared across all requests.
pub struct ScreenService {
    config: ScorerConfig,
}

impl ScreenService {
    pub fn new(config: ScorerConfig) -> Self {
        ScreenService { config }
    }

    /// Resolves the `model` query parameter: absent or empty means the
    /// default model, anything else must match it exactly. This guard runs
    /// before any file or process work.
    pub fn resolve_model(&self, requested: Option<&str>) -> Result<String, ScreenError> {
        match requested {
            None | Some("") => Ok(self.config.supported_model.clone()),
            Some(m) if m == self.config.supported_model => Ok(m.to_string()),
            Some(m) => Err(ScreenError::UnsupportedModel {
                requested: m.to_string(),
                supported: self.config.supported_model.clone(),
            }),
        }
    }

    /// Runs one sample through the scoring script and returns the first
    /// record it emitted, stamped with the model name. The script is assumed
    /// to emit exactly one relevant record; extras are discarded.
    pub fn screen(&self, sample: &Sample, model: &str) -> Result<Sample, ScreenError> {
        let stdout = self.invoke(&encode_csv(sample))?;
        let mut records = decode_output(&stdout)?;
        if records.is_empty() {
            return Err(ScreenError::EmptyResult);
        }
        let mut first = records.swap_remove(0);
        first.model_name = Some(model.to_string());
        Ok(first)
    }

    /// Writes the CSV to a uniquely named temp file and runs the scoring
    /// script on it, blocking until it exits. The script is launched with an
    /// explicit argument vector and its working directory set directly; no
    /// shell is involved, so the file path is never interpolated into a
    /// command line. The temp file is removed on every exit path when the
    /// handle drops.
    fn invoke(&self, csv: &str) -> Result<String, ScreenError> {
        let mut csv_file = Builder::new().prefix("sample").suffix(".csv").tempfile()?;
        csv_file.write_all(csv.as_bytes())?;

        debug!(
            "invoking {} {} {}",
            self.config.interpreter,
            self.config.script,
            csv_file.path().display()
        );
        let output = Command::new(&self.config.interpreter)
            .arg(&self.config.script)
            .arg(csv_file.path())
            .current_dir(&self.config.work_dir)
            .output()?;

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            warn!(
                "scoring script exited with status {}: {}",
                status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ScreenError::ScoringFailed { status });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
