//! Operator prompts.
//!
//! [`TerminalPrompt`] drives interactive `dialoguer` inputs. When stdin or
//! stderr is not a terminal (CI, `printf '1.1\nn\n' | godot_steam_release`)
//! answers are read line by line with [`LinePrompt`] instead.

use crate::error::{CliError, Result};
use crate::pipeline::OperatorPrompt;
use crate::upload::UploadMode;
use crate::version::validate_version;
use dialoguer::Input;
use std::io::{BufRead, IsTerminal, Write};

const UPLOAD_MODE_PROMPT: &str = "Upload content only (Y/n)?";

fn version_prompt(current: Option<&str>) -> String {
    match current {
        Some(current) => format!("New version (current {current})"),
        None => "New version".to_string(),
    }
}

/// Prompt suited to the attached streams: interactive on a terminal,
/// line-based otherwise.
pub fn operator_prompt() -> Box<dyn OperatorPrompt> {
    if console::Term::stderr().is_term() && std::io::stdin().is_terminal() {
        Box::new(TerminalPrompt)
    } else {
        log::debug!("No terminal attached, reading answers from stdin");
        Box::new(LinePrompt::new(std::io::stdin().lock()))
    }
}

/// Reads operator answers interactively from the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl OperatorPrompt for TerminalPrompt {
    fn new_version(&mut self, current: Option<&str>) -> Result<String> {
        let prompt = version_prompt(current);

        let answer: String = Input::<String>::new()
            .with_prompt(&prompt)
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                validate_version(input.trim()).map_err(|e| e.to_string())
            })
            .interact_text()
            .map_err(|e| CliError::PromptFailed {
                prompt: prompt.clone(),
                reason: e.to_string(),
            })?;

        Ok(answer.trim().to_string())
    }

    fn upload_mode(&mut self) -> Result<UploadMode> {
        let answer: String = Input::<String>::new()
            .with_prompt(UPLOAD_MODE_PROMPT)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CliError::PromptFailed {
                prompt: UPLOAD_MODE_PROMPT.to_string(),
                reason: e.to_string(),
            })?;

        Ok(UploadMode::from_answer(&answer))
    }
}

/// Reads one answer per line from any reader.
///
/// There is no re-asking: an invalid version or a closed input fails the
/// prompt.
pub struct LinePrompt<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LinePrompt<R> {
    /// Read answers from `reader`
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{prompt}: ");
        let _ = stderr.flush();

        let failed = |reason: String| CliError::PromptFailed {
            prompt: prompt.to_string(),
            reason,
        };
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| failed(e.to_string()))?;
        if read == 0 {
            return Err(failed("input closed before an answer was given".to_string()).into());
        }
        let _ = writeln!(stderr);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead> OperatorPrompt for LinePrompt<R> {
    fn new_version(&mut self, current: Option<&str>) -> Result<String> {
        let answer = self.ask(&version_prompt(current))?;
        let version = answer.trim();
        validate_version(version)?;
        Ok(version.to_string())
    }

    fn upload_mode(&mut self) -> Result<UploadMode> {
        let answer = self.ask(UPLOAD_MODE_PROMPT)?;
        Ok(UploadMode::from_answer(&answer))
    }
}
