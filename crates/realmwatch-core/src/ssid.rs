// ── SSID readers ──
//
// Reading the SSID is a best-effort hint: it only feeds the connectivity
// description and never the mode decision. Callers check the permission
// gate before asking.

use std::process::Command;

use tracing::debug;

/// Reads the SSID of the currently associated Wi-Fi network.
pub trait SsidReader: Send + Sync {
    fn current_ssid(&self) -> Option<String>;
}

impl<F> SsidReader for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_ssid(&self) -> Option<String> {
        self()
    }
}

/// Reader for hosts with no SSID access.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSsidReader;

impl SsidReader for NoSsidReader {
    fn current_ssid(&self) -> Option<String> {
        None
    }
}

/// Reads the SSID with `iwgetid -r` (wireless-tools).
#[derive(Debug, Clone)]
pub struct IwgetidReader {
    program: String,
}

impl Default for IwgetidReader {
    fn default() -> Self {
        Self {
            program: "iwgetid".into(),
        }
    }
}

impl IwgetidReader {
    /// Use a different executable with the same `-r` contract.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SsidReader for IwgetidReader {
    fn current_ssid(&self) -> Option<String> {
        let output = match Command::new(&self.program).arg("-r").output() {
            Ok(output) => output,
            Err(e) => {
                debug!(program = %self.program, error = %e, "SSID reader unavailable");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        let ssid = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        (!ssid.is_empty()).then_some(ssid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_readers() {
        let reader = || Some("Office".to_owned());
        assert_eq!(reader.current_ssid().as_deref(), Some("Office"));
        assert_eq!(NoSsidReader.current_ssid(), None);
    }

    #[test]
    fn missing_program_reads_nothing() {
        let reader = IwgetidReader::with_program("realmwatch-no-such-binary");
        assert_eq!(reader.current_ssid(), None);
    }
}
