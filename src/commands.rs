use std::process::Command;

/// The four `xinput` invocations the rest of the program needs. Everything
/// device-related goes through this trait, so parsing and apply logic can be
/// tested against canned output without spawning processes.
pub trait InputBackend {
    /// Raw output of `xinput list --short`, or `None` on failure.
    fn list_short(&self) -> Option<String>;

    /// Whether `prop` appears in the device's `list-props` output.
    fn device_has_prop(&self, device_id: &str, prop: &str) -> bool;

    /// Set a property. Best-effort: a failure is logged, never raised.
    fn set_prop(&self, device_id: &str, prop: &str, values: &[String]) -> bool;

    /// Ids currently registered for `pointer:<name>`.
    fn pointer_ids_for_name(&self, name: &str) -> Vec<String>;
}

/// Production backend shelling out to the real `xinput` binary.
pub struct Xinput;

impl Xinput {
    fn run(&self, args: &[&str]) -> Option<String> {
        log::debug!("running: xinput {}", args.join(" "));
        match Command::new("xinput").args(args).output() {
            Ok(out) if out.status.success() => {
                Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
            }
            Ok(out) => {
                log::warn!(
                    "xinput {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                None
            }
            Err(e) => {
                log::warn!("could not run xinput: {}", e);
                None
            }
        }
    }
}

impl InputBackend for Xinput {
    fn list_short(&self) -> Option<String> {
        self.run(&["list", "--short"]).filter(|out| !out.is_empty())
    }

    fn device_has_prop(&self, device_id: &str, prop: &str) -> bool {
        self.run(&["list-props", device_id])
            .map(|out| out.contains(prop))
            .unwrap_or(false)
    }

    fn set_prop(&self, device_id: &str, prop: &str, values: &[String]) -> bool {
        let mut args = vec!["--set-prop", device_id, prop];
        args.extend(values.iter().map(String::as_str));
        self.run(&args).is_some()
    }

    fn pointer_ids_for_name(&self, name: &str) -> Vec<String> {
        let selector = format!("pointer:{}", name);
        self.run(&["list", "--id-only", &selector])
            .map(|out| out.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
