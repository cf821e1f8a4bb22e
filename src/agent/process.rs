use std::ffi::OsString;
use std::process::{Child, Command};

use anyhow::{Context, Result, bail};

use super::Reloadable;

/// A supervised child process. Reloading kills and respawns it; dropping
/// it kills it.
pub struct ChildProcess {
    name: String,
    program: OsString,
    args: Vec<OsString>,
    child: Option<Child>,
}

impl ChildProcess {
    /// From a command array (e.g., `["node", "host.js"]`).
    pub fn from_slice<S: AsRef<str>>(cmd: &[S]) -> Result<Self> {
        let Some((program, args)) = cmd.split_first() else {
            bail!("empty command");
        };
        Ok(Self {
            name: cmd.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(" "),
            program: OsString::from(program.as_ref()),
            args: args.iter().map(|a| OsString::from(a.as_ref())).collect(),
            child: None,
        })
    }

    /// Run `line` through the platform shell.
    pub fn shell(line: &str) -> Self {
        #[cfg(windows)]
        let (program, flag) = ("cmd", "/C");
        #[cfg(not(windows))]
        let (program, flag) = ("sh", "-c");

        Self {
            name: line.to_string(),
            program: program.into(),
            args: vec![flag.into(), line.into()],
            child: None,
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    pub fn spawn(&mut self) -> Result<()> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .with_context(|| format!("failed to start `{}`", self.name))?;
        crate::debug!("agent"; "started {} (pid {})", self.name, child.id());
        self.child = Some(child);
        Ok(())
    }

    pub fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Reloadable for ChildProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn reload(&mut self) -> Result<()> {
        self.kill();
        self.spawn()
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let process = ChildProcess::from_slice(&["node", "host.js"]).unwrap();
        assert_eq!(process.name(), "node host.js");
        assert!(process.id().is_none());

        let empty: [&str; 0] = [];
        assert!(ChildProcess::from_slice(&empty).is_err());
    }

    #[test]
    fn test_missing_program_fails() {
        let mut process = ChildProcess::from_slice(&["crx-reload-no-such-program"]).unwrap();
        assert!(process.spawn().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_reload_restarts() {
        let mut process = ChildProcess::shell("sleep 30");
        process.spawn().unwrap();
        let first = process.id().unwrap();

        process.reload().unwrap();
        let second = process.id().unwrap();
        assert_ne!(first, second);

        process.kill();
        assert!(process.id().is_none());
    }
}
