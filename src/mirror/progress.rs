// ABOUTME: Human-readable progress lines for a mirroring run
// ABOUTME: Printed to stdout, independent of the tracing filter

/// Receives one status line per decision the synchronizer makes.
pub trait Progress: Send + Sync {
    fn report(&self, line: &str);
}

/// Prints every line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutProgress;

impl Progress for StdoutProgress {
    fn report(&self, line: &str) {
        println!("{}", line);
    }
}

impl<F> Progress for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, line: &str) {
        self(line)
    }
}
