//! Thin CLI wrapper around [`wsh::run`] (`spec.md` §6 "CLI surface"). Out of
//! core scope per `spec.md` §1; kept small on purpose.

use std::io::Read;
use std::process::ExitCode;
use wsh::startup::args::{self, Source};
use wsh::RunContext;

fn main() -> ExitCode {
    let arg0 = std::env::args().next().unwrap_or_else(|| "wsh".to_string());
    let parsed = match args::parse(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{arg0}: {e}");
            return ExitCode::from(2);
        }
    };

    let script = match &parsed.source {
        Source::String(s) => s.clone(),
        Source::File(path) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{arg0}: {}: {e}", path.display());
                return ExitCode::from(127);
            }
        },
        Source::Stdin => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("{arg0}: stdin: {e}");
                return ExitCode::from(1);
            }
            buf
        }
    };
    let script = if parsed.errexit { format!("set -e\n{script}") } else { script };

    let mut context = RunContext::default();
    context.shell_name = arg0;
    if let Some(cwd) = parsed.cwd {
        context.cwd = cwd;
    }
    context.positional_params = parsed.positional_params;

    let report = wsh::run(&script, context);

    if parsed.json {
        println!("{}", wsh::diagnostics::to_json(&report));
    } else {
        print!("{}", report.stdout);
        eprint!("{}", report.stderr);
    }

    ExitCode::from(report.exit_status)
}
