//! pyenvbuilder binary: one invocation, one exit code.

fn main() {
    if let Err(e) = pyenvbuilder::run_cli() {
        eprintln!("✗ {e:#}");
        std::process::exit(pyenvbuilder::exit::exit_code(&e));
    }
}
