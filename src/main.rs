//! Marksplit CLI entry point.

#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use marksplit::ErrorKind;

fn main() {
    if let Err(e) = marksplit::run() {
        eprintln!("error: {e}");
        let code = if e.kind() == ErrorKind::Cancelled {
            130
        } else {
            1
        };
        std::process::exit(code);
    }
}
