//! eventboard main entrypoint.

use eventboard::run;
use eventboard::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("{}", e));
        std::process::exit(1);
    }
}
