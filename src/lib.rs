/*
 * This file contains template helpers.
 * Prefer `./helpers.rs` if you want to extract code from your solutions.
 */
use std::env;
use std::fs;

pub mod helpers;
pub mod valves;

pub const ANSI_ITALIC: &str = "\x1b[3m";
pub const ANSI_BOLD: &str = "\x1b[1m";
pub const ANSI_RESET: &str = "\x1b[0m";

/// Runs `$solver` on `$input`, printing the answer and the elapsed time.
///
/// The solver may take any input type by reference and must return an
/// `Option` of something printable; `None` is reported as "not solved".
#[macro_export]
macro_rules! solve {
    ($part:expr, $solver:ident, $input:expr) => {{
        use std::fmt::Display;
        use std::time::Instant;
        use $crate::{ANSI_BOLD, ANSI_ITALIC, ANSI_RESET};

        fn print_result<I: ?Sized, T: Display>(func: impl FnOnce(&I) -> Option<T>, input: &I) {
            let timer = Instant::now();
            let result = func(input);
            let elapsed = timer.elapsed();
            match result {
                Some(result) => {
                    println!(
                        "{} {}(elapsed: {:.2?}){}",
                        result, ANSI_ITALIC, elapsed, ANSI_RESET
                    );
                }
                None => {
                    println!("not solved.")
                }
            }
        }

        println!("🎄 {}Part {}{} 🎄", ANSI_BOLD, $part, ANSI_RESET);
        print_result($solver, $input);
    }};
}

/// Like `println!`, but only in debug builds.
#[macro_export]
macro_rules! debugln {
    ($($tt:tt)*) => {
        #[cfg(debug_assertions)]
        println!($($tt)*)
    };
}

pub fn read_file(folder: &str, day: u8) -> String {
    let cwd = env::current_dir().unwrap();

    let filepath = cwd.join("src").join(folder).join(format!("{day:02}.txt"));

    let f = fs::read_to_string(filepath);
    f.expect("could not open input file")
}
