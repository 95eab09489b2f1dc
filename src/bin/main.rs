//! CLI surface (§6): the `symtest` executable itself, which is also the
//! subject of its own discovery engine when compiled together with a
//! test binary that links against `symtest`.

use clap::Parser;
use colored::Colorize;
use symtest::error::EngineError;
use symtest::module_map::ScanMode;
use symtest::{discover, discover_and_run_test_list, discover_plan};

/// A self-introspecting unit-test runner that discovers its own tests
/// from its ELF symbol table.
#[derive(Parser, Debug)]
#[command(name = "symtest", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Show usage and exit.
    #[arg(long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Print the discovered test plan without executing it.
    #[arg(long = "list-test", action = clap::ArgAction::SetTrue)]
    list_test: bool,

    /// Restrict discovery to the named suites (comma/semicolon delimited).
    #[arg(long = "module-list")]
    module_list: Option<String>,

    /// Run exactly the listed `Suite.Test` pairs (comma/semicolon
    /// delimited), bypassing plan building.
    #[arg(long = "test-list")]
    test_list: Option<String>,

    /// `Main` scans only the main executable; `All` also scans shared
    /// libraries.
    #[arg(long = "option", value_enum, default_value_t = ScanMode::Main)]
    option: ScanMode,
}

/// Splits a comma/semicolon-delimited list argument, trimming whitespace
/// and dropping empty fields (§6 `--module-list`/`--test-list`).
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_usage() {
    eprintln!("symtest — a self-introspecting ELF unit-test runner");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    symtest [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    --help                    Show this usage and exit");
    eprintln!("    --list-test               Print the discovered plan without running it");
    eprintln!("    --module-list <a,b,...>   Restrict to the named suites");
    eprintln!("    --test-list <S.T,...>     Run exactly the listed Suite.Test pairs");
    eprintln!("    --option {{Main,All}}       Main = scan only the main executable (default)");
    eprintln!("                              All  = also scan shared libraries");
}

fn report_fatal(err: &EngineError) {
    eprintln!("{} {err}", "[ ERROR ]".red().bold());
}

fn main() {
    env_logger::init();

    // §6: "--help: Show usage; exit non-zero." clap's own --help exits 0,
    // so help is handled by hand here rather than left to the derive's
    // default flag (`disable_help_flag` above opts out of that default).
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            report_fatal(&EngineError::BadCli(err.to_string()));
            print_usage();
            std::process::exit(-1);
        }
    };

    if cli.help {
        print_usage();
        std::process::exit(-1);
    }

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_fatal(&err);
            -1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, EngineError> {
    if let Some(raw) = cli.test_list {
        let names = split_list(&raw);
        let summary = discover_and_run_test_list(cli.option, &names)?;
        return Ok(summary.exit_code());
    }

    let suite_filter = cli.module_list.as_deref().map(split_list);

    if cli.list_test {
        let plan = discover_plan(cli.option, suite_filter.as_deref())?;
        symtest::runner::list_plan(&plan);
        return Ok(0);
    }

    let store = discover(cli.option)?;
    let plan = symtest::plan::build_plan(&store, suite_filter.as_deref());
    let summary = symtest::runner::run_plan(&plan);
    Ok(summary.exit_code())
}
