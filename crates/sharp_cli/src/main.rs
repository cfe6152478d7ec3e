use anyhow::Result;
use std::env;

mod generate;

const USAGE: &str = "\
sharpweld - C glue and C# binding generator

USAGE:
    sharpweld <COMMAND> [OPTIONS]

COMMANDS:
    generate    Parse declarations and write both output files
    check       Run generation without writing and print the report
    help        Print this message

OPTIONS:
    -c, --config <path>          sharpweld.toml to load (default: ./sharpweld.toml if present)
    -d, --declarations <path>    Serialized declaration tree
        --header <path>          Native header the declarations describe
        --glue-out <path>        Output path for the C++ glue
        --bindings-out <path>    Output path for the C# bindings

ENVIRONMENT:
    SHARPWELD_LOG                Log filter (default: info)
";

fn main() -> Result<()> {
    // SHARPWELD_LOG controls the level, default "info"
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("SHARPWELD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "generate" => generate::run(&args[1..], generate::Mode::Write),
        "check" => generate::run(&args[1..], generate::Mode::Check),
        "help" | "--help" | "-h" => {
            print!("{}", USAGE);
            Ok(())
        }
        other => {
            eprint!("{}", USAGE);
            anyhow::bail!("Unknown command: {}", other)
        }
    }
}
