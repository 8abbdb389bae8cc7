use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use dieter::lexer;
use dieter::parser::{ParseState, parse};
use dieter::types::check_program;

#[derive(Parser)]
#[command(name = "dieter", about = "Type checker for the Dieter programming language")]
struct Cli {
    /// Source files to check
    files: Vec<PathBuf>,

    /// Dump the AST after each source file is parsed
    #[arg(short = 'a', long)]
    dump_ast: bool,

    /// Dump the symbol tables after a successful check
    #[arg(short = 's', long)]
    dump_symtab: bool,

    /// Be verbose about actions taken internally (e.g. type unification)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let mut failed = false;
    for file in &cli.files {
        let source = fs::read_to_string(file)?;

        let tokens = match lexer::lex(&source) {
            Ok(tokens) => tokens,
            Err(err) => {
                eprintln!("{}: {}", file.display(), err);
                failed = true;
                continue;
            }
        };

        let mut state = ParseState::new(tokens);
        let (program, errors) = parse(&mut state);
        if !errors.is_empty() {
            for err in &errors {
                eprintln!("{err}");
            }
            failed = true;
            continue;
        }
        let Some(program) = program else {
            failed = true;
            continue;
        };

        if cli.dump_ast {
            println!("{program:#?}");
        }

        match check_program(&program) {
            Ok(report) => {
                if cli.dump_symtab {
                    print!("{}", report.dump_symbols());
                }
                println!("OK");
            }
            Err(diagnostics) => {
                for diagnostic in &diagnostics {
                    eprintln!("{diagnostic}");
                }
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
    Ok(())
}
