//! The command line planner.
//!
//! `marten_pdr [--option=value ...] <problem>` --- the problem in the
//! grounded STRIPS text format (optionally `.xz` compressed), options per
//! [parse_args]. The plan is written to `<path><problem-file>.soln`.

mod parse_args;

use std::{
    io::BufReader,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use marten_pdr::{
    builder,
    config::Config,
    context::SolveContext,
    invariant::{self, InvariantSet},
    reports::Report,
    structures::problem::{Model, Problem},
    translate,
};

/// Options of the driver rather than the engine.
pub struct CliConfig {
    /// Emit a bounded-horizon CNF and exit: 1 sequential, 2 parallel.
    pub just_translate: u8,

    /// Emit `operatorN.pddl`/`factsN.pddl` and exit.
    pub just_dumpgrounded: Option<usize>,

    /// Path prefix for the solution file.
    pub path: String,
}

fn main() {
    let mut config = Config::default();
    let mut cli = CliConfig {
        just_translate: 0,
        just_dumpgrounded: None,
        path: String::new(),
    };

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("usage: marten_pdr [--option=value ...] <problem>");
        std::process::exit(1);
    }

    parse_args::parse_args(&args, &mut config, &mut cli);

    if let Err(error) = config.check() {
        println!("Unsupported configuration: {error:?}");
        std::process::exit(1);
    }

    let problem_path = PathBuf::from(args.last().expect("checked above"));
    let mut problem = read_problem(&problem_path);

    let (modified, dropped) = problem.normalize();
    println!();
    println!("Normalized actions: modified {modified} and dropped {dropped}.");

    if problem.goal_in_initial() {
        println!("Initial state satisfies the goal.");
        println!("Plan is trivial!");
        std::process::exit(0);
    }

    let model = Model::build(&problem, config.reverse.value);

    if cli.just_translate > 0 {
        println!();
        println!(
            "Translating problem from {} ({} encoding).",
            problem_path.display(),
            if cli.just_translate == 1 { "sequential" } else { "parallel" }
        );

        let inv = match config.gen_invariant.value {
            true => Some(invariant::derive(&model).collect_set()),
            false => None,
        };

        let stdout = std::io::stdout();
        if let Err(error) =
            translate::write_cnf(&mut stdout.lock(), &problem, cli.just_translate == 2, inv.as_ref())
        {
            println!("{error}");
            std::process::exit(1);
        }
        std::process::exit(0);
    }

    if let Some(suffix) = cli.just_dumpgrounded {
        if let Err(error) = translate::dump_grounded(&problem, &model, &config, suffix) {
            println!("{error}");
            std::process::exit(1);
        }
        std::process::exit(0);
    }

    let mut ctx = SolveContext::new(model, config);

    let file_name = problem_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "problem".to_string());
    ctx.solution_path = Some(PathBuf::from(format!("{}{}.soln", cli.path, file_name)));

    if ctx.config.gen_invariant.value {
        println!();
        println!("Generating invariant ...");
        let clock = Instant::now();

        let derivation = invariant::derive(&ctx.model);
        let mut set = InvariantSet::with_capacity(derivation.len());
        let mut units = 0usize;
        let mut binaries = 0usize;
        for clause in derivation {
            if clause.is_unit() {
                units += 1;
            } else {
                binaries += 1;
            }
            set.push(clause);
        }
        ctx.load_invariant(set);

        println!("\tderived {binaries} binclauses and {units} units,");
        println!("\ttook {:.6}s.", clock.elapsed().as_secs_f64());
        println!();
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    ctx.interrupt = Some(interrupt.clone());
    let handler_flag = interrupt.clone();
    if let Err(error) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        log::warn!("No interrupt handler: {error}");
    }

    println!();
    println!("--- Starting PDR --- ");

    let report = ctx.solve();

    if report == Report::Interrupted {
        println!("*** INTERRUPTED ***");
    }

    ctx.print_final_stats();

    if report == Report::Interrupted {
        std::process::exit(1);
    }
}

/// Opens and parses the problem file, transparently decompressing `.xz`.
fn read_problem(path: &PathBuf) -> Problem {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(error) => {
            println!("Unable to open {}: {error}", path.display());
            std::process::exit(1);
        }
    };

    let parsed = match path.extension() {
        Some(extension) if *extension == *"xz" => {
            builder::read_strips(BufReader::new(xz2::read::XzDecoder::new(file)))
        }
        _ => builder::read_strips(BufReader::new(file)),
    };

    match parsed {
        Ok(problem) => problem,
        Err(error) => {
            println!("Unable to parse {}: {error:?}", path.display());
            std::process::exit(1);
        }
    }
}
