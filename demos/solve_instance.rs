extern crate itertools;
extern crate ktree;

use std::{
    env,
    fs::File,
    io::BufWriter,
    process,
    time::{Duration, Instant},
};

use itertools::Itertools;
use ktree::{
    dat,
    formulation::{self, Formulation, ModelConstructionError},
    oracle::{BranchAndBound, Oracle, OracleError},
    tree::{KTree, TreeError},
};

use thiserror::Error;

#[derive(Error, Debug)]
enum Error {
    #[error("failed to parse input")]
    ParsingError(#[from] dat::FormatError),
    #[error("failed to build model")]
    ModelError(#[from] ModelConstructionError),
    #[error("solver failed")]
    OracleError(#[from] OracleError),
    #[error("solution is not a tree")]
    TreeError(#[from] TreeError),
    #[error("failed to write model")]
    IO(#[from] std::io::Error),
}

struct Args {
    files: Vec<String>,
    k: Option<usize>,
    time_limit: Duration,
    export_lp: bool,
}

const USAGE: &str = "solve_instance [--k K] [--time-limit SECONDS] [--export-lp] [instance files]";

fn parse_args() -> Option<Args> {
    let mut args = Args {
        files: vec![],
        k: None,
        time_limit: Duration::from_secs(3600),
        export_lp: false,
    };
    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--k" => args.k = Some(raw.next()?.parse().ok()?),
            "--time-limit" => args.time_limit = Duration::from_secs(raw.next()?.parse().ok()?),
            "--export-lp" => args.export_lp = true,
            _ => args.files.push(arg),
        }
    }
    if args.files.is_empty() {
        return None;
    }
    Some(args)
}

fn main() {
    env_logger::init();
    let args = match parse_args() {
        Some(args) => args,
        None => {
            eprintln!("{}", USAGE);
            process::exit(-1);
        }
    };
    for file in args.files.iter() {
        if let Err(err) = run(file, &args) {
            // One broken instance does not stop the rest
            eprintln!("{}: {}", file, err);
        }
    }
}

fn run(file: &str, args: &Args) -> Result<(), Error> {
    let graph = dat::parse(file)?;
    let n = graph.node_count();
    println!("Instance {} (n={}, m={})", file, n, graph.forward_count());

    let cardinalities = match args.k {
        Some(k) => vec![k],
        None => vec![n / 5, n / 2].into_iter().filter(|&k| k >= 1).dedup().collect(),
    };
    let oracle = BranchAndBound::default();

    for k in cardinalities {
        println!("k = {}", k);
        for formulation in Formulation::ALL {
            let tree_model = formulation::build(&graph, formulation, k)?;
            if args.export_lp {
                let path = format!("{}.{}.k{}.lp", file, formulation.name().to_lowercase(), k);
                tree_model.model.write_lp(&mut BufWriter::new(File::create(&path)?))?;
            }

            let start = Instant::now();
            let outcome = oracle.solve(&tree_model.model, args.time_limit)?;
            let gap = outcome
                .relative_gap
                .map_or("-".to_string(), |g| format!("{:.4}", g));
            let objective = outcome
                .objective_value
                .map_or("-".to_string(), |v| format!("{}", v));
            println!(
                "{} status={} time={:.2}s gap={} nodes={} obj={}",
                formulation,
                outcome.status,
                start.elapsed().as_secs_f64(),
                gap,
                outcome.node_count,
                objective
            );

            if let Some(assignment) = outcome.assignment {
                let tree = KTree::from_arcs(&graph, &tree_model.selected_arcs(&assignment), k)?;
                let arcs = tree
                    .arcs()
                    .iter()
                    .map(|&id| {
                        let arc = graph.arc(id);
                        format!("{}->{}", arc.tail.0, arc.head.0)
                    })
                    .join(" ");
                println!("    tree: {}", arcs);
            }
        }
        println!();
    }
    Ok(())
}
