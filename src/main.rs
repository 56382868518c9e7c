use mapcolor::adjacency::{load_adjacency, parse_adjacency, AdjacencyMap, AUSTRALIA_CSV};
use mapcolor::candidate::Candidate;
use mapcolor::export::{render_assignments, save_map_script, Palette, ProgressPrinter};
use mapcolor::rules::{build_rules, NodeIndex, RuleEvaluator};
use mapcolor::search::{search, search_parallel, CancelFlag, SearchConfig, SearchOutcome};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::Duration;

const DEFAULT_COLORS: [&str; 4] = ["Orange", "Yellow", "Green", "Blue"];

fn main() {
    let mut file: Option<String> = None;
    let mut colors: Vec<String> = DEFAULT_COLORS.iter().map(|&c| c.to_string()).collect();
    let mut seed: Option<u64> = None;
    let mut slack: usize = 0;
    let mut max_iterations: Option<u64> = None;
    let mut timeout_secs: Option<u64> = None;
    let mut chains: usize = 1;
    let mut out_path: Option<String> = None;
    let mut log_path: Option<String> = None;
    let mut quiet = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--file" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                file = Some(v.clone());
                i += 2;
            }
            "--colors" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                colors = v.split(',').map(str::to_string).collect();
                i += 2;
            }
            "--seed" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                seed = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--slack" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                slack = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--max-iters" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                max_iterations = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--timeout-secs" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                timeout_secs = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--chains" | "--workers" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                chains = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--out" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                out_path = Some(v.clone());
                i += 2;
            }
            "--log" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                log_path = Some(v.clone());
                i += 2;
            }
            "--quiet" => {
                quiet = true;
                i += 1;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    let map: AdjacencyMap = match &file {
        Some(path) => load_adjacency(path).unwrap_or_else(|e| fail(&e)),
        None => parse_adjacency(AUSTRALIA_CSV).unwrap_or_else(|e| fail(&e)),
    };
    let rules = build_rules(&map).unwrap_or_else(|e| fail(&e));
    let index = NodeIndex::from_adjacency(&map);
    let eval = RuleEvaluator::bind(&rules, &index).unwrap_or_else(|e| fail(&e));
    let palette = Palette::new(colors).unwrap_or_else(|e| fail(&e));
    let target = eval.rule_count().saturating_sub(slack);

    println!("--------------------------------------------------");
    println!(
        "Map Coloring Search: {} nodes, {} rules, target fitness {target}",
        index.len(),
        eval.rule_count()
    );
    println!(
        "Colors: {} | chains: {chains}",
        palette.names().join(", ")
    );
    println!("--------------------------------------------------");

    let printer = ProgressPrinter::new();
    let mut log_file = log_path.as_ref().map(|path| {
        let mut f = File::create(path).unwrap_or_else(|e| fail(&e));
        writeln!(f, "elapsed_ms,fitness").unwrap_or_else(|e| fail(&e));
        f
    });

    let cfg = SearchConfig {
        seed,
        max_iterations,
        deadline: timeout_secs.map(Duration::from_secs),
        chains,
    };
    let cancel = CancelFlag::new();
    let fitness = |genes: &[char]| eval.fitness(genes);
    let on_progress = |candidate: &Candidate| {
        if !quiet {
            printer.report(candidate);
        }
        if let Some(f) = log_file.as_mut() {
            let _ = writeln!(f, "{},{}", printer.elapsed().as_millis(), candidate.fitness());
        }
    };

    let result = if chains != 1 {
        search_parallel(
            fitness,
            index.len(),
            target,
            palette.alphabet(),
            &cfg,
            &cancel,
            on_progress,
        )
    } else {
        search(
            fitness,
            index.len(),
            target,
            palette.alphabet(),
            &cfg,
            &cancel,
            on_progress,
        )
    };
    let outcome = result.unwrap_or_else(|e| fail(&e));

    match &outcome {
        SearchOutcome::ReachedTarget { best, iterations } => {
            println!(
                "\nReached target fitness {} after {iterations} iterations.",
                best.fitness()
            );
        }
        SearchOutcome::Aborted {
            best,
            iterations,
            reason,
        } => {
            eprintln!(
                "\nSearch aborted without reaching target ({reason}); best fitness {} of {} after {iterations} iterations.",
                best.fitness(),
                eval.rule_count()
            );
        }
    }

    let genes = outcome.best().genes();
    let text = render_assignments(&index, genes, &palette).unwrap_or_else(|e| fail(&e));
    print!("{text}");

    if let Some(path) = &out_path {
        save_map_script(path, &index, genes, &palette).unwrap_or_else(|e| fail(&e));
        println!("Wrote map script to {path}");
    }

    if !outcome.reached_target() {
        std::process::exit(1);
    }
}

fn fail(err: &dyn fmt::Display) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(1)
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  mapcolor [--file PATH] [--colors NAME,NAME,...] [--seed SEED] [--slack K]\n           [--max-iters N] [--timeout-secs T] [--chains N] [--out PATH] [--log PATH] [--quiet]\n\nOptions:\n  --file PATH          Adjacency data (NODE,NB1;NB2;... rows; default: bundled dataset)\n  --colors NAMES       Comma-separated color names with distinct initials (default: Orange,Yellow,Green,Blue)\n  --seed SEED          Deterministic base seed (optional)\n  --slack K            Accept K unsatisfied rules: target = rules - K (default: 0)\n  --max-iters N        Abort after N mutation attempts per chain\n  --timeout-secs T     Abort after T seconds\n  --chains/--workers N Independent racing chains (default: 1)\n  --out PATH           Write the map-script fragment on completion\n  --log PATH           Append elapsed_ms,fitness per improvement\n  --quiet              Suppress per-improvement progress lines\n"
    );
    std::process::exit(code)
}
