//! Gapwing entry point
//!
//! Headless reference harness: runs generations of populations against the
//! course, using a seeded random search over perceptron weights as a
//! stand-in for a real external learner. Pass RUST_LOG=info to watch runs.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use gapwing::config::{ConfigError, SimConfig};
use gapwing::policy::{DecisionPolicy, PerceptronPolicy};
use gapwing::sim::PopulationRunner;

#[derive(Parser, Debug)]
#[command(name = "gapwing", about = "Headless side-scroller population simulator")]
struct Args {
    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Avatars per generation
    #[arg(long, default_value_t = 50)]
    population: u32,

    /// Generations of random weight search
    #[arg(long, default_value_t = 30)]
    generations: u32,

    /// Override the per-run tick cap
    #[arg(long)]
    tick_cap: Option<u64>,

    /// JSON tuning file (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pace ticks at the configured tick rate instead of running flat out
    #[arg(long)]
    paced: bool,
}

fn main() -> Result<(), ConfigError> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(cap) = args.tick_cap {
        config.tick_cap = Some(cap);
    }
    config.validate()?;

    log::info!(
        "gapwing starting: seed {}, population {}, generations {}",
        args.seed,
        args.population,
        args.generations
    );

    let mut search_rng = Pcg32::seed_from_u64(args.seed ^ 0x9e37_79b9_7f4a_7c15);
    let mut best: Option<(f32, PerceptronPolicy)> = None;

    for generation in 0..args.generations {
        let candidates: Vec<PerceptronPolicy> = (0..args.population)
            .map(|_| match &best {
                Some((_, champion)) => champion.jittered(&mut search_rng, 0.3),
                None => PerceptronPolicy::from_rng(&mut search_rng),
            })
            .collect();
        let policies: Vec<Box<dyn DecisionPolicy>> = candidates
            .iter()
            .map(|p| Box::new(p.clone()) as Box<dyn DecisionPolicy>)
            .collect();

        let mut runner =
            PopulationRunner::new(config.clone(), args.seed + u64::from(generation), policies)?;
        let outcome = if args.paced {
            let period = config.tick_period();
            runner.run_observed(|_| std::thread::sleep(period))
        } else {
            runner.run()
        };

        let Some(top) = outcome
            .results
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            break;
        };
        log::info!(
            "generation {generation}: score {}, best fitness {:.1} (avatar {}), {} ticks",
            outcome.score,
            top.fitness,
            top.id,
            outcome.ticks
        );

        if best.as_ref().is_none_or(|(fitness, _)| top.fitness > *fitness) {
            best = Some((top.fitness, candidates[top.id as usize].clone()));
        }
    }

    if let Some((fitness, champion)) = best {
        println!(
            "best policy after {} generations: fitness {:.1}, weights {:?}, bias {:.3}",
            args.generations, fitness, champion.weights, champion.bias
        );
    }
    Ok(())
}
