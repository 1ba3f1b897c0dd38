//! # Genetic optimizer
//!
//! A generational genetic algorithm, supplemental to the rest of the
//! runtime's search tools: where A*/IDA*/GOAP search for a path or plan
//! over a known state space, this is for problems better framed as
//! "optimize a candidate against a fitness function" than "find a route"
//! — tuning an NPC's behavior-tree parameters, say.
//!
//! Selection is tournament-based (size
//! [`crate::config::GENETIC_TOURNAMENT_SIZE`]), with elitism carrying the
//! top [`crate::config::GENETIC_ELITISM_RATIO`] fraction of each
//! generation through unchanged. Crossover, mutation, and random
//! generation are supplied by the user's [`GeneticProblem`] implementor,
//! the same "host supplies the domain-specific operators, the runtime
//! supplies the loop" shape as [`crate::goap::GoapAction`].

use crate::config::{GENETIC_ELITISM_RATIO, GENETIC_TOURNAMENT_SIZE};
use rand::RngCore;

/// The domain-specific operators a [`GeneticAlgorithm`] needs but cannot
/// supply itself: how to make a random candidate, how two candidates
/// combine, how one mutates, and how fit it is.
pub trait GeneticProblem<T> {
    /// A uniformly random candidate.
    fn random_candidate(&self, rng: &mut dyn RngCore) -> T;

    /// Fitness of `candidate`; higher is better.
    fn fitness(&self, candidate: &T) -> f64;

    /// Combine two parents into one child.
    fn crossover(&self, a: &T, b: &T, rng: &mut dyn RngCore) -> T;

    /// Mutate `candidate` in place.
    fn mutate(&self, candidate: &mut T, rng: &mut dyn RngCore);
}

/// Notified after each completed generation.
pub trait GeneticListener {
    fn on_generation(&mut self, generation: u64, best_fitness: f64);
}

/// Generational genetic algorithm over candidates of type `T`.
pub struct GeneticAlgorithm<T, P: GeneticProblem<T>, R: RngCore> {
    problem: P,
    population: Vec<T>,
    generation: u64,
    rng: R,
    listener: Option<Box<dyn GeneticListener>>,
}

impl<T, P: GeneticProblem<T>, R: RngCore> GeneticAlgorithm<T, P, R> {
    /// Seed a population of `size` random candidates from `problem`.
    pub fn new(problem: P, size: usize, mut rng: R) -> Self {
        let population = (0..size).map(|_| problem.random_candidate(&mut rng)).collect();
        Self {
            problem,
            population,
            generation: 0,
            rng,
            listener: None,
        }
    }

    /// Install (or clear) the generation-completed listener.
    pub fn set_listener(&mut self, listener: Option<Box<dyn GeneticListener>>) {
        self.listener = listener;
    }

    /// The generation number completed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current population, ordered best-fitness-first.
    pub fn population(&self) -> &[T] {
        &self.population
    }

    /// The fittest candidate in the current population.
    pub fn best(&self) -> &T {
        self.population
            .iter()
            .max_by(|a, b| {
                self.problem
                    .fitness(a)
                    .partial_cmp(&self.problem.fitness(b))
                    .expect("fitness must not be NaN")
            })
            .expect("population is never empty")
    }

    /// Advance exactly one generation: elitism carries the fittest
    /// fraction through unchanged, and the rest of the next generation
    /// is filled by tournament-selected crossover and mutation.
    pub fn step(&mut self) {
        let size = self.population.len();
        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| {
            self.problem
                .fitness(&self.population[b])
                .partial_cmp(&self.problem.fitness(&self.population[a]))
                .expect("fitness must not be NaN")
        });

        let elite_count = ((size as f64) * GENETIC_ELITISM_RATIO).round() as usize;
        let elite_count = elite_count.clamp(0, size);

        let mut next: Vec<T> = Vec::with_capacity(size);
        // `T` is not required to be `Clone` by `GeneticProblem`, so
        // elites are recreated via crossover of a candidate with itself
        // rather than cloned — keeps the trait bound minimal for callers
        // whose candidates are cheap to resynthesize but not to clone.
        for &idx in ranked.iter().take(elite_count) {
            next.push(self.problem.crossover(&self.population[idx], &self.population[idx], &mut self.rng));
        }

        while next.len() < size {
            let a = self.tournament_select(&ranked);
            let b = self.tournament_select(&ranked);
            let mut child = self.problem.crossover(&self.population[a], &self.population[b], &mut self.rng);
            self.problem.mutate(&mut child, &mut self.rng);
            next.push(child);
        }

        self.population = next;
        self.generation += 1;

        let best_fitness = self.problem.fitness(self.best());
        if let Some(l) = self.listener.as_mut() {
            l.on_generation(self.generation, best_fitness);
        }
    }

    /// Run until `max_generations` have elapsed (from whatever
    /// generation count this algorithm started at).
    pub fn run(&mut self, max_generations: u64) {
        let target = self.generation + max_generations;
        while self.generation < target {
            self.step();
        }
    }

    fn tournament_select(&mut self, ranked: &[usize]) -> usize {
        let size = ranked.len();
        let mut best_rank = usize::MAX;
        for _ in 0..GENETIC_TOURNAMENT_SIZE {
            let candidate_rank = (self.rng.next_u32() as usize) % size;
            if candidate_rank < best_rank {
                best_rank = candidate_rank;
            }
        }
        ranked[best_rank]
    }
}
