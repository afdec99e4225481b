use std::sync::Arc;

use markov_gen_core::{
    DeadEndPolicy, FixedSelector, GenerationInput, Generator, MarkovModel, RandomSelector, render_batch,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Load the model from "data/sherlock.json"
    // A "data/sherlock.bin" cache is written on first load and reused afterwards
    let model = Arc::new(MarkovModel::load("./data/sherlock.json")?);
    println!("Loaded {} states from {:?}", model.len(), model.get_model_names());

    // The model is read-only: the generator is a cheap handle that can be
    // cloned into other threads
    let generator = Generator::new(Arc::clone(&model))?;

    // Start words are normalized the same way the model keys are:
    // lowercase, trimmed, one trailing space
    let mut input = GenerationInput::from_words("Dear Holmes");

    // Number of successor states appended to the start words
    input.set_limit(10)?;

    // Negative step counts are rejected before any sampling
    match input.set_limit(-1) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }

    // Keep the 10 most frequent successors, draw uniformly among the first 6
    input.set_candidate_pool(10, 6)?;

    // When the walk reaches a phrase without successors:
    // 'Fail' reports an error, 'Stop' keeps the partial text,
    // 'Restart' jumps to the most frequent phrase of the model
    input.dead_end = DeadEndPolicy::Restart;

    // 10 independent walks, labelled like the interactive page does
    let texts = generator.generate_batch(&input, 10, &mut RandomSelector::new())?;
    print!("{}", render_batch(&texts));

    // Seeded walks are reproducible
    let seeded = generator.generate(&input, &mut RandomSelector::seeded(42))?;
    println!("Seeded: {seeded}");

    // Always taking rank 0 follows the most frequent path
    let greedy = generator.generate(&input, &mut FixedSelector(0))?;
    println!("Most frequent path: {greedy}");

    // Unknown start words are an explicit, recoverable error
    let unknown = GenerationInput::from_words("moriarty laughed").with_limit(10)?;
    match generator.generate(&unknown, &mut RandomSelector::new()) {
        Ok(text) => println!("Should not happen: {text}"),
        Err(e) if e.is_unknown_start() => println!("Try a different word combination: {e}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
