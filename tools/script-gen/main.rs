use clap::Parser;
use demoswork::prelude::*;
use rand::Rng;
use rand::rngs::ThreadRng;
use serde_json::json;

const CHAINS: &[(&str, &str, bool)] = &[
    ("eth", "sepolia", true),
    ("solana", "devnet", false),
    ("near", "testnet", false),
    ("ibc", "cosmoshub", false),
];

const RESULTS: &[&str] = &["success", "error", "pending"];

/// A CLI tool to generate random, valid workflow scripts for stress testing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated script to
    #[arg(short, long, default_value = "generated_script.json")]
    output: String,

    /// Number of top-level operations to generate
    #[arg(long, default_value_t = 5)]
    operations: usize,

    /// Maximum number of if/elif branches per operation
    #[arg(long, default_value_t = 3)]
    branches: usize,

    /// Maximum nesting depth of operations used as actions
    #[arg(long, default_value_t = 2)]
    depth: usize,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.branches == 0 {
        eprintln!("Error: --branches must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating script ({} operations, up to {} branches, depth {})...",
        cli.operations, cli.branches, cli.depth
    );

    // Every generated condition reads the seed step, which the first operation runs unconditionally.
    let seed = prepare_native_step(json!({ "op": "seed" })).with_description("Seed step");
    let seed_ref = seed.output("result")?;

    let mut work = DemosWork::new();
    work.push(
        ConditionalOperation::new()
            .if_condition(Condition::precomputed(true))
            .then(seed)
            .end(),
    );

    for _ in 0..cli.operations {
        work.push(generate_operation(&mut rng, &seed_ref, cli.branches, cli.depth));
    }

    work.save(&cli.output)?;

    println!(
        "Successfully generated {} operations and {} steps into '{}'",
        work.script().operations.len(),
        work.script().steps.len(),
        cli.output
    );

    Ok(())
}

fn generate_operation(
    rng: &mut ThreadRng,
    seed: &OutputRef,
    branches: usize,
    depth: usize,
) -> ConditionalOperation {
    let count = rng.random_range(1..=branches);

    let first = generate_condition(rng, seed);
    let action = generate_action(rng, seed, branches, depth);
    let mut chain = ConditionalOperation::new().if_condition(first).then(action);

    for _ in 1..count {
        let condition = generate_condition(rng, seed);
        let action = generate_action(rng, seed, branches, depth);
        chain = chain.elif_condition(condition).then(action);
    }

    if rng.random_bool(0.5) {
        let action = generate_action(rng, seed, branches, depth);
        chain.else_(action)
    } else {
        chain.end()
    }
}

fn generate_condition(rng: &mut ThreadRng, seed: &OutputRef) -> Condition {
    let expected = RESULTS[rng.random_range(0..RESULTS.len())];
    match rng.random_range(0..4) {
        0 => Condition::new(
            Condition::new(seed.clone(), Operator::NotEqual, "error"),
            Operator::And,
            Condition::new(seed.clone(), Operator::Equal, expected),
        ),
        1 => Condition::new(seed.clone(), Operator::In, json!(["success", expected])),
        2 => Condition::not(Condition::new(seed.clone(), Operator::Equal, expected)),
        _ => Condition::new(seed.clone(), Operator::Equal, expected),
    }
}

fn generate_action(
    rng: &mut ThreadRng,
    seed: &OutputRef,
    branches: usize,
    depth: usize,
) -> WorkUnit {
    if depth > 0 && rng.random_bool(0.3) {
        generate_operation(rng, seed, branches, depth - 1).into()
    } else {
        generate_step(rng).into()
    }
}

fn generate_step(rng: &mut ThreadRng) -> WorkStep {
    match rng.random_range(0..3) {
        0 => {
            let (chain, subchain, is_evm) = CHAINS[rng.random_range(0..CHAINS.len())];
            let operation = XmOperation {
                chain: chain.to_string(),
                subchain: subchain.to_string(),
                is_evm,
                rpc: None,
                task: XmTask {
                    task_type: "pay".to_string(),
                    params: Some(json!({ "amount": rng.random_range(1..1000) })),
                    signed_payloads: vec![json!(format!("0x{:016x}", rng.random::<u64>()))],
                },
            };
            prepare_xm_step(XmScript::single(format!("{}_{}", chain, subchain), operation))
        }
        1 => {
            let method = [Web2Method::Get, Web2Method::Post][rng.random_range(0..2)];
            let request = Web2Request::new(method, "https://api.example.com/hook")
                .with_header("content-type", "application/json");
            prepare_web2_step(request)
        }
        _ => prepare_native_step(json!({ "op": "notify", "id": rng.random_range(0..10_000) })),
    }
}
