use chrono::{Duration, Utc};
use clap::Parser;
use flowboard::editor::renumber_and_compact;
use flowboard::workflow::{
    CapabilityRef, Parameter, ParameterKind, ParameterValue, ServiceRef, StepId, StepStatus,
    Workflow, WorkflowStep,
};
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use std::fs;

/// A CLI tool to generate random workflow fixtures for the Flowboard editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// The minimum number of actions after the trigger
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of actions after the trigger
    #[arg(long, default_value_t = 6)]
    max: usize,

    /// Leave steps unsaved, with draft ids
    #[arg(long)]
    drafts: bool,
}

const TRIGGERS: &[(&str, &str)] = &[
    ("calendar", "event-created"),
    ("mail", "message-received"),
    ("weather", "temperature-above"),
    ("timer", "every-hour"),
];

const ACTIONS: &[(&str, &str)] = &[
    ("mail", "send"),
    ("chat", "post-message"),
    ("calendar", "create-event"),
    ("storage", "upload-file"),
    ("sheets", "append-row"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    let actions = rng.random_range(cli.min..=cli.max);
    println!("Generating a workflow with 1 trigger and {} action(s)...", actions);

    let workflow = generate_workflow(&mut rng, actions, cli.drafts);
    let json_output = serde_json::to_string_pretty(&workflow)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved workflow '{}' to '{}'",
        workflow.name, cli.output
    );

    Ok(())
}

fn generate_workflow(rng: &mut ThreadRng, actions: usize, drafts: bool) -> Workflow {
    let mut next_id = rng.random_range(1..1000u64);
    let mut make_id = |rng: &mut ThreadRng| {
        if drafts && rng.random_bool(0.5) {
            StepId::draft()
        } else {
            next_id += 1;
            StepId::Saved(next_id)
        }
    };

    let mut steps = Vec::with_capacity(actions + 1);
    let trigger_id = make_id(rng);
    steps.push(generate_step(rng, WorkflowStep::trigger().with_id(trigger_id), TRIGGERS));
    for _ in 0..actions {
        let id = make_id(rng);
        steps.push(generate_step(rng, WorkflowStep::action().with_id(id), ACTIONS));
    }

    let mut workflow = Workflow::new(format!("Generated workflow #{}", rng.random_range(1..10_000)));
    workflow.steps = renumber_and_compact(steps);
    if !drafts {
        workflow.id = Some(rng.random_range(1..500));
        workflow.saved_at = Some(Utc::now() - Duration::minutes(rng.random_range(0..600)));
        if rng.random_bool(0.3) {
            workflow.deploy(Utc::now());
        }
    }
    workflow
}

fn generate_step(
    rng: &mut ThreadRng,
    mut step: WorkflowStep,
    catalog: &[(&str, &str)],
) -> WorkflowStep {
    // Leave some steps without a capability so the fixture has drafts to fill in.
    if rng.random_bool(0.2) {
        return step;
    }
    if let Some((service, capability)) = catalog.choose(rng) {
        step.service = Some(ServiceRef::new(*service));
        step.capability = Some(CapabilityRef::new(*capability));
        step.parameters = generate_parameters(rng);
        step.status = *[StepStatus::Configured, StepStatus::Tested, StepStatus::Error]
            .choose(rng)
            .unwrap_or(&StepStatus::Configured);
    }
    step
}

fn generate_parameters(rng: &mut ThreadRng) -> Vec<Parameter> {
    let count = rng.random_range(0..4);
    (0..count)
        .map(|index| {
            let kind = *[
                ParameterKind::Text,
                ParameterKind::Number,
                ParameterKind::Boolean,
                ParameterKind::DateTime,
            ]
            .choose(rng)
            .unwrap_or(&ParameterKind::Text);
            let value = match kind {
                ParameterKind::Text => ParameterValue::Text(format!("value-{}", rng.random_range(0..100))),
                ParameterKind::Number => ParameterValue::Number(rng.random_range(0.0..1000.0)),
                ParameterKind::Boolean => ParameterValue::Bool(rng.random_bool(0.5)),
                ParameterKind::DateTime => {
                    ParameterValue::DateTime(Utc::now() + Duration::days(rng.random_range(0..30)))
                }
            };
            Parameter {
                key: format!("param_{}", index),
                name: format!("Parameter {}", index + 1),
                kind,
                required: rng.random_bool(0.5),
                value: Some(value),
            }
        })
        .collect()
}
